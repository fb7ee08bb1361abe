use std::sync::Arc;

use anyhow::Result;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

/// Blocking delivery of account emails.
pub trait Mailer: Send + Sync {
    fn send_password_reset_email(&self, to_email: &str, reset_token: &str) -> Result<()>;
}

pub struct SmtpMailer {
    mailer: SmtpTransport,
    from_address: String,
    frontend_url: String,
    skip_send: bool,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, frontend_url: &str) -> Result<Self> {
        let mailer = if config.username.is_empty() {
            SmtpTransport::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        } else {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            SmtpTransport::relay(&config.host)?
                .port(config.port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            skip_send: config.skip_send,
        })
    }

    fn reset_url(&self, reset_token: &str) -> String {
        format!("{}/reset-password/{}", self.frontend_url, reset_token)
    }
}

impl Mailer for SmtpMailer {
    fn send_password_reset_email(&self, to_email: &str, reset_token: &str) -> Result<()> {
        if self.skip_send {
            return Ok(());
        }

        let body = format!(
            r#"
We received a request to reset your Evently password.

Click the following link to choose a new password:

{}

The link is valid for 2 hours. If you did not ask for a reset, ignore this email.
"#,
            self.reset_url(reset_token)
        );

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject("Password Reset")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(&email)?;
        Ok(())
    }
}

/// Hands reset emails to a background task; callers never wait on delivery.
#[derive(Clone)]
pub struct EmailDispatcher {
    mailer: Arc<dyn Mailer>,
}

impl EmailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn send_reset_email(&self, to_email: String, reset_token: String) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                mailer.send_password_reset_email(&to_email, &reset_token)
            })
            .await;

            match outcome {
                Ok(Ok(())) => tracing::info!("Reset password email sent"),
                Ok(Err(err)) => {
                    tracing::warn!(error = ?err, "Failed to send reset password email")
                }
                Err(err) => tracing::warn!(error = ?err, "Reset password email task panicked"),
            }
        });
    }
}
