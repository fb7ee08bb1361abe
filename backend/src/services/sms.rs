//! Outbound SMS through the Orange messaging API and the reminder texts
//! sent for events.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::SmsConfig;
use crate::models::event::Event;

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// `recipient` is the local number without country code.
    async fn send(&self, recipient: &str, message: &str) -> anyhow::Result<()>;

    /// Sends the same text to every recipient, stopping at the first failure.
    async fn send_many(&self, recipients: &[String], message: &str) -> anyhow::Result<()> {
        for recipient in recipients {
            self.send(recipient, message).await?;
        }
        Ok(())
    }

    async fn usage(&self) -> anyhow::Result<Value>;
}

pub fn reminder_message(recipient: &str, event: &Event) -> String {
    format!(
        "Hi {}! Don't forget about {} on {} at {}.",
        recipient, event.event_name, event.event_date, event.event_location
    )
}

pub fn bulk_reminder_message(event: &Event) -> String {
    format!(
        "Hi! Don't forget about {} on {} at {}.",
        event.event_name, event.event_date, event.event_location
    )
}

pub fn cancellation_message(event: &Event) -> String {
    format!(
        "We're sorry to inform you that {} that was supposed to happen on {} at {} got cancelled.",
        event.event_name, event.event_date, event.event_location
    )
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

pub struct OrangeSmsClient {
    client: Client,
    api_url: String,
    token_auth: String,
    sender_number: String,
    country_code: String,
}

impl OrangeSmsClient {
    pub fn new(config: &SmsConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to initialize HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token_auth: config.token_auth.clone(),
            sender_number: config.sender_number.clone(),
            country_code: config.country_code.clone(),
        })
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let token: AccessToken = self
            .client
            .post(format!("{}/oauth/v3/token", self.api_url))
            .header(reqwest::header::AUTHORIZATION, &self.token_auth)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Failed to reach SMS token endpoint")?
            .error_for_status()
            .context("SMS token request rejected")?
            .json()
            .await
            .context("Failed to decode SMS access token")?;
        Ok(token.access_token)
    }

    fn outbound_url(&self) -> String {
        format!(
            "{}/smsmessaging/v1/outbound/tel%3A%2B{}/requests",
            self.api_url, self.sender_number
        )
    }

    fn outbound_body(&self, recipient: &str, message: &str) -> Value {
        json!({
            "outboundSMSMessageRequest": {
                "address": format!("tel:+{}{}", self.country_code, recipient),
                "senderAddress": format!("tel:+{}", self.sender_number),
                "outboundSMSTextMessage": { "message": message },
            }
        })
    }

    async fn post_message(&self, token: &str, recipient: &str, message: &str) -> anyhow::Result<()> {
        self.client
            .post(self.outbound_url())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.outbound_body(recipient, message))
            .send()
            .await
            .context("Failed to reach SMS API")?
            .error_for_status()
            .map_err(|e| anyhow!("SMS API rejected message: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for OrangeSmsClient {
    async fn send(&self, recipient: &str, message: &str) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        self.post_message(&token, recipient, message).await?;
        tracing::debug!("SMS submitted");
        Ok(())
    }

    async fn send_many(&self, recipients: &[String], message: &str) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        for recipient in recipients {
            self.post_message(&token, recipient, message).await?;
        }
        tracing::debug!(count = recipients.len(), "Bulk SMS submitted");
        Ok(())
    }

    async fn usage(&self) -> anyhow::Result<Value> {
        let token = self.access_token().await?;
        let usage = self
            .client
            .get(format!("{}/sms/admin/v1/contracts", self.api_url))
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to reach SMS admin API")?
            .error_for_status()
            .context("SMS admin API returned an error status")?
            .json()
            .await
            .context("Failed to decode SMS usage")?;
        Ok(usage)
    }
}
