//! User accounts and the authentication payloads exchanged over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::types::UserId;
use crate::validation::rules;

#[derive(Debug, Clone, FromRow)]
/// Stored user account. Never serialized directly; see [`UserResponse`].
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Last session token handed out at login, kept for auditing.
    pub current_token: Option<String>,
    reset_token: Option<String>,
    reset_token_expiration: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            current_token: None,
            reset_token: None,
            reset_token_expiration: None,
        }
    }

    pub fn reset_token(&self) -> Option<&str> {
        self.reset_token.as_deref()
    }

    pub fn reset_token_expiration(&self) -> Option<DateTime<Utc>> {
        self.reset_token_expiration
    }

    /// Replaces any outstanding reset token.
    pub fn begin_reset(&mut self, token: String, expires_at: DateTime<Utc>) {
        self.reset_token = Some(token);
        self.reset_token_expiration = Some(expires_at);
    }

    pub fn clear_reset(&mut self) {
        self.reset_token = None;
        self.reset_token_expiration = None;
    }

    /// True when `token` is the outstanding reset token and it is still
    /// strictly before its expiration at `now`.
    pub fn reset_token_is_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token, self.reset_token_expiration) {
            (Some(stored), Some(expires_at)) => stored == token && expires_at > now,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating an account.
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::validate_required"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_email_format"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::validate_required"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "rules::validate_required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of an account.
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<UserAccount> for UserResponse {
    fn from(user: UserAccount) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
