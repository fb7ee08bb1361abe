//! Account lifecycle: registration, sessions and password reset.
//!
//! Session tokens are signed JWTs and are the authoritative credential.
//! `UserAccount::current_token` only records the most recent login; a token
//! stops working when it expires or lands in the revocation store.

use std::sync::Arc;

use chrono::Duration;
use validator::Validate;

use crate::config::Config;
use crate::error::AuthError;
use crate::models::user::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest, UserAccount,
};
use crate::repositories::UserRepository;
use crate::services::revocation::RevocationStore;
use crate::utils::email::EmailDispatcher;
use crate::utils::jwt::{Claims, IssuedToken, TokenIssuer};
use crate::utils::password::PasswordHasher;
use crate::utils::security::generate_reset_token;
use crate::utils::time::Clock;
use crate::validation::rules;

pub const REGISTER_FIELDS_REQUIRED: &str = "Username, email, and password are required.";
pub const EMAIL_FORMAT_MESSAGE: &str = "Check your email format.";
pub const LOGIN_FIELDS_REQUIRED: &str = "Username and password are required.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const MISSING_TOKEN: &str = "Unauthorized: Missing token";
pub const USER_NOT_FOUND: &str = "Unauthorized: User not found";
pub const TOKEN_REVOKED: &str = "Unauthorized: Token is revoked";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const NEW_PASSWORD_REQUIRED: &str = "New password is required.";
pub const INVALID_RESET_TOKEN: &str = "Invalid reset token or expired";

#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(1),
            reset_ttl: Duration::hours(2),
        }
    }
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            session_ttl: Duration::hours(config.jwt_expiration_hours as i64),
            reset_ttl: Duration::hours(config.reset_token_expiration_hours as i64),
        }
    }
}

/// Result of a successful token check.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserAccount,
    pub claims: Claims,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    revocations: Arc<dyn RevocationStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenIssuer,
    clock: Arc<dyn Clock>,
    mailer: EmailDispatcher,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        revocations: Arc<dyn RevocationStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenIssuer,
        clock: Arc<dyn Clock>,
        mailer: EmailDispatcher,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            revocations,
            hasher,
            tokens,
            clock,
            mailer,
            settings,
        }
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<UserAccount, AuthError> {
        if let Err(errors) = payload.validate() {
            let missing = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .any(|err| err.code == rules::REQUIRED);
            let message = if missing {
                REGISTER_FIELDS_REQUIRED
            } else {
                EMAIL_FORMAT_MESSAGE
            };
            return Err(AuthError::InvalidInput(message.to_string()));
        }

        if self
            .users
            .find_by_username(&payload.username)
            .await?
            .is_some()
            || self.users.find_by_email(&payload.email).await?.is_some()
        {
            return Err(AuthError::Conflict(
                crate::error::auth::DUPLICATE_ACCOUNT_MESSAGE.to_string(),
            ));
        }

        let password_hash = self.hasher.hash(&payload.password)?;
        let user = UserAccount::new(payload.username, payload.email, password_hash);
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<IssuedToken, AuthError> {
        if payload.validate().is_err() {
            return Err(AuthError::InvalidInput(LOGIN_FIELDS_REQUIRED.to_string()));
        }

        let Some(user) = self.users.find_by_username(&payload.username).await? else {
            tracing::debug!("Login rejected: unknown username");
            return Err(AuthError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.hasher.verify(&payload.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let issued = self.tokens.issue(user.id, self.settings.session_ttl)?;
        self.users.record_login(user.id, &issued.token).await?;

        tracing::info!(user_id = %user.id, jti = %issued.claims.jti, "User logged in");
        Ok(issued)
    }

    /// Checks signature and expiry, then that the account still exists and
    /// the token has not been revoked.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.tokens.decode(token)?;
        let user_id = claims.user_id()?;

        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Err(AuthError::Unauthorized(USER_NOT_FOUND.to_string()));
        };

        if self.revocations.is_revoked(token).await? {
            return Err(AuthError::Unauthorized(TOKEN_REVOKED.to_string()));
        }

        Ok(AuthenticatedUser { user, claims })
    }

    pub async fn logout(&self, bearer: Option<&str>) -> Result<(), AuthError> {
        let token = match bearer.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthError::Unauthorized(MISSING_TOKEN.to_string())),
        };

        let AuthenticatedUser { user, .. } = self.verify(token).await?;

        self.revocations.revoke(token).await?;
        if let Some(stored) = self.users.take_current_token(user.id).await? {
            if stored != token {
                self.revocations.revoke(&stored).await?;
            }
        }

        tracing::info!(user_id = %user.id, "User logged out");
        Ok(())
    }

    pub async fn forgot_password(&self, payload: ForgotPasswordRequest) -> Result<(), AuthError> {
        let Some(user) = self.users.find_by_email(&payload.email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Err(AuthError::Unauthorized(INVALID_EMAIL.to_string()));
        };

        let token = generate_reset_token();
        let expires_at = self.clock.now() + self.settings.reset_ttl;
        self.users.begin_reset(user.id, &token, expires_at).await?;

        tracing::info!(user_id = %user.id, %expires_at, "Password reset token issued");
        self.mailer.send_reset_email(user.email, token);
        Ok(())
    }

    pub async fn reset_password(&self, payload: ResetPasswordRequest) -> Result<(), AuthError> {
        if rules::validate_required(&payload.new_password).is_err() {
            return Err(AuthError::InvalidInput(NEW_PASSWORD_REQUIRED.to_string()));
        }

        let now = self.clock.now();
        let user = self.users.find_by_email(&payload.email).await?;
        let Some(user) = user.filter(|u| u.reset_token_is_valid(&payload.token, now)) else {
            tracing::debug!("Password reset rejected");
            return Err(AuthError::Unauthorized(INVALID_RESET_TOKEN.to_string()));
        };

        let password_hash = self.hasher.hash(&payload.new_password)?;
        let applied = self
            .users
            .complete_reset(user.id, &payload.token, &password_hash, now)
            .await?;
        if !applied {
            tracing::debug!(user_id = %user.id, "Password reset lost to a concurrent reset");
            return Err(AuthError::Unauthorized(INVALID_RESET_TOKEN.to_string()));
        }

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}
