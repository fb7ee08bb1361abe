//! Credential store: persistence of user accounts.
//!
//! Username and email uniqueness is enforced by the storage layer itself
//! (unique indexes in Postgres, a checked insert in memory). There is no
//! transaction spanning "look up, then insert", so concurrent identical
//! registrations are only separated by that constraint.
//!
//! Writes after creation touch only the columns they own, so a login and a
//! password reset on the same account never overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::user::UserAccount;
use crate::types::UserId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when username or email is taken.
    async fn create(&self, user: &UserAccount) -> Result<(), StoreError>;

    async fn record_login(&self, id: UserId, token: &str) -> Result<(), StoreError>;

    /// Clears the recorded session token and returns what was stored.
    async fn take_current_token(&self, id: UserId) -> Result<Option<String>, StoreError>;

    /// Stores a reset token, replacing any outstanding one.
    async fn begin_reset(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Swaps the password hash and clears the reset pair, but only while
    /// `token` is still the outstanding reset token at `now`. Returns whether
    /// the reset was applied.
    async fn complete_reset(
        &self,
        id: UserId,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate(
            db_err
                .constraint()
                .unwrap_or("users unique constraint")
                .to_string(),
        ),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let user = sqlx::query_as::<_, UserAccount>(
            "SELECT id, username, email, password_hash, current_token, reset_token, \
             reset_token_expiration FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let user = sqlx::query_as::<_, UserAccount>(
            "SELECT id, username, email, password_hash, current_token, reset_token, \
             reset_token_expiration FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let user = sqlx::query_as::<_, UserAccount>(
            "SELECT id, username, email, password_hash, current_token, reset_token, \
             reset_token_expiration FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &UserAccount) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, current_token, reset_token, \
             reset_token_expiration) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.current_token)
        .bind(user.reset_token())
        .bind(user.reset_token_expiration())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn record_login(&self, id: UserId, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET current_token = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn take_current_token(&self, id: UserId) -> Result<Option<String>, StoreError> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "WITH previous AS (SELECT id, current_token FROM users WHERE id = $1 FOR UPDATE) \
             UPDATE users SET current_token = NULL, updated_at = NOW() \
             FROM previous WHERE users.id = previous.id \
             RETURNING previous.current_token",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(token,)| token).ok_or(StoreError::NotFound)
    }

    async fn begin_reset(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expiration = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn complete_reset(
        &self,
        id: UserId,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $3, reset_token = NULL, \
             reset_token_expiration = NULL, updated_at = NOW() \
             WHERE id = $1 AND reset_token = $2 AND reset_token_expiration > $4",
        )
        .bind(id)
        .bind(token)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
