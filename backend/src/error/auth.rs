use thiserror::Error;

/// Failures of the credential and event stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outcome taxonomy of the authentication core.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Bad signature, malformed token or past its expiry.
    #[error("{0}")]
    InvalidToken(String),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "Username or email is already taken.";

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthError::Conflict(DUPLICATE_ACCOUNT_MESSAGE.to_string()),
            other => AuthError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<crate::utils::jwt::TokenError> for AuthError {
    fn from(err: crate::utils::jwt::TokenError) -> Self {
        use crate::utils::jwt::TokenError;
        match err {
            TokenError::Encoding(source) => AuthError::Internal(anyhow::Error::new(source)),
            TokenError::Expired | TokenError::Invalid(_) => {
                AuthError::InvalidToken("Unauthorized: Invalid token".to_string())
            }
        }
    }
}
