//! Data models shared across database access and API handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every plain success response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod event;
pub mod sms;
pub mod user;
