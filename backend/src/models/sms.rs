use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single reminder. Without `eventId` the free-form `message` is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSmsRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancellationSmsRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub number: String,
}
