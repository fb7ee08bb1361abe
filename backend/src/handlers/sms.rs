use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::AppError,
    handlers::events::find_event,
    models::{
        event::Event,
        sms::{BulkSmsRequest, CancellationSmsRequest, SmsRequest},
        MessageResponse,
    },
    services::sms::{bulk_reminder_message, cancellation_message, reminder_message},
    state::AppState,
};

const SEND_FAILED: &str = "Failed to send SMS";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require_number(number: &str) -> Result<&str, AppError> {
    non_blank(Some(number))
        .ok_or_else(|| AppError::BadRequest("Recipient number is required".to_string()))
}

async fn require_event(state: &AppState, event_id: Option<&str>) -> Result<Event, AppError> {
    let raw_id = non_blank(event_id)
        .ok_or_else(|| AppError::BadRequest("Event ID is required".to_string()))?;
    find_event(state, raw_id).await
}

pub async fn send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SmsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    let number = require_number(&payload.number)?;

    let message = match non_blank(payload.event_id.as_deref()) {
        Some(raw_id) => reminder_message(number, &find_event(&state, raw_id).await?),
        None => non_blank(payload.message.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::BadRequest("Either eventId or message is required".to_string())
            })?,
    };

    state
        .sms
        .send(number, &message)
        .await
        .map_err(|err| AppError::Upstream(SEND_FAILED.to_string(), err))?;
    Ok(Json(MessageResponse::new("SMS sent successfully")))
}

pub async fn send_bulk_sms(
    State(state): State<AppState>,
    payload: Result<Json<BulkSmsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    let event = require_event(&state, payload.event_id.as_deref()).await?;

    let numbers: Vec<String> = payload
        .numbers
        .iter()
        .filter_map(|n| non_blank(Some(n)))
        .map(str::to_string)
        .collect();
    if numbers.is_empty() {
        return Err(AppError::BadRequest(
            "At least one recipient number is required".to_string(),
        ));
    }

    state
        .sms
        .send_many(&numbers, &bulk_reminder_message(&event))
        .await
        .map_err(|err| AppError::Upstream(SEND_FAILED.to_string(), err))?;
    tracing::info!(event_id = %event.id, count = numbers.len(), "Bulk reminders sent");
    Ok(Json(MessageResponse::new("Bulk SMS sent successfully")))
}

pub async fn send_cancellation_sms(
    State(state): State<AppState>,
    payload: Result<Json<CancellationSmsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    let number = require_number(&payload.number)?;
    let event = require_event(&state, payload.event_id.as_deref()).await?;

    state
        .sms
        .send(number, &cancellation_message(&event))
        .await
        .map_err(|err| AppError::Upstream(SEND_FAILED.to_string(), err))?;
    Ok(Json(MessageResponse::new("SMS sent successfully")))
}

pub async fn sms_usage(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let usage = state
        .sms
        .usage()
        .await
        .map_err(|err| AppError::Upstream("Failed to fetch SMS usage".to_string(), err))?;
    Ok(Json(usage))
}
