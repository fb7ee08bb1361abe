use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::types::{EventId, UserId};
use crate::validation::rules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: EventId,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub event_location: String,
    pub event_description: Option<String>,
    pub event_capacity: i32,
    pub organizer_id: UserId,
}

impl Event {
    pub fn new(payload: CreateEventRequest, organizer_id: UserId) -> Self {
        Self {
            id: EventId::new(),
            event_name: payload.name,
            event_date: payload.date,
            event_time: payload.time,
            event_location: payload.location,
            event_description: payload.description,
            event_capacity: payload.capacity,
            organizer_id,
        }
    }

    /// Overwrites every editable field.
    pub fn apply(&mut self, update: UpdateEventRequest) {
        self.event_name = update.event_name;
        self.event_date = update.event_date;
        self.event_time = update.event_time;
        self.event_location = update.event_location;
        self.event_description = update.event_description;
        self.event_capacity = update.event_capacity;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEventRequest {
    #[validate(custom(function = "rules::validate_required"))]
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    #[validate(custom(function = "rules::validate_required"))]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(custom(function = "rules::validate_required"))]
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    #[validate(custom(function = "rules::validate_required"))]
    pub event_location: String,
    #[serde(default)]
    pub event_description: Option<String>,
    #[validate(range(min = 0))]
    pub event_capacity: i32,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventInfoQuery {
    pub event_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventCreatedResponse {
    pub message: String,
    pub event_id: EventId,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub event: Event,
}
