use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        event::{
            CreateEventRequest, Event, EventCreatedResponse, EventInfoQuery, EventResponse,
            UpdateEventRequest,
        },
        MessageResponse,
    },
    services::{AuthenticatedUser, Place, PlaceSearchQuery},
    state::AppState,
    types::EventId,
};

const EVENT_NOT_FOUND: &str = "Event not found";

pub async fn add_event(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EventCreatedResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let event = Event::new(payload, session.user.id);
    state.events.create(&event).await?;
    tracing::info!(event_id = %event.id, organizer_id = %event.organizer_id, "Event created");

    Ok((
        StatusCode::CREATED,
        Json(EventCreatedResponse {
            message: "Event created".to_string(),
            event_id: event.id,
        }),
    ))
}

pub async fn retrieve_event_info(
    State(state): State<AppState>,
    Query(query): Query<EventInfoQuery>,
) -> Result<Json<EventResponse>, AppError> {
    let raw_id = query
        .event_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Event ID is required".to_string()))?;

    let event = find_event(&state, raw_id).await?;
    Ok(Json(EventResponse { event }))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedUser>,
    Path(event_id): Path<String>,
    payload: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let mut event = find_owned_event(&state, &session, &event_id).await?;
    event.apply(payload);
    state.events.update(&event).await?;
    tracing::info!(event_id = %event.id, "Event updated");

    Ok(Json(MessageResponse::new("Event updated successfully")))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(session): Extension<AuthenticatedUser>,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let event = find_owned_event(&state, &session, &event_id).await?;
    state.events.delete(event.id).await?;
    tracing::info!(event_id = %event.id, "Event deleted");

    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceSearchQuery>,
) -> Result<Json<Vec<Place>>, AppError> {
    let places = state.places.search(&query).await.map_err(|err| {
        AppError::Upstream("An error occurred while searching for venues".to_string(), err)
    })?;
    Ok(Json(places))
}

/// Looks an event up by its textual id. Ids that do not parse cannot exist.
pub(crate) async fn find_event(state: &AppState, raw_id: &str) -> Result<Event, AppError> {
    let Ok(id) = raw_id.parse::<EventId>() else {
        return Err(AppError::NotFound(EVENT_NOT_FOUND.to_string()));
    };
    state
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.to_string()))
}

async fn find_owned_event(
    state: &AppState,
    session: &AuthenticatedUser,
    raw_id: &str,
) -> Result<Event, AppError> {
    let event = find_event(state, raw_id).await?;
    if event.organizer_id != session.user.id {
        return Err(AppError::Forbidden(
            "Only the organizer can modify this event".to_string(),
        ));
    }
    Ok(event)
}
