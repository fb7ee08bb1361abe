#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::ErrorResponse,
    models::{
        event::{
            CreateEventRequest, Event, EventCreatedResponse, EventInfoQuery, EventResponse,
            UpdateEventRequest,
        },
        sms::{BulkSmsRequest, CancellationSmsRequest, SmsRequest},
        user::{
            ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            ResetPasswordRequest, UserResponse,
        },
        MessageResponse,
    },
    services::places::{Place, PlaceSearchQuery},
};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Evently API", description = "Accounts, events, venue search and SMS reminders"),
    paths(
        register_doc,
        login_doc,
        forgot_password_doc,
        reset_password_doc,
        logout_doc,
        add_event_doc,
        retrieve_event_info_doc,
        update_event_doc,
        delete_event_doc,
        search_places_doc,
        send_sms_doc,
        send_bulk_sms_doc,
        send_cancellation_sms_doc,
        sms_usage_doc
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            // auth
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            UserResponse,
            // events
            Event,
            CreateEventRequest,
            UpdateEventRequest,
            EventCreatedResponse,
            EventResponse,
            Place,
            // sms
            SmsRequest,
            BulkSmsRequest,
            CancellationSmsRequest
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "Auth", description = "Registration, sessions and password reset"),
        (name = "Events", description = "Event management and venue search"),
        (name = "SMS", description = "Event reminders by text message")
    ),
    security(("BearerAuth" = []))
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_string());
        components.add_security_scheme("BearerAuth", SecurityScheme::Http(bearer));
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Missing field or bad email format", body = ErrorResponse),
        (status = 409, description = "Username or email is already taken", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn register_doc() {}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn login_doc() {}

#[utoipa::path(
    post,
    path = "/auth/forgotPassword",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email queued", body = MessageResponse),
        (status = 401, description = "Invalid email", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn forgot_password_doc() {}

#[utoipa::path(
    post,
    path = "/auth/resetPassword",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Missing new password", body = ErrorResponse),
        (status = 401, description = "Invalid reset token or expired", body = ErrorResponse)
    ),
    tag = "Auth",
    security(())
)]
fn reset_password_doc() {}

#[utoipa::path(
    delete,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse)
    ),
    tag = "Auth"
)]
fn logout_doc() {}

#[utoipa::path(
    post,
    path = "/event/addEvent",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventCreatedResponse),
        (status = 400, description = "Invalid event", body = ErrorResponse)
    ),
    tag = "Events"
)]
fn add_event_doc() {}

#[utoipa::path(
    get,
    path = "/event/retrieveEventInfo",
    params(EventInfoQuery),
    responses(
        (status = 200, body = EventResponse),
        (status = 400, description = "Event ID is required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events",
    security(())
)]
fn retrieve_event_info_doc() {}

#[utoipa::path(
    put,
    path = "/event/updateEvent/{eventId}",
    params(("eventId" = String, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Not the organizer", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events"
)]
fn update_event_doc() {}

#[utoipa::path(
    delete,
    path = "/event/deleteEvent/{eventId}",
    params(("eventId" = String, Path, description = "Event id")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 403, description = "Not the organizer", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "Events"
)]
fn delete_event_doc() {}

#[utoipa::path(
    get,
    path = "/event/search-places",
    params(PlaceSearchQuery),
    responses(
        (status = 200, body = [Place]),
        (status = 500, description = "Places API failure", body = ErrorResponse)
    ),
    tag = "Events",
    security(())
)]
fn search_places_doc() {}

#[utoipa::path(
    post,
    path = "/api/sms",
    request_body = SmsRequest,
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Neither eventId nor message given", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Failed to send SMS", body = ErrorResponse)
    ),
    tag = "SMS"
)]
fn send_sms_doc() {}

#[utoipa::path(
    post,
    path = "/api/sms-bulk",
    request_body = BulkSmsRequest,
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Failed to send SMS", body = ErrorResponse)
    ),
    tag = "SMS"
)]
fn send_bulk_sms_doc() {}

#[utoipa::path(
    post,
    path = "/api/sms-cancellation",
    request_body = CancellationSmsRequest,
    responses(
        (status = 200, body = MessageResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Failed to send SMS", body = ErrorResponse)
    ),
    tag = "SMS"
)]
fn send_cancellation_sms_doc() {}

#[utoipa::path(
    get,
    path = "/api/sms/usage",
    responses((status = 200, description = "Contract usage", body = serde_json::Value)),
    tag = "SMS"
)]
fn sms_usage_doc() {}
