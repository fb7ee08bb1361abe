use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers,
    middleware::{log_error_responses, request_id, require_auth},
    state::AppState,
};

/// CamelCase paths are also mounted in all-lowercase spelling for clients
/// written against the older lowercase routes.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/forgotPassword", post(handlers::auth::forgot_password))
        .route("/forgotpassword", post(handlers::auth::forgot_password))
        .route("/resetPassword", post(handlers::auth::reset_password))
        .route("/resetpassword", post(handlers::auth::reset_password))
        .route("/logout", delete(handlers::auth::logout));

    let public_event_routes = Router::new()
        .route(
            "/retrieveEventInfo",
            get(handlers::events::retrieve_event_info),
        )
        .route(
            "/retrieveeventinfo",
            get(handlers::events::retrieve_event_info),
        )
        .route("/search-places", get(handlers::events::search_places));

    let protected_event_routes = Router::new()
        .route("/addEvent", post(handlers::events::add_event))
        .route("/addevent", post(handlers::events::add_event))
        .route(
            "/updateEvent/{event_id}",
            put(handlers::events::update_event),
        )
        .route(
            "/updateevent/{event_id}",
            put(handlers::events::update_event),
        )
        .route(
            "/deleteEvent/{event_id}",
            delete(handlers::events::delete_event),
        )
        .route(
            "/deleteevent/{event_id}",
            delete(handlers::events::delete_event),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let sms_routes = Router::new()
        .route("/sms", post(handlers::sms::send_sms))
        .route("/sms-bulk", post(handlers::sms::send_bulk_sms))
        .route(
            "/sms-cancellation",
            post(handlers::sms::send_cancellation_sms),
        )
        .route("/sms/usage", get(handlers::sms::sms_usage))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.config.cors_allow_origins);

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/event", public_event_routes.merge(protected_event_routes))
        .nest("/api", sms_routes)
        .merge(SwaggerUi::new("/api-docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(log_error_responses))
                .layer(cors),
        )
        .with_state(state)
}

/// `*` anywhere in the list allows every origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(24 * 60 * 60))
}
