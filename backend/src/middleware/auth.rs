use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::auth::MISSING_TOKEN, state::AppState};

/// Rejects requests without a valid session token. On success the
/// [`AuthenticatedUser`](crate::services::AuthenticatedUser) is available to
/// handlers as an `Extension`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN.to_string()))?;

    let session = state.auth.verify(&token).await?;
    tracing::debug!(user_id = %session.user.id, "Request authenticated");

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .map(str::to_string)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}
