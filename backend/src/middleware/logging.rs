use std::time::Instant;

use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::Request,
    http::{header::CONTENT_LENGTH, StatusCode},
    middleware::Next,
    response::Response,
};

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 1024;

/// Logs 4xx responses at `warn` and 5xx at `error`, including a preview of
/// the body. Bodies of known size up to 64 KiB are buffered for the preview;
/// anything else is passed through untouched and only its size is logged.
pub async fn log_error_responses(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let started = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency_ms = started.elapsed().as_millis() as u64;
    let (mut parts, body) = response.into_parts();
    let size = body.size_hint().exact();
    let buffered = matches!(size, Some(len) if len <= MAX_BUFFERED_BODY_BYTES as u64);
    if !buffered {
        let preview = match size {
            Some(len) => format!("<{} bytes, not buffered>", len),
            None => "<streamed body>".to_string(),
        };
        emit(status, method.as_str(), &path, &request_id, latency_ms, &preview);
        return Response::from_parts(parts, body);
    }

    let (body, preview) = match to_bytes(body, MAX_BUFFERED_BODY_BYTES).await {
        Ok(bytes) => {
            let preview = body_preview(&bytes);
            (Body::from(bytes), preview)
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            (Body::empty(), format!("<unreadable body: {}>", err))
        }
    };

    emit(status, method.as_str(), &path, &request_id, latency_ms, &preview);
    Response::from_parts(parts, body)
}

fn body_preview(bytes: &[u8]) -> String {
    if bytes.len() <= MAX_LOGGED_BODY_BYTES {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    format!(
        "{}... ({} bytes)",
        String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY_BYTES]),
        bytes.len()
    )
}

fn emit(
    status: StatusCode,
    method: &str,
    path: &str,
    request_id: &str,
    latency_ms: u64,
    body: &str,
) {
    let status = status.as_u16();
    if status >= 500 {
        tracing::error!(status, method, path, request_id, latency_ms, body, "Request failed");
    } else {
        tracing::warn!(status, method, path, request_id, latency_ms, body, "Request rejected");
    }
}
