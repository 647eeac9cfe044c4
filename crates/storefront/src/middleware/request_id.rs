//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is reused when present, otherwise a UUID v4 is
//! generated. The ID is recorded on the tracing span, tagged on the Sentry
//! scope, exposed to handlers as [`RequestId`], and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream ID accepted before a fresh one is generated.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The current request's ID, available as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
