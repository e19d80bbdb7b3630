//! Request ids for page views.
//!
//! The site is public, so an incoming `x-request-id` is never trusted; every
//! page view gets a fresh UUID v4 that shows up on its log span, its Sentry
//! events and the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    let id_text = id.hyphenated().to_string();

    tracing::Span::current().record("request_id", id_text.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id_text));

    let mut response = next.run(request).await;
    // A hyphenated UUID is always a valid header value.
    if let Ok(value) = HeaderValue::from_str(&id_text) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
