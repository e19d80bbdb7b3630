//! Correlation ids for API calls.
//!
//! A caller-supplied `x-request-id` (from a proxy or the admin frontend) is
//! kept so its logs line up with ours. Anything that does not look like an
//! id we would have issued is replaced with a fresh UUID v4.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_FORWARDED_LEN: usize = 128;

fn forwarded_id(request: &Request) -> Option<String> {
    let raw = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let usable = !raw.is_empty()
        && raw.len() <= MAX_FORWARDED_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    usable.then(|| raw.to_owned())
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let id = forwarded_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::Span::current().record("request_id", id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn with_header(value: &str) -> Request {
        Request::get("/")
            .header(REQUEST_ID_HEADER, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_forwarded_id_accepted() {
        assert_eq!(
            forwarded_id(&with_header("site-4f1c.2_a")).as_deref(),
            Some("site-4f1c.2_a")
        );
    }

    #[test]
    fn test_forwarded_id_rejected() {
        assert!(forwarded_id(&with_header("")).is_none());
        assert!(forwarded_id(&with_header("has space")).is_none());
        assert!(forwarded_id(&with_header("<script>")).is_none());
        assert!(forwarded_id(&with_header(&"a".repeat(129))).is_none());
        assert!(forwarded_id(&Request::get("/").body(Body::empty()).unwrap()).is_none());
    }
}
