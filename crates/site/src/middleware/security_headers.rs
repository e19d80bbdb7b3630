//! Security headers for every page.
//!
//! The policy is locked down to same-origin resources plus the media host
//! that serves uploaded images and videos.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;
use crate::state::AppState;

/// Cache lifetime for rendered pages.
const PAGE_CACHE_CONTROL: &str = "public, max-age=60";

/// Build the `Content-Security-Policy` value.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-<nonce>';
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' data: <media>;
/// media-src 'self' <media>;
/// connect-src 'self';
/// frame-src 'none';
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self';
/// frame-ancestors 'none'
/// ```
#[must_use]
pub fn content_security_policy(nonce: Option<&str>, media_origin: &str) -> String {
    let script_src = nonce.filter(|n| !n.is_empty()).map_or_else(
        || "'self'".to_string(),
        |n| format!("'self' 'nonce-{n}'"),
    );
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: {media_origin}; \
         media-src 'self' {media_origin}; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy` with the request's nonce
/// - `Permissions-Policy` denying device features
/// - `Cross-Origin-Opener-Policy: same-origin`
/// - `Cache-Control`: short public caching for pages, `no-store` for errors
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request.extensions().get::<CspNonce>().cloned();
    let mut response = next.run(request).await;
    let cacheable = response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let policy = content_security_policy(
        nonce.as_ref().map(CspNonce::value),
        &state.config().media_origin(),
    );
    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), microphone=(), geolocation=(), payment=(), usb=(), \
             interest-cohort=(), browsing-topics=()",
        ),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    if !cacheable {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    } else if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(PAGE_CACHE_CONTROL));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_includes_nonce_and_media() {
        let policy = content_security_policy(Some("abc123=="), "https://api.atelier.test");
        assert!(policy.contains("script-src 'self' 'nonce-abc123=='"));
        assert!(policy.contains("img-src 'self' data: https://api.atelier.test"));
        assert!(policy.contains("media-src 'self' https://api.atelier.test"));
        assert!(policy.starts_with("default-src 'none'"));
    }

    #[test]
    fn test_policy_without_nonce_blocks_inline_scripts() {
        let policy = content_security_policy(Some(""), "http://127.0.0.1:4000");
        assert!(policy.contains("script-src 'self';"));
        assert!(!policy.contains("nonce-"));
        assert!(HeaderValue::from_str(&policy).is_ok());
    }
}
