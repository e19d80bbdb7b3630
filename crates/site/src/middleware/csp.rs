//! Script nonces.
//!
//! Each page gets its own nonce; `base.html` stamps it on the inline media
//! loader and `security_headers` puts the same value into the policy.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};

/// Nonce for the current page. Empty when the middleware did not run, in which
/// case templates omit the inline script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// 128 random bits, unpadded base64 (22 characters).
    #[must_use]
    pub fn random() -> Self {
        Self(STANDARD_NO_PAD.encode(rand::random::<[u8; 16]>()))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::random());
    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for CspNonce {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let nonce = parts.extensions.get::<Self>().cloned();
        if nonce.is_none() {
            tracing::warn!(path = %parts.uri.path(), "Page rendered without a CSP nonce");
        }
        Ok(nonce.unwrap_or_default())
    }
}
