//! Page-level error handling with Sentry integration.
//!
//! Every failure renders the friendly error page; upstream API failures are
//! reported to Sentry and answered with `502 Bad Gateway`.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::client::ApiError;
use crate::filters;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// The REST API failed or was unreachable.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Page or record not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => Self::NotFound(what),
            other => Self::Api(other),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Friendly error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub heading: &'static str,
    pub message: &'static str,
    /// Error pages are rendered outside the request, so they carry no nonce.
    pub nonce: String,
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn page(&self) -> ErrorTemplate {
        let (heading, message) = match self {
            Self::NotFound(_) => (
                "Page not found",
                "The page you are looking for has moved or never existed.",
            ),
            Self::Api(_) => (
                "We'll be right back",
                "Our content is temporarily unavailable. Please try again in a minute.",
            ),
            Self::Internal(_) => (
                "Something went wrong",
                "An unexpected error occurred. Please try again later.",
            ),
        };
        ErrorTemplate {
            status: self.status().as_u16(),
            heading,
            message,
            nonce: String::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Api(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        match self.page().render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, status.canonical_reason().unwrap_or("Error")).into_response()
            }
        }
    }
}

/// Fallback handler for unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound("page".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Api(ApiError::Malformed("x".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_not_found_becomes_404() {
        let err: AppError = ApiError::NotFound("/api/blog/slug/missing".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_error_page_hides_details() {
        let err = AppError::Internal("connection string postgres://secret".into());
        let html = err.page().render().unwrap_or_default();
        assert!(html.contains("Something went wrong"));
        assert!(!html.contains("postgres://secret"));
    }
}
