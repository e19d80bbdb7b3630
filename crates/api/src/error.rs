//! Unified error handling for the API.
//!
//! Every failure is rendered as `{"success": false, "message": "..."}` with
//! the matching status code.

use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tower_governor::GovernorError;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::{AuthError, UploadError};

/// Message returned when a booking collides with an active appointment.
pub const SLOT_TAKEN_MESSAGE: &str = "Time slot already booked";

/// Application-level error type for the REST API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeds the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Client is over its rate limit; retry after the given seconds.
    #[error("Too many requests, retry in {0}s")]
    TooManyRequests(u64),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a `404` with the usual `"<Resource> not found"` wording.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to API clients.
    fn public_message(&self) -> String {
        match self {
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::PayloadTooLarge => "File too large".to_string(),
            Self::TooManyRequests(_) => "Too many attempts, please try again later".to_string(),
        }
    }
}

/// Error envelope body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
        };

        let mut response = (self.status(), Json(body)).into_response();
        if let Self::TooManyRequests(secs) = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Conflict(msg) => Self::BadRequest(msg),
            RepositoryError::SlotTaken => Self::BadRequest(SLOT_TAKEN_MESSAGE.to_string()),
            other @ (RepositoryError::Database(_) | RepositoryError::DataCorruption(_)) => {
                Self::Database(other)
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<GovernorError> for AppError {
    fn from(err: GovernorError) -> Self {
        match err {
            GovernorError::TooManyRequests { wait_time, .. } => Self::TooManyRequests(wait_time),
            GovernorError::UnableToExtractKey => {
                Self::Internal("rate limiter could not determine the client address".to_string())
            }
            GovernorError::Other { code, msg, .. } => {
                Self::Internal(format!("rate limiter failed ({code}): {}", msg.unwrap_or_default()))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::InvalidToken(_) => Self::Unauthorized("Not authorized, token failed".to_string()),
            AuthError::WeakPassword(msg) => Self::BadRequest(msg),
            AuthError::Repository(err) => err.into(),
            AuthError::Signing(_) | AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::UnsupportedType(_) | UploadError::InvalidName | UploadError::Empty => {
                Self::BadRequest(err.to_string())
            }
            UploadError::NotFound => Self::not_found("File"),
            UploadError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Names the resource when a repository write reports `NotFound`.
pub trait ResourceExt<T> {
    /// Map `RepositoryError::NotFound` to `"<resource> not found"`.
    ///
    /// # Errors
    ///
    /// Returns the converted `AppError` for any repository failure.
    fn for_resource(self, resource: &str) -> Result<T, AppError>;
}

impl<T> ResourceExt<T> for Result<T, RepositoryError> {
    fn for_resource(self, resource: &str) -> Result<T, AppError> {
        self.map_err(|err| match err {
            RepositoryError::NotFound => AppError::not_found(resource),
            other => other.into(),
        })
    }
}

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::not_found("Service");
        assert_eq!(err.to_string(), "Not found: Service not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::not_found("Client").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("x".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::TooManyRequests(6).status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::BadRequest("x".to_string()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_envelope_carries_message() {
        let (status, body) = body_json(AppError::not_found("Appointment")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Appointment not found");
    }

    #[tokio::test]
    async fn test_rate_limit_envelope_sets_retry_after() {
        let err = AppError::from(GovernorError::TooManyRequests {
            wait_time: 6,
            headers: None,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "6");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Too many attempts, please try again later");
    }

    #[test]
    fn test_missing_client_address_is_internal() {
        assert!(matches!(
            AppError::from(GovernorError::UnableToExtractKey),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_json(AppError::Internal("disk on fire".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            AppError::from(RepositoryError::SlotTaken),
            AppError::BadRequest(msg) if msg == SLOT_TAKEN_MESSAGE
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("slug already exists".to_string())),
            AppError::BadRequest(msg) if msg == "slug already exists"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_for_resource_names_missing_rows() {
        let missing: Result<(), RepositoryError> = Err(RepositoryError::NotFound);
        assert!(matches!(
            missing.for_resource("Client"),
            Err(AppError::NotFound(msg)) if msg == "Client not found"
        ));

        let taken: Result<(), RepositoryError> = Err(RepositoryError::SlotTaken);
        assert!(matches!(taken.for_resource("Appointment"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(msg) if msg == "Invalid credentials"
        ));
        assert!(matches!(
            AppError::from(AuthError::PasswordHash),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_upload_error_mapping() {
        assert!(matches!(
            AppError::from(UploadError::UnsupportedType("exe".into())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(UploadError::NotFound),
            AppError::NotFound(msg) if msg == "File not found"
        ));
    }
}
