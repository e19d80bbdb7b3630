//! `/api/upload` handlers (admin only).

use axum::extract::State;
use tracing::instrument;

use crate::error::AppError;
use crate::extract::{ApiMultipart, ApiPath};
use crate::middleware::RequireAdmin;
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::services::StoredFile;
use crate::state::AppState;

/// Multipart field names accepted for the file part.
const FILE_FIELDS: [&str; 2] = ["image", "file"];

/// Store the first `image`/`file` part of a multipart body.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiMultipart(mut multipart): ApiMultipart,
) -> ApiResult<StoredFile> {
    while let Some(field) = multipart.next_field().await? {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        let stored = state.uploads().save(&original, &bytes).await?;
        return Ok(ApiResponse::json(stored));
    }

    Err(AppError::BadRequest("No file uploaded".to_owned()))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(filename): ApiPath<String>,
) -> ApiResult<Empty> {
    state.uploads().delete(&filename).await?;
    Ok(ApiResponse::json(Empty {}))
}
