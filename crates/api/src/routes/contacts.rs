//! `/api/contacts` handlers.

use axum::extract::State;
use tracing::instrument;

use crate::db::ContactRepository;
use crate::error::AppError;
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::{Contact, ContactInput};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> ApiResult<Contact> {
    let contact = ContactRepository::new(state.pool())
        .get()
        .await?
        .ok_or_else(|| AppError::not_found("Contacts"))?;
    Ok(ApiResponse::json(contact))
}

/// Create the contact block, or update the fields present in the body.
#[instrument(skip(state, input))]
pub async fn upsert(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ContactInput>,
) -> ApiResult<Contact> {
    let repo = ContactRepository::new(state.pool());
    let current = repo.get().await?;
    let draft = input.merge(current.as_ref()).into_draft()?;
    Ok(ApiResponse::json(repo.upsert(&draft).await?))
}
