//! `/api/services` handlers.

use axum::extract::State;
use tracing::instrument;

use atelier_core::ServiceId;

use crate::db::ServiceRepository;
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{Service, ServiceInput};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;

const RESOURCE: &str = "Service";

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ApiResult<Vec<Service>> {
    let services = ServiceRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::list(services))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, ApiPath(id): ApiPath<ServiceId>) -> ApiResult<Service> {
    let service = ServiceRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(RESOURCE))?;
    Ok(ApiResponse::json(service))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ServiceInput>,
) -> ApiResult<Service> {
    let draft = input.into_draft()?;
    let service = ServiceRepository::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(service))
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ServiceId>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> ApiResult<Service> {
    let repo = ServiceRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(RESOURCE))?;
    let draft = input.merge(&current).into_draft()?;
    let service = repo.update(id, &draft).await.for_resource(RESOURCE)?;
    Ok(ApiResponse::json(service))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ServiceId>,
) -> ApiResult<Empty> {
    ServiceRepository::new(state.pool())
        .delete(id)
        .await
        .for_resource(RESOURCE)?;
    Ok(ApiResponse::json(Empty {}))
}
