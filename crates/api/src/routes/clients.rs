//! `/api/clients` handlers (admin only).

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use atelier_core::ClientId;

use crate::db::ClientRepository;
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Client, ClientInput};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;

const RESOURCE: &str = "Client";

#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    pub search: Option<String>,
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiQuery(query): ApiQuery<ClientQuery>,
) -> ApiResult<Vec<Client>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let clients = ClientRepository::new(state.pool()).list(search).await?;
    Ok(ApiResponse::list(clients))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ClientId>,
) -> ApiResult<Client> {
    let client = ClientRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(RESOURCE))?;
    Ok(ApiResponse::json(client))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ClientInput>,
) -> ApiResult<Client> {
    let draft = input.into_draft()?;
    let client = ClientRepository::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(client))
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ClientId>,
    ApiJson(input): ApiJson<ClientInput>,
) -> ApiResult<Client> {
    let repo = ClientRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(RESOURCE))?;
    let draft = input.merge(&current).into_draft()?;
    let client = repo.update(id, &draft).await.for_resource(RESOURCE)?;
    Ok(ApiResponse::json(client))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ClientId>,
) -> ApiResult<Empty> {
    ClientRepository::new(state.pool())
        .delete(id)
        .await
        .for_resource(RESOURCE)?;
    Ok(ApiResponse::json(Empty {}))
}
