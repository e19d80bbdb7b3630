//! `/api/portfolio` handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use atelier_core::PortfolioItemId;

use crate::db::PortfolioRepository;
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{PortfolioInput, PortfolioItem};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;

const RESOURCE: &str = "Portfolio item";

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
}

#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PortfolioQuery>,
) -> ApiResult<Vec<PortfolioItem>> {
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let items = PortfolioRepository::new(state.pool()).list(category).await?;
    Ok(ApiResponse::list(items))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PortfolioItemId>,
) -> ApiResult<PortfolioItem> {
    let item = PortfolioRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(RESOURCE))?;
    Ok(ApiResponse::json(item))
}

#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> ApiResult<PortfolioItem> {
    let draft = input.into_draft()?;
    let item = PortfolioRepository::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(item))
}

#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<PortfolioItemId>,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> ApiResult<PortfolioItem> {
    let repo = PortfolioRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(RESOURCE))?;
    let draft = input.merge(&current).into_draft()?;
    let item = repo.update(id, &draft).await.for_resource(RESOURCE)?;
    Ok(ApiResponse::json(item))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<PortfolioItemId>,
) -> ApiResult<Empty> {
    PortfolioRepository::new(state.pool())
        .delete(id)
        .await
        .for_resource(RESOURCE)?;
    Ok(ApiResponse::json(Empty {}))
}
