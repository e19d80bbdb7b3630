//! `/api/care` and `/api/blog` handlers, shared through [`ArticleKind`].

use axum::extract::State;
use tracing::instrument;

use crate::db::ArticleRepository;
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{Article, ArticleInput, ArticleKind};
use crate::response::{ApiResponse, ApiResult, Empty};
use crate::state::AppState;

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn index<K: ArticleKind>(State(state): State<AppState>) -> ApiResult<Vec<Article<K>>> {
    let articles = ArticleRepository::<K>::new(state.pool()).list().await?;
    Ok(ApiResponse::list(articles))
}

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn show<K: ArticleKind>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Article<K>> {
    let article = ArticleRepository::<K>::new(state.pool())
        .get(K::Id::from(id))
        .await?
        .ok_or_else(|| AppError::not_found(K::LABEL))?;
    Ok(ApiResponse::json(article))
}

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn show_by_slug<K: ArticleKind>(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Article<K>> {
    let article = ArticleRepository::<K>::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found(K::LABEL))?;
    Ok(ApiResponse::json(article))
}

#[instrument(skip(state, input), fields(table = K::TABLE))]
pub async fn create<K: ArticleKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ArticleInput>,
) -> ApiResult<Article<K>> {
    let draft = input.into_draft()?;
    let article = ArticleRepository::<K>::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(article))
}

#[instrument(skip(state, input), fields(table = K::TABLE))]
pub async fn update<K: ArticleKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<ArticleInput>,
) -> ApiResult<Article<K>> {
    let id = K::Id::from(id);
    let repo = ArticleRepository::<K>::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(K::LABEL))?;
    let draft = input.merge(&current).into_draft()?;
    let article = repo.update(id, &draft).await.for_resource(K::LABEL)?;
    Ok(ApiResponse::json(article))
}

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn destroy<K: ArticleKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Empty> {
    ArticleRepository::<K>::new(state.pool())
        .delete(K::Id::from(id))
        .await
        .for_resource(K::LABEL)?;
    Ok(ApiResponse::json(Empty {}))
}
