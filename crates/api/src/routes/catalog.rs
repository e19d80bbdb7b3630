//! `/api/products`, `/api/categories` and `/api/tags` handlers.

use axum::extract::State;
use tracing::instrument;

use atelier_core::ProductId;

use crate::db::{ProductRepository, TaxonomyRepository};
use crate::error::{AppError, ResourceExt};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductFilter, ProductInput, ProductQuery, Taxonomy, TaxonomyInput, TaxonomyKind};
use crate::response::{ApiResponse, ApiResult, Empty, Pagination};
use crate::state::AppState;

const PRODUCT: &str = "Product";

// =============================================================================
// Products
// =============================================================================

#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> ApiResult<Vec<Product>> {
    let filter = ProductFilter::try_from(query)?;
    let (items, total) = ProductRepository::new(state.pool()).list(&filter).await?;
    let pagination = Pagination::new(filter.page.page, filter.page.limit, total);
    Ok(ApiResponse::page(items, pagination))
}

#[instrument(skip(state))]
pub async fn product(State(state): State<AppState>, ApiPath(id): ApiPath<ProductId>) -> ApiResult<Product> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT))?;
    Ok(ApiResponse::json(product))
}

#[instrument(skip(state))]
pub async fn product_by_slug(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Product> {
    let product = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found(PRODUCT))?;
    Ok(ApiResponse::json(product))
}

#[instrument(skip(state, input))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    let draft = input.into_draft()?;
    let product = ProductRepository::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(product))
}

#[instrument(skip(state, input))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> ApiResult<Product> {
    let repo = ProductRepository::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(PRODUCT))?;
    let draft = input.merge(&current).into_draft()?;
    let product = repo.update(id, &draft).await.for_resource(PRODUCT)?;
    Ok(ApiResponse::json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> ApiResult<Empty> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .for_resource(PRODUCT)?;
    Ok(ApiResponse::json(Empty {}))
}

// =============================================================================
// Categories and tags
// =============================================================================

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn taxonomy_index<K: TaxonomyKind>(State(state): State<AppState>) -> ApiResult<Vec<Taxonomy<K>>> {
    let entries = TaxonomyRepository::<K>::new(state.pool()).list().await?;
    Ok(ApiResponse::list(entries))
}

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn taxonomy_show<K: TaxonomyKind>(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Taxonomy<K>> {
    let entry = TaxonomyRepository::<K>::new(state.pool())
        .get(K::Id::from(id))
        .await?
        .ok_or_else(|| AppError::not_found(K::LABEL))?;
    Ok(ApiResponse::json(entry))
}

#[instrument(skip(state, input), fields(table = K::TABLE))]
pub async fn taxonomy_create<K: TaxonomyKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(input): ApiJson<TaxonomyInput>,
) -> ApiResult<Taxonomy<K>> {
    let draft = input.into_draft()?;
    let entry = TaxonomyRepository::<K>::new(state.pool()).create(&draft).await?;
    Ok(ApiResponse::json(entry))
}

#[instrument(skip(state, input), fields(table = K::TABLE))]
pub async fn taxonomy_update<K: TaxonomyKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<TaxonomyInput>,
) -> ApiResult<Taxonomy<K>> {
    let id = K::Id::from(id);
    let repo = TaxonomyRepository::<K>::new(state.pool());
    let current = repo.get(id).await?.ok_or_else(|| AppError::not_found(K::LABEL))?;
    let draft = input.merge(&current).into_draft()?;
    let entry = repo.update(id, &draft).await.for_resource(K::LABEL)?;
    Ok(ApiResponse::json(entry))
}

#[instrument(skip(state), fields(table = K::TABLE))]
pub async fn taxonomy_delete<K: TaxonomyKind>(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Empty> {
    TaxonomyRepository::<K>::new(state.pool())
        .delete(K::Id::from(id))
        .await
        .for_resource(K::LABEL)?;
    Ok(ApiResponse::json(Empty {}))
}
