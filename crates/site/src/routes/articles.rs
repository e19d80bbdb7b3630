//! Blog and care article pages.
//!
//! Both sections share templates; only the API collection and the headings
//! differ.

use askama::Template;
use askama_web::WebTemplate;
use atelier_core::Slug;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::client::ArticleSection;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::Article;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "articles/index.html")]
pub struct ArticleIndexTemplate {
    pub nonce: String,
    pub section: ArticleSection,
    pub articles: Vec<Article>,
}

#[derive(Template, WebTemplate)]
#[template(path = "articles/show.html")]
pub struct ArticleTemplate {
    pub nonce: String,
    pub section: ArticleSection,
    pub article: Article,
}

async fn index(state: &AppState, nonce: CspNonce, section: ArticleSection) -> Result<ArticleIndexTemplate> {
    let articles = state.api().articles(section).await?;
    Ok(ArticleIndexTemplate {
        nonce: nonce.0,
        section,
        articles,
    })
}

async fn show(
    state: &AppState,
    nonce: CspNonce,
    section: ArticleSection,
    slug: &str,
) -> Result<ArticleTemplate> {
    // Malformed slugs can never exist, so skip the API round trip.
    let slug = Slug::parse(slug).map_err(|_| AppError::NotFound(slug.to_string()))?;
    let article = state.api().article(section, slug.as_str()).await?;
    Ok(ArticleTemplate {
        nonce: nonce.0,
        section,
        article,
    })
}

#[instrument(skip(state, nonce))]
pub async fn blog_index(State(state): State<AppState>, nonce: CspNonce) -> Result<ArticleIndexTemplate> {
    index(&state, nonce, ArticleSection::Blog).await
}

#[instrument(skip(state, nonce))]
pub async fn blog_post(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(slug): Path<String>,
) -> Result<ArticleTemplate> {
    show(&state, nonce, ArticleSection::Blog, &slug).await
}

#[instrument(skip(state, nonce))]
pub async fn care_index(State(state): State<AppState>, nonce: CspNonce) -> Result<ArticleIndexTemplate> {
    index(&state, nonce, ArticleSection::Care).await
}

#[instrument(skip(state, nonce))]
pub async fn care_article(
    State(state): State<AppState>,
    nonce: CspNonce,
    Path(slug): Path<String>,
) -> Result<ArticleTemplate> {
    show(&state, nonce, ArticleSection::Care, &slug).await
}
