//! Portfolio gallery with category tabs.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::PortfolioItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub category: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
    pub nonce: String,
    pub categories: Vec<String>,
    /// Selected tab; `None` shows everything.
    pub active: Option<String>,
    pub items: Vec<PortfolioItem>,
}

impl PortfolioTemplate {
    fn is_active(&self, category: &str) -> bool {
        self.active.as_deref() == Some(category)
    }
}

/// Distinct categories in order of first appearance.
fn categories(items: &[PortfolioItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !seen.iter().any(|c| c == &item.category) {
            seen.push(item.category.clone());
        }
    }
    seen
}

#[instrument(skip(state, nonce))]
pub async fn index(
    State(state): State<AppState>,
    nonce: CspNonce,
    Query(query): Query<PortfolioQuery>,
) -> Result<PortfolioTemplate> {
    let all = state.api().portfolio().await?;
    let categories = categories(&all);
    let active = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let items = match &active {
        Some(category) => all.into_iter().filter(|i| &i.category == category).collect(),
        None => all,
    };

    Ok(PortfolioTemplate {
        nonce: nonce.0,
        categories,
        active,
        items,
    })
}
