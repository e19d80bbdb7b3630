//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{Contact, PortfolioItem, Service};
use crate::state::AppState;

/// Number of services shown on the home page.
const FEATURED_SERVICES: usize = 6;

/// Number of portfolio items shown on the home page.
const LATEST_WORKS: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nonce: String,
    pub services: Vec<Service>,
    pub works: Vec<PortfolioItem>,
    pub contact: Option<Contact>,
}

/// Display the home page.
///
/// Services are required; the portfolio strip and contact block are left
/// out when the API cannot provide them.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, nonce: CspNonce) -> Result<HomeTemplate> {
    let api = state.api();
    let (services, works, contact) = tokio::join!(api.services(), api.portfolio(), api.contacts());

    let mut services = services?;
    services.truncate(FEATURED_SERVICES);

    let works = works.map_or_else(
        |e| {
            tracing::error!("Failed to fetch portfolio: {e}");
            Vec::new()
        },
        |mut items| {
            items.truncate(LATEST_WORKS);
            items
        },
    );

    let contact = contact
        .inspect_err(|e| tracing::warn!("Contacts unavailable: {e}"))
        .ok();

    Ok(HomeTemplate {
        nonce: nonce.0,
        services,
        works,
        contact,
    })
}
