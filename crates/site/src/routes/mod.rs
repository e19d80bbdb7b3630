//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Home: services, latest works, contacts
//! GET  /services          - All services
//! GET  /portfolio         - Gallery, ?category= selects a tab
//! GET  /blog              - Blog posts
//! GET  /blog/{slug}       - Blog post
//! GET  /care              - Care articles
//! GET  /care/{slug}       - Care article
//! GET  /contacts          - Contact details
//! GET  /health            - Liveness
//! GET  /health/ready      - Readiness (API reachable)
//! ```

pub mod articles;
pub mod contacts;
pub mod home;
pub mod portfolio;
pub mod services;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Create the page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/services", get(services::index))
        .route("/portfolio", get(portfolio::index))
        .route("/blog", get(articles::blog_index))
        .route("/blog/{slug}", get(articles::blog_post))
        .route("/care", get(articles::care_index))
        .route("/care/{slug}", get(articles::care_article))
        .route("/contacts", get(contacts::index))
}

/// Liveness health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the API does not answer.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.api().ping().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
