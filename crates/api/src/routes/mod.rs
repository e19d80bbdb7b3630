//! HTTP route handlers for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database reachable)
//!
//! # Auth
//! POST /api/auth/login                 - Email + password, returns a bearer token (rate limited)
//! GET  /api/auth/me                    - Current admin
//!
//! # Site content (GET public, writes admin)
//! /api/services[/{id}]
//! /api/portfolio[/{id}]                - ?category=
//! /api/care[/{id}], /api/care/slug/{slug}
//! /api/blog[/{id}], /api/blog/slug/{slug}
//! GET /api/contacts, PUT /api/contacts
//!
//! # CRM (admin)
//! /api/clients[/{id}]                  - ?search=
//! /api/appointments[/{id}]             - ?date=&status=&clientId=
//! GET /api/appointments/availability   - ?date=
//!
//! # Catalog (GET public, writes admin)
//! /api/products[/{id}], /api/products/slug/{slug}
//! /api/categories[/{id}], /api/tags[/{id}]
//!
//! # Media (admin)
//! POST   /api/upload                   - multipart, field `image` or `file`
//! DELETE /api/upload/{filename}
//! ```

pub mod appointments;
pub mod articles;
pub mod auth;
pub mod catalog;
pub mod clients;
pub mod contacts;
pub mod portfolio;
pub mod services;
pub mod uploads;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::config::ApiConfig;
use crate::middleware::auth_rate_limiter;
use crate::models::{BlogPosts, CareArticles, Categories, Tags};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(config: &ApiConfig) -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(auth::login))
        .route_layer(auth_rate_limiter(config.client_ip_header.clone()));

    Router::new().route("/me", get(auth::me)).merge(login)
}

/// Create the service routes router.
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(services::index).post(services::create))
        .route(
            "/{id}",
            get(services::show)
                .put(services::update)
                .delete(services::destroy),
        )
}

/// Create the portfolio routes router.
pub fn portfolio_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(portfolio::index).post(portfolio::create))
        .route(
            "/{id}",
            get(portfolio::show)
                .put(portfolio::update)
                .delete(portfolio::destroy),
        )
}

/// Create the routes for one article collection.
fn article_routes<K: crate::models::ArticleKind>() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::index::<K>).post(articles::create::<K>))
        .route("/slug/{slug}", get(articles::show_by_slug::<K>))
        .route(
            "/{id}",
            get(articles::show::<K>)
                .put(articles::update::<K>)
                .delete(articles::destroy::<K>),
        )
}

/// Create the client routes router.
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::index).post(clients::create))
        .route(
            "/{id}",
            get(clients::show).put(clients::update).delete(clients::destroy),
        )
}

/// Create the appointment routes router.
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(appointments::index).post(appointments::create))
        .route("/availability", get(appointments::availability))
        .route(
            "/{id}",
            get(appointments::show)
                .put(appointments::update)
                .delete(appointments::destroy),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::products).post(catalog::create_product))
        .route("/slug/{slug}", get(catalog::product_by_slug))
        .route(
            "/{id}",
            get(catalog::product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
}

/// Create the routes for categories or tags.
fn taxonomy_routes<K: crate::models::TaxonomyKind>() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::taxonomy_index::<K>).post(catalog::taxonomy_create::<K>),
        )
        .route(
            "/{id}",
            get(catalog::taxonomy_show::<K>)
                .put(catalog::taxonomy_update::<K>)
                .delete(catalog::taxonomy_delete::<K>),
        )
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(uploads::upload))
        .route("/{filename}", axum::routing::delete(uploads::delete))
}

/// Create all `/api` routes.
pub fn routes(config: &ApiConfig) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes(config))
        .nest("/api/services", service_routes())
        .nest("/api/portfolio", portfolio_routes())
        .nest("/api/care", article_routes::<CareArticles>())
        .nest("/api/blog", article_routes::<BlogPosts>())
        .route("/api/contacts", get(contacts::show).put(contacts::upsert))
        .nest("/api/clients", client_routes())
        .nest("/api/appointments", appointment_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", taxonomy_routes::<Categories>())
        .nest("/api/tags", taxonomy_routes::<Tags>())
        .nest("/api/upload", upload_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
