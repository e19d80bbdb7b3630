//! `atelier-site`: the public salon website.
//!
//! Pages are rendered with Askama from data fetched over HTTP from
//! `atelier-api`; the site has no database of its own.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::error::Error;
use std::process::ExitCode;

use atelier_core::telemetry::{self, shutdown_signal};
use atelier_site::app;
use atelier_site::config::SiteConfig;
use atelier_site::state::AppState;

const DEFAULT_LOG_FILTER: &str = "atelier_site=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _sentry = telemetry::init(sentry::release_name!(), DEFAULT_LOG_FILTER);

    let outcome = match SiteConfig::from_env() {
        Ok(config) => serve(config).await,
        Err(e) => Err(e.into()),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Site stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: SiteConfig) -> Result<(), Box<dyn Error>> {
    let addr = config.socket_addr();
    tracing::info!(
        api = %config.api_url,
        media = %config.media_url,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        "Rendering content from API"
    );

    let router = app(AppState::new(config)?)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Site listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
