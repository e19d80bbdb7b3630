//! `atelier-api`: the JSON backend behind the salon site and admin console.
//!
//! Content, clients, appointments and the catalog live in `PostgreSQL`;
//! uploaded media is written to `API_UPLOAD_DIR` and served under `/uploads`.
//! Admin routes take an HS256 bearer token from `POST /api/auth/login`.
//!
//! Schema changes are applied with `atelier migrate`, never at startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::error::Error;
use std::net::SocketAddr;
use std::process::ExitCode;

use atelier_api::config::ApiConfig;
use atelier_api::state::AppState;
use atelier_api::{app, db};
use atelier_core::telemetry::{self, shutdown_signal};

const DEFAULT_LOG_FILTER: &str = "atelier_api=info,tower_http=info,sqlx=warn";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _sentry = telemetry::init(sentry::release_name!(), DEFAULT_LOG_FILTER);

    let outcome = match ApiConfig::from_env() {
        Ok(config) => serve(config).await,
        Err(e) => Err(e.into()),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "API stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ApiConfig) -> Result<(), Box<dyn Error>> {
    let pool = db::create_pool(&config.database_url).await?;
    let addr = config.socket_addr();
    tracing::info!(
        uploads = %config.upload_dir.display(),
        origins = ?config.cors_origins,
        client_ip_header = ?config.client_ip_header,
        "Database connected"
    );

    let router = app(AppState::new(config, pool))
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API listening");

    // The login rate limiter keys on the peer unless API_CLIENT_IP_HEADER is set.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}
