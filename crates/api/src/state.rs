//! Handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::{TokenService, UploadStore};

/// Everything a handler can reach besides the request itself.
///
/// Repositories are not stored here; handlers build them on demand from
/// [`AppState::pool`], which is already a shared handle.
#[derive(Clone)]
pub struct AppState {
    shared: Arc<Shared>,
}

struct Shared {
    config: ApiConfig,
    pool: PgPool,
    tokens: TokenService,
    uploads: UploadStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let shared = Shared {
            tokens: TokenService::new(&config.jwt),
            uploads: UploadStore::new(config.upload_dir.clone()),
            config,
            pool,
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.shared.pool
    }

    /// Issues and verifies admin bearer tokens.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.shared.tokens
    }

    /// Media files under `/uploads`.
    #[must_use]
    pub fn uploads(&self) -> &UploadStore {
        &self.shared.uploads
    }
}
