//! Handler state.

use std::sync::Arc;

use crate::client::{ApiClient, ApiError};
use crate::config::SiteConfig;

/// Settings plus the cached API client. Both halves are reference counted,
/// so cloning per request is two pointer bumps.
#[derive(Clone)]
pub struct AppState {
    config: Arc<SiteConfig>,
    api: ApiClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization).
    pub fn new(config: SiteConfig) -> Result<Self, ApiError> {
        Ok(Self {
            api: ApiClient::new(&config)?,
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }
}
