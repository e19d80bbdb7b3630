//! Logging, Sentry and shutdown handling shared by the API and site binaries.
//!
//! Enabled with the `telemetry` feature so that the CLI and library users of
//! the domain types do not pull in Sentry.

use std::borrow::Cow;

use sentry::integrations::tracing::EventFilter;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{key} must be a number between 0 and 1, got {value:?}")]
    InvalidRate { key: &'static str, value: String },
}

/// Log output and error reporting settings.
///
/// Read from `LOG_FORMAT`, `SENTRY_DSN`, `SENTRY_ENVIRONMENT`,
/// `SENTRY_SAMPLE_RATE` (default 1.0) and `SENTRY_TRACES_SAMPLE_RATE`
/// (default 0.1).
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    /// One JSON object per line instead of human-readable text.
    pub log_json: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub error_sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            error_sample_rate: 1.0,
            traces_sample_rate: 0.1,
        }
    }
}

impl Telemetry {
    /// # Errors
    ///
    /// Returns an error if a sample rate is set but is not within `0..=1`.
    pub fn from_env() -> Result<Self, TelemetryError> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            log_json: var("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            sentry_dsn: var("SENTRY_DSN"),
            sentry_environment: var("SENTRY_ENVIRONMENT"),
            error_sample_rate: rate("SENTRY_SAMPLE_RATE", var("SENTRY_SAMPLE_RATE"))?
                .unwrap_or(defaults.error_sample_rate),
            traces_sample_rate: rate("SENTRY_TRACES_SAMPLE_RATE", var("SENTRY_TRACES_SAMPLE_RATE"))?
                .unwrap_or(defaults.traces_sample_rate),
        })
    }

    /// Start Sentry (when a DSN is configured) and install the global
    /// subscriber. `RUST_LOG` overrides `default_filter`.
    ///
    /// The returned guard flushes pending events on drop, so keep it alive
    /// for the life of the process.
    pub fn install(
        &self,
        release: Option<Cow<'static, str>>,
        default_filter: &str,
    ) -> Option<sentry::ClientInitGuard> {
        let guard = self.sentry_dsn.as_deref().map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release,
                    environment: self.sentry_environment.clone().map(Cow::Owned),
                    sample_rate: self.error_sample_rate,
                    traces_sample_rate: self.traces_sample_rate,
                    attach_stacktrace: true,
                    ..Default::default()
                },
            ))
        });

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let json = self
            .log_json
            .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
        let text = (!self.log_json).then(tracing_subscriber::fmt::layer);

        tracing_subscriber::registry()
            .with(filter)
            .with(json)
            .with(text)
            .with(sentry::integrations::tracing::layer().event_filter(sentry_filter))
            .init();

        if guard.is_some() {
            tracing::info!(environment = ?self.sentry_environment, "Sentry reporting enabled");
        }
        guard
    }
}

/// Read [`Telemetry`] from the environment and install it.
///
/// Bad sample rates fall back to the defaults and are reported once logging
/// is up, so a typo in a Sentry variable never keeps a server from starting.
pub fn init(
    release: Option<Cow<'static, str>>,
    default_filter: &str,
) -> Option<sentry::ClientInitGuard> {
    let (telemetry, problem) = match Telemetry::from_env() {
        Ok(telemetry) => (telemetry, None),
        Err(e) => (Telemetry::default(), Some(e)),
    };
    let guard = telemetry.install(release, default_filter);
    if let Some(e) = problem {
        tracing::warn!(error = %e, "Ignoring invalid telemetry settings");
    }
    guard
}

fn rate(key: &'static str, raw: Option<String>) -> Result<Option<f32>, TelemetryError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<f32>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(Some(value)),
        _ => Err(TelemetryError::InvalidRate { key, value: raw }),
    }
}

/// Warnings and errors become Sentry events; info and debug ride along as
/// breadcrumbs.
fn sentry_filter(metadata: &tracing::Metadata<'_>) -> EventFilter {
    let level = *metadata.level();
    if level <= tracing::Level::WARN {
        EventFilter::Event
    } else if level <= tracing::Level::DEBUG {
        EventFilter::Breadcrumb
    } else {
        EventFilter::Ignore
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
///
/// A handler that cannot be installed is logged and never fires, so the
/// server keeps running on the other one.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
    tracing::info!("Shutting down, draining open connections");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_parsing() {
        assert_eq!(rate("R", None).unwrap(), None);
        assert_eq!(rate("R", Some(" 0.25 ".into())).unwrap(), Some(0.25));
        assert_eq!(rate("R", Some("1".into())).unwrap(), Some(1.0));
        assert!(rate("R", Some("1.5".into())).is_err());
        assert!(rate("R", Some("-0.1".into())).is_err());

        let err = rate("SENTRY_SAMPLE_RATE", Some("often".into())).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"SENTRY_SAMPLE_RATE must be a number between 0 and 1, got "often""#
        );
    }

    #[test]
    fn test_defaults() {
        let telemetry = Telemetry::default();
        assert!(!telemetry.log_json);
        assert!(telemetry.sentry_dsn.is_none());
        assert!((telemetry.traces_sample_rate - 0.1).abs() < f32::EPSILON);
    }
}
