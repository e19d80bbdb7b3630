//! Site settings, read once at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `SITE_HOST` / `SITE_PORT` | `127.0.0.1` / `3000` |
//! | `SITE_BASE_URL` | `http://localhost:3000` |
//! | `SITE_API_URL` | `http://127.0.0.1:4000` |
//! | `SITE_MEDIA_URL` | same as `SITE_API_URL` |
//! | `SITE_CACHE_TTL_SECS` | `60` |
//! | `SITE_API_TIMEOUT_SECS` | `5` |
//! | `SITE_STATIC_DIR` | `crates/site/static` |
//!
//! Nothing is required: a site started next to a local API needs no
//! configuration at all. Logging and Sentry are configured through
//! `atelier_core::telemetry`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:4000";

#[derive(Debug, Error)]
#[error("{key} is invalid: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Public URL of the site, used in canonical links.
    pub base_url: String,
    /// REST API the pages are rendered from.
    pub api_url: Url,
    /// Where browsers load `/uploads/...` from. Differs from `api_url` when
    /// the API is reached over a private network.
    pub media_url: Url,
    /// How long a successful API response is reused.
    pub cache_ttl: Duration,
    pub api_timeout: Duration,
    /// Served under `/static`; relative paths resolve from the working
    /// directory.
    pub static_dir: PathBuf,
}

impl SiteConfig {
    /// Read the process environment, after loading `.env` when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = base_url(
            "SITE_API_URL",
            var("SITE_API_URL").as_deref().unwrap_or(DEFAULT_API_URL),
        )?;
        let media_url = match var("SITE_MEDIA_URL") {
            Some(raw) => base_url("SITE_MEDIA_URL", &raw)?,
            None => api_url.clone(),
        };

        Ok(Self {
            host: parse_or("SITE_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("SITE_PORT", 3000)?,
            base_url: var("SITE_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_owned()),
            api_url,
            media_url,
            cache_ttl: Duration::from_secs(parse_or("SITE_CACHE_TTL_SECS", 60)?),
            api_timeout: Duration::from_secs(parse_or("SITE_API_TIMEOUT_SECS", 5)?),
            static_dir: var("SITE_STATIC_DIR")
                .map_or_else(|| "crates/site/static".into(), PathBuf::from),
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Origin of the media host, for the `img-src`/`media-src` CSP directives.
    #[must_use]
    pub fn media_origin(&self) -> String {
        self.media_url.origin().ascii_serialization()
    }
}

/// Blank values count as unset.
fn var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    var(key).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            reason: e.to_string(),
        })
    })
}

/// Parse an absolute URL and give it a trailing slash, so `join` appends to
/// its path instead of replacing the last segment.
fn base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError { key, reason };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("must be an absolute http(s) URL".to_owned()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let url = base_url("X", " http://api.internal:4000/v1 ").unwrap();
        assert_eq!(url.as_str(), "http://api.internal:4000/v1/");
        assert_eq!(url.join("api/services").unwrap().path(), "/v1/api/services");
    }

    #[test]
    fn test_base_url_rejections() {
        let err = base_url("SITE_API_URL", "localhost:4000").unwrap_err();
        assert_eq!(
            err.to_string(),
            "SITE_API_URL is invalid: must be an absolute http(s) URL"
        );
        assert!(base_url("SITE_API_URL", "/api").is_err());
        assert!(base_url("SITE_MEDIA_URL", "ftp://media.atelier.test").is_err());
    }

    #[test]
    fn test_media_origin_drops_path() {
        let config = SiteConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            api_url: base_url("X", DEFAULT_API_URL).unwrap(),
            media_url: base_url("X", "https://media.atelier.test/salon").unwrap(),
            cache_ttl: Duration::from_secs(60),
            api_timeout: Duration::from_secs(5),
            static_dir: PathBuf::from("static"),
        };
        assert_eq!(config.media_origin(), "https://media.atelier.test");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
