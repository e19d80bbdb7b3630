//! API settings, read once at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `API_DATABASE_URL` (or `DATABASE_URL`) | required |
//! | `API_JWT_SECRET` | required, 32+ random characters |
//! | `API_JWT_TTL_HOURS` | `24` |
//! | `API_HOST` / `API_PORT` | `127.0.0.1` / `4000` |
//! | `API_CORS_ORIGINS` | `http://localhost:3000,http://localhost:5173` |
//! | `API_UPLOAD_DIR` | `uploads` |
//! | `API_MAX_UPLOAD_BYTES` | 10 MiB |
//! | `API_CLIENT_IP_HEADER` | unset: login attempts are keyed on the TCP peer |
//!
//! Logging and Sentry variables are read separately by
//! `atelier_core::telemetry`.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderName;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MIN_SECRET_CHARS: usize = 32;
/// Shannon entropy floor; hand-typed phrases sit well below it.
const MIN_SECRET_BITS_PER_CHAR: f64 = 3.3;
/// Fragments that show a secret was copied from a sample `.env`.
const SAMPLE_FRAGMENTS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "put-your",
    "insert",
    "todo",
    "xxx",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("{key} is not safe to sign tokens with: {reason}")]
    WeakSecret { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub jwt: JwtConfig,
    /// Browser origins allowed by CORS, without trailing slashes.
    pub cors_origins: Vec<String>,
    /// Root of `/uploads`; created on first write.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Header carrying the client address, set by a trusted reverse proxy
    /// (`cf-connecting-ip`, `fly-client-ip`, `x-forwarded-for`, ...). Only
    /// set this when clients cannot reach the API except through that proxy.
    pub client_ip_header: Option<HeaderName>,
}

/// HS256 signing settings for admin tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub ttl_hours: i64,
}

impl JwtConfig {
    /// Reveal the secret bytes for key construction.
    #[must_use]
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<hidden>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl ApiConfig {
    /// Read the process environment, after loading `.env` when present.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing database URL or signing secret, for
    /// any value that does not parse, and for a signing secret that looks
    /// like a sample value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = var("API_DATABASE_URL")
            .or_else(|| var("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("API_DATABASE_URL"))?;

        let secret = var("API_JWT_SECRET").ok_or(ConfigError::Missing("API_JWT_SECRET"))?;
        check_signing_secret("API_JWT_SECRET", &secret)?;
        let ttl_hours: i64 = parse_or("API_JWT_TTL_HOURS", 24)?;
        if ttl_hours < 1 {
            return Err(ConfigError::Invalid {
                key: "API_JWT_TTL_HOURS",
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(Self {
            database_url,
            host: parse_or("API_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or("API_PORT", DEFAULT_PORT)?,
            jwt: JwtConfig {
                secret: SecretString::from(secret),
                ttl_hours,
            },
            cors_origins: split_origins(
                var("API_CORS_ORIGINS").as_deref().unwrap_or(DEFAULT_CORS_ORIGINS),
            ),
            upload_dir: var("API_UPLOAD_DIR").map_or_else(|| "uploads".into(), PathBuf::from),
            max_upload_bytes: parse_or("API_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            client_ip_header: parse_opt("API_CLIENT_IP_HEADER")?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
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
    Ok(parse_opt(key)?.unwrap_or(default))
}

fn parse_opt<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Reject short secrets, sample values and low-entropy strings.
fn check_signing_secret(key: &'static str, secret: &str) -> Result<(), ConfigError> {
    let weak = |reason: String| Err(ConfigError::WeakSecret { key, reason });

    let chars = secret.chars().count();
    if chars < MIN_SECRET_CHARS {
        return weak(format!("needs {MIN_SECRET_CHARS} characters, has {chars}"));
    }

    let lower = secret.to_lowercase();
    if let Some(fragment) = SAMPLE_FRAGMENTS.iter().find(|f| lower.contains(*f)) {
        return weak(format!("contains {fragment:?}, which looks like a sample value"));
    }

    let bits = bits_per_char(secret);
    if bits < MIN_SECRET_BITS_PER_CHAR {
        return weak(format!(
            "{bits:.2} bits of entropy per character, needs {MIN_SECRET_BITS_PER_CHAR}; \
             generate one with `openssl rand -base64 48`"
        ));
    }
    Ok(())
}

fn bits_per_char(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / f64::from(total);
            -p * p.log2()
        })
        .sum()
}
