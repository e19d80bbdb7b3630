//! HTTP client for the Atelier REST API.
//!
//! Successful responses are cached in memory with `moka` for the configured
//! revalidation window, so a burst of page views costs one API round trip.
//! Errors and missing records are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::SiteConfig;
use crate::models::{Article, Contact, PortfolioItem, ResolveMedia, Service};

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body was not the expected envelope.
    #[error("Malformed API response: {0}")]
    Malformed(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Article collections served by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSection {
    Blog,
    Care,
}

impl ArticleSection {
    /// Collection path under `/api` and on the site.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Care => "care",
        }
    }

    /// Page heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Care => "Care",
        }
    }
}

/// `{"success": bool, "data"?: T, "message"?: string}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

#[derive(Clone)]
enum CacheValue {
    Services(Arc<Vec<Service>>),
    Portfolio(Arc<Vec<PortfolioItem>>),
    Articles(Arc<Vec<Article>>),
    Article(Arc<Article>),
    Contacts(Arc<Contact>),
}

/// Client for the REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
    media: Url,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &SiteConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .user_agent(concat!("atelier-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.media_url.clone(),
            config.cache_ttl,
        ))
    }

    fn with_client(client: reqwest::Client, base: Url, media: Url, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base,
                media,
                cache,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path)?)
    }

    /// GET a JSON envelope and return its `data`.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                %status,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Malformed(e.to_string())
        })?;

        if !status.is_success() || !envelope.success {
            return Err(ApiError::Status {
                status,
                message: envelope.message.unwrap_or_default(),
            });
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Malformed("envelope has no data".to_string()))
    }

    /// Fetch `path`, resolve media references and return the fresh value.
    async fn fetch<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned + ResolveMedia,
    {
        let url = self.endpoint(path)?;
        let mut value: T = self.get(url).await?;
        value.resolve_media(&self.inner.media);
        Ok(value)
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// All services, in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn services(&self) -> Result<Vec<Service>, ApiError> {
        let key = "services".to_string();
        if let Some(CacheValue::Services(items)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for services");
            return Ok(items.as_ref().clone());
        }

        let items: Vec<Service> = self.fetch("api/services").await?;
        self.inner
            .cache
            .insert(key, CacheValue::Services(Arc::new(items.clone())))
            .await;
        Ok(items)
    }

    /// All portfolio items, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn portfolio(&self) -> Result<Vec<PortfolioItem>, ApiError> {
        let key = "portfolio".to_string();
        if let Some(CacheValue::Portfolio(items)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for portfolio");
            return Ok(items.as_ref().clone());
        }

        let items: Vec<PortfolioItem> = self.fetch("api/portfolio").await?;
        self.inner
            .cache
            .insert(key, CacheValue::Portfolio(Arc::new(items.clone())))
            .await;
        Ok(items)
    }

    /// All articles of a section, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn articles(&self, section: ArticleSection) -> Result<Vec<Article>, ApiError> {
        let key = format!("articles:{}", section.path());
        if let Some(CacheValue::Articles(items)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for articles");
            return Ok(items.as_ref().clone());
        }

        let items: Vec<Article> = self.fetch(&format!("api/{}", section.path())).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Articles(Arc::new(items.clone())))
            .await;
        Ok(items)
    }

    /// One article by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown slugs, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn article(&self, section: ArticleSection, slug: &str) -> Result<Article, ApiError> {
        let key = format!("article:{}:{slug}", section.path());
        if let Some(CacheValue::Article(article)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for article");
            return Ok(article.as_ref().clone());
        }

        let article: Article = self
            .fetch(&format!("api/{}/slug/{slug}", section.path()))
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::Article(Arc::new(article.clone())))
            .await;
        Ok(article)
    }

    /// Salon contact details.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if contacts were never saved, or another
    /// error if the API request fails.
    #[instrument(skip(self))]
    pub async fn contacts(&self) -> Result<Contact, ApiError> {
        let key = "contacts".to_string();
        if let Some(CacheValue::Contacts(contact)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for contacts");
            return Ok(contact.as_ref().clone());
        }

        let contact: Contact = self.fetch("api/contacts").await?;
        self.inner
            .cache
            .insert(key, CacheValue::Contacts(Arc::new(contact.clone())))
            .await;
        Ok(contact)
    }

    /// Whether the API answers its liveness probe.
    pub async fn ping(&self) -> bool {
        let Ok(url) = self.endpoint("health") else {
            return false;
        };
        match self.inner.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "API health probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:4000/").unwrap(),
            Url::parse("https://media.atelier.test/").unwrap(),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_endpoint_joins_base() {
        let url = client().endpoint("api/care/slug/after-care").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4000/api/care/slug/after-care");
    }

    #[test]
    fn test_section_paths() {
        assert_eq!(ArticleSection::Blog.path(), "blog");
        assert_eq!(ArticleSection::Care.path(), "care");
    }

    #[test]
    fn test_envelope_error_shape() {
        let envelope: Envelope<Service> =
            serde_json::from_str(r#"{"success":false,"message":"Service not found"}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Service not found"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_http_error() {
        let client = ApiClient::with_client(
            reqwest::Client::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
            Url::parse("http://127.0.0.1:9/").unwrap(),
            Url::parse("http://127.0.0.1:9/").unwrap(),
            Duration::from_secs(60),
        );
        assert!(matches!(client.services().await, Err(ApiError::Http(_))));
        assert!(!client.ping().await);
    }
}
