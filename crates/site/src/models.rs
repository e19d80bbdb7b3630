//! Content records as the site receives them from the REST API.
//!
//! Only the fields the pages render are deserialized; anything else in the
//! API payload is ignored.

use atelier_core::PortfolioKind;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

/// A salon service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
}

/// A portfolio image or video.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: PortfolioKind,
    pub src: String,
    pub category: String,
}

impl PortfolioItem {
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == PortfolioKind::Video
    }
}

/// A blog post or care article.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i32,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    /// Trusted HTML authored in the admin console.
    #[serde(default)]
    pub content: String,
    pub image: Option<String>,
    pub sidebar_title: Option<String>,
    pub sidebar_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Publication date as shown under the title.
    #[must_use]
    pub fn published(&self) -> String {
        self.created_at.format("%d.%m.%Y").to_string()
    }

    #[must_use]
    pub fn has_sidebar(&self) -> bool {
        self.sidebar_title.as_deref().is_some_and(|t| !t.is_empty())
            || self.sidebar_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Salon contact details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub address: String,
    pub email: Option<String>,
    pub working_hours: Option<String>,
}

impl Contact {
    /// `tel:` link target with formatting characters removed.
    #[must_use]
    pub fn phone_href(&self) -> String {
        let digits: String = self
            .phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        format!("tel:{digits}")
    }

    /// Instagram profile URL; accepts a handle, `@handle` or a full URL.
    #[must_use]
    pub fn instagram_url(&self) -> String {
        let value = self.instagram.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            value.to_string()
        } else {
            format!("https://instagram.com/{}", value.trim_start_matches('@'))
        }
    }
}

/// Rewrites API-relative media paths to absolute URLs on the media host.
pub trait ResolveMedia {
    fn resolve_media(&mut self, base: &Url);
}

/// Resolve one media reference. Absolute URLs and unparseable values pass through.
#[must_use]
pub fn media_url(base: &Url, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
        return src.to_string();
    }
    base.join(src.trim_start_matches('/'))
        .map_or_else(|_| src.to_string(), String::from)
}

impl ResolveMedia for Service {
    fn resolve_media(&mut self, base: &Url) {
        self.image = self.image.take().map(|src| media_url(base, &src));
    }
}

impl ResolveMedia for PortfolioItem {
    fn resolve_media(&mut self, base: &Url) {
        self.src = media_url(base, &self.src);
    }
}

impl ResolveMedia for Article {
    fn resolve_media(&mut self, base: &Url) {
        self.image = self.image.take().map(|src| media_url(base, &src));
    }
}

impl<T: ResolveMedia> ResolveMedia for Vec<T> {
    fn resolve_media(&mut self, base: &Url) {
        for item in self {
            item.resolve_media(base);
        }
    }
}

impl ResolveMedia for Contact {
    fn resolve_media(&mut self, _base: &Url) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.atelier.test/").unwrap()
    }

    #[test]
    fn test_media_url_prefixes_upload_paths() {
        assert_eq!(
            media_url(&base(), "/uploads/a1.jpg"),
            "https://api.atelier.test/uploads/a1.jpg"
        );
        assert_eq!(
            media_url(&base(), "uploads/a1.jpg"),
            "https://api.atelier.test/uploads/a1.jpg"
        );
    }

    #[test]
    fn test_media_url_keeps_absolute() {
        let src = "https://cdn.example.net/x.png";
        assert_eq!(media_url(&base(), src), src);
    }

    #[test]
    fn test_portfolio_item_deserializes_type() {
        let item: PortfolioItem = serde_json::from_str(
            r#"{"id":3,"type":"video","src":"/uploads/v.mp4","category":"nails","createdAt":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(item.is_video());
        assert_eq!(item.category, "nails");
    }

    #[test]
    fn test_contact_links() {
        let contact = Contact {
            phone: "+7 (900) 123-45-67".into(),
            instagram: "@atelier.nails".into(),
            address: String::new(),
            email: None,
            working_hours: None,
        };
        assert_eq!(contact.phone_href(), "tel:+79001234567");
        assert_eq!(contact.instagram_url(), "https://instagram.com/atelier.nails");
    }

    #[test]
    fn test_article_sidebar_detection() {
        let mut article: Article = serde_json::from_str(
            r#"{"id":1,"slug":"after-care","title":"After care","createdAt":"2025-03-02T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(!article.has_sidebar());
        assert_eq!(article.published(), "02.03.2025");

        article.sidebar_text = Some("Avoid water for 2 hours".into());
        assert!(article.has_sidebar());
    }
}
