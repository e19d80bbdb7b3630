//! Slugged long-form content: care articles and blog posts.
//!
//! Both collections share one shape and differ only in table, id type and
//! the label used in error messages, captured by [`ArticleKind`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{BlogPostId, CareArticleId, Slug};

use super::{ValidationError, optional, required};

/// Distinguishes the article collections at the type level.
pub trait ArticleKind: Copy + fmt::Debug + Eq + Send + Sync + 'static {
    /// Typed id of rows in this collection.
    type Id: Copy + fmt::Debug + Eq + Serialize + From<i32> + Into<i32> + Send + Sync + 'static;

    /// Backing table.
    const TABLE: &'static str;

    /// Human name used in `"<label> not found"`.
    const LABEL: &'static str;
}

/// Hair, nail and skin care guides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareArticles {}

impl ArticleKind for CareArticles {
    type Id = CareArticleId;
    const TABLE: &'static str = "care_articles";
    const LABEL: &'static str = "Article";
}

/// Salon news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogPosts {}

impl ArticleKind for BlogPosts {
    type Id = BlogPostId;
    const TABLE: &'static str = "blog_posts";
    const LABEL: &'static str = "Post";
}

/// A stored article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
pub struct Article<K: ArticleKind> {
    pub id: K::Id,
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub sidebar_title: Option<String>,
    pub sidebar_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub sidebar_title: Option<String>,
    pub sidebar_text: Option<String>,
}

/// Validated article fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub slug: Slug,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: Option<String>,
    pub sidebar_title: Option<String>,
    pub sidebar_text: Option<String>,
}

impl ArticleInput {
    /// Validate a new article. A missing slug is derived from the title.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the title is blank or the slug is not
    /// canonical (`[a-z0-9-]`, no stray dashes).
    pub fn into_draft(self) -> Result<ArticleDraft, ValidationError> {
        let title = required("title", self.title)?;
        let slug = match optional(self.slug) {
            Some(raw) => Slug::parse(&raw).map_err(|e| ValidationError::new(e.to_string()))?,
            None => Slug::from_title(&title),
        };

        Ok(ArticleDraft {
            slug,
            title,
            excerpt: self.excerpt.unwrap_or_default().trim().to_owned(),
            content: self.content.unwrap_or_default(),
            image: optional(self.image),
            sidebar_title: optional(self.sidebar_title),
            sidebar_text: optional(self.sidebar_text),
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge<K: ArticleKind>(self, current: &Article<K>) -> Self {
        Self {
            slug: self.slug.or_else(|| Some(current.slug.to_string())),
            title: self.title.or_else(|| Some(current.title.clone())),
            excerpt: self.excerpt.or_else(|| Some(current.excerpt.clone())),
            content: self.content.or_else(|| Some(current.content.clone())),
            image: self.image.or_else(|| current.image.clone()),
            sidebar_title: self.sidebar_title.or_else(|| current.sidebar_title.clone()),
            sidebar_text: self.sidebar_text.or_else(|| current.sidebar_text.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_derived_from_title() {
        let draft = ArticleInput {
            title: Some("After Keratin: First 72 Hours".into()),
            ..Default::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.slug.as_str(), "after-keratin-first-72-hours");
    }

    #[test]
    fn test_explicit_slug_must_be_canonical() {
        let err = ArticleInput {
            title: Some("Nails".into()),
            slug: Some("Nails 101".into()),
            ..Default::default()
        }
        .into_draft()
        .unwrap_err();
        assert!(err.to_string().contains("slug"));
    }

    #[test]
    fn test_merge_keeps_slug() {
        let stored: Article<BlogPosts> = Article {
            id: BlogPostId::new(3),
            slug: Slug::parse("opening").unwrap(),
            title: "Opening".into(),
            excerpt: String::new(),
            content: "<p>hi</p>".into(),
            image: None,
            sidebar_title: Some("Hours".into()),
            sidebar_text: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let draft = ArticleInput {
            title: Some("Grand opening".into()),
            ..Default::default()
        }
        .merge(&stored)
        .into_draft()
        .unwrap();
        assert_eq!(draft.slug.as_str(), "opening");
        assert_eq!(draft.title, "Grand opening");
        assert_eq!(draft.sidebar_title.as_deref(), Some("Hours"));
    }

    #[test]
    fn test_serializes_sidebar_camel_case() {
        let stored: Article<CareArticles> = Article {
            id: CareArticleId::new(1),
            slug: Slug::parse("brows").unwrap(),
            title: "Brows".into(),
            excerpt: String::new(),
            content: String::new(),
            image: None,
            sidebar_title: Some("Tip".into()),
            sidebar_text: Some("Brush daily".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["sidebarTitle"], "Tip");
        assert_eq!(value["slug"], "brows");
    }
}
