//! Domain models for the API.
//!
//! Each resource has three shapes:
//!
//! - the stored record (`Service`, `Client`, ...), serialized to clients in
//!   camelCase,
//! - an `*Input` deserialized from request bodies, with every field optional
//!   so the same type serves create and partial update,
//! - a validated `*Draft` handed to the repository.
//!
//! `Input::into_draft` validates a create; `Input::merge` fills omitted
//! fields from the stored record so an update is validated as a whole.

pub mod admin_user;
pub mod appointment;
pub mod article;
pub mod catalog;
pub mod client;
pub mod contact;
pub mod portfolio;
pub mod service;

use thiserror::Error;

pub use admin_user::{AdminUser, CurrentAdmin};
pub use appointment::{
    Appointment, AppointmentDraft, AppointmentFilter, AppointmentInput, BookedSlot, ClientRef,
    ServiceRef,
};
pub use article::{Article, ArticleDraft, ArticleInput, ArticleKind, BlogPosts, CareArticles};
pub use catalog::{
    Categories, CategoryRef, Product, ProductDraft, ProductFilter, ProductInput, ProductQuery,
    ProductSort, TagRef, Tags, Taxonomy, TaxonomyDraft, TaxonomyInput, TaxonomyKind,
};
pub use client::{Client, ClientDraft, ClientInput};
pub use contact::{Contact, ContactDraft, ContactInput};
pub use portfolio::{PortfolioDraft, PortfolioInput, PortfolioItem};
pub use service::{Service, ServiceDraft, ServiceInput};

/// A request body failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trimmed, non-blank required text.
pub(crate) fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(ValidationError::new(format!("{field} is required"))),
    }
}

/// Trimmed optional text; blank means absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("title", Some("  Manicure ".into())).unwrap(), "Manicure");
        assert_eq!(
            required("title", Some("   ".into())).unwrap_err().to_string(),
            "title is required"
        );
        assert!(required("title", None).is_err());
    }

    #[test]
    fn test_optional_treats_blank_as_none() {
        assert_eq!(optional(Some(" ".into())), None);
        assert_eq!(optional(Some(" /uploads/a.png ".into())).as_deref(), Some("/uploads/a.png"));
        assert_eq!(optional(None), None);
    }
}
