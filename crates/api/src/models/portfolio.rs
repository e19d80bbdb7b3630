//! Portfolio gallery items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{PortfolioItemId, PortfolioKind};

use super::{ValidationError, required};

/// An image or video in the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: PortfolioItemId,
    #[serde(rename = "type")]
    pub kind: PortfolioKind,
    pub src: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    #[serde(rename = "type")]
    pub kind: Option<PortfolioKind>,
    pub src: Option<String>,
    pub category: Option<String>,
}

/// Validated portfolio fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioDraft {
    pub kind: PortfolioKind,
    pub src: String,
    pub category: String,
}

impl PortfolioInput {
    /// Validate a new item. `type` defaults to `image`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `src` or `category` is missing.
    pub fn into_draft(self) -> Result<PortfolioDraft, ValidationError> {
        Ok(PortfolioDraft {
            kind: self.kind.unwrap_or_default(),
            src: required("src", self.src)?,
            category: required("category", self.category)?,
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge(self, current: &PortfolioItem) -> Self {
        Self {
            kind: self.kind.or(Some(current.kind)),
            src: self.src.or_else(|| Some(current.src.clone())),
            category: self.category.or_else(|| Some(current.category.clone())),
        }
    }
}
