//! Product catalog: categories, tags and products.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{CategoryId, Price, ProductId, Slug, TagId};

use super::{ValidationError, optional, required};
use crate::response::PageRequest;

// =============================================================================
// Categories and tags
// =============================================================================

/// Distinguishes the two name+slug groupings at the type level.
pub trait TaxonomyKind: Copy + fmt::Debug + Eq + Send + Sync + 'static {
    /// Typed id of rows in this grouping.
    type Id: Copy + fmt::Debug + Eq + Serialize + From<i32> + Into<i32> + Send + Sync + 'static;

    /// Backing table.
    const TABLE: &'static str;

    /// Human name used in `"<label> not found"`.
    const LABEL: &'static str;
}

/// Product categories (one per product).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categories {}

impl TaxonomyKind for Categories {
    type Id = CategoryId;
    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
}

/// Product tags (many per product).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tags {}

impl TaxonomyKind for Tags {
    type Id = TagId;
    const TABLE: &'static str = "tags";
    const LABEL: &'static str = "Tag";
}

/// A stored category or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = ""))]
pub struct Taxonomy<K: TaxonomyKind> {
    pub id: K::Id,
    pub name: String,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body for categories and tags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonomyInput {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// Validated category/tag fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyDraft {
    pub name: String,
    pub slug: Slug,
}

impl TaxonomyInput {
    /// Validate; a missing slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name is blank or the slug invalid.
    pub fn into_draft(self) -> Result<TaxonomyDraft, ValidationError> {
        let name = required("name", self.name)?;
        let slug = parse_slug_or_derive(self.slug, &name)?;
        Ok(TaxonomyDraft { name, slug })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge<K: TaxonomyKind>(self, current: &Taxonomy<K>) -> Self {
        Self {
            name: self.name.or_else(|| Some(current.name.clone())),
            slug: self.slug.or_else(|| Some(current.slug.to_string())),
        }
    }
}

fn parse_slug_or_derive(raw: Option<String>, fallback: &str) -> Result<Slug, ValidationError> {
    match optional(raw) {
        Some(raw) => Slug::parse(&raw).map_err(|e| ValidationError::new(e.to_string())),
        None => Ok(Slug::from_title(fallback)),
    }
}

/// Category embedded in product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
}

/// Tag embedded in product reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
    pub slug: Slug,
}

// =============================================================================
// Products
// =============================================================================

/// A product with category and tags populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Price,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub in_stock: bool,
    pub category: Option<CategoryRef>,
    pub tags: Vec<TagRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Option<Vec<TagId>>,
    pub in_stock: Option<bool>,
}

/// Validated product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Price,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
    pub in_stock: bool,
}

impl ProductInput {
    /// Validate a new product. `inStock` defaults to true.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the name or price is missing or the slug
    /// is invalid.
    pub fn into_draft(self) -> Result<ProductDraft, ValidationError> {
        let name = required("name", self.name)?;
        let slug = parse_slug_or_derive(self.slug, &name)?;
        let price = self
            .price
            .ok_or_else(|| ValidationError::new("price is required"))?;
        let mut tag_ids = self.tag_ids.unwrap_or_default();
        tag_ids.sort_by_key(|id| id.as_i32());
        tag_ids.dedup();

        Ok(ProductDraft {
            name,
            slug,
            description: self.description.unwrap_or_default().trim().to_owned(),
            price,
            image: optional(self.image),
            category_id: self.category_id,
            tag_ids,
            in_stock: self.in_stock.unwrap_or(true),
        })
    }

    /// Fill omitted fields from `current`.
    #[must_use]
    pub fn merge(self, current: &Product) -> Self {
        Self {
            name: self.name.or_else(|| Some(current.name.clone())),
            slug: self.slug.or_else(|| Some(current.slug.to_string())),
            description: self.description.or_else(|| Some(current.description.clone())),
            price: self.price.or(Some(current.price)),
            image: self.image.or_else(|| current.image.clone()),
            category_id: self.category_id.or(current.category_id),
            tag_ids: self
                .tag_ids
                .or_else(|| Some(current.tags.iter().map(|t| t.id).collect())),
            in_stock: self.in_stock.or(Some(current.in_stock)),
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical.
    Name,
}

impl ProductSort {
    /// `ORDER BY` clause (columns of the `p` alias).
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC, p.id DESC",
            Self::PriceAsc => "p.price ASC, p.id ASC",
            Self::PriceDesc => "p.price DESC, p.id DESC",
            Self::Name => "p.name ASC, p.id ASC",
        }
    }
}

impl FromStr for ProductSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "-createdAt" => Ok(Self::Newest),
            "price" => Ok(Self::PriceAsc),
            "-price" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(ValidationError::new(format!(
                "sort must be one of newest, price, -price, name (got '{other}')"
            ))),
        }
    }
}

/// Raw `/api/products` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Parsed product filters handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub in_stock: Option<bool>,
    pub sort: ProductSort,
    pub page: PageRequest,
}

impl TryFrom<ProductQuery> for ProductFilter {
    type Error = ValidationError;

    fn try_from(query: ProductQuery) -> Result<Self, Self::Error> {
        let price = |raw: Option<String>, field: &str| {
            optional(raw)
                .map(|v| Price::parse(&v).map_err(|e| ValidationError::new(format!("{field}: {e}"))))
                .transpose()
        };
        let min_price = price(query.min_price, "minPrice")?;
        let max_price = price(query.max_price, "maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price)
            && min > max
        {
            return Err(ValidationError::new("minPrice cannot exceed maxPrice"));
        }

        Ok(Self {
            category: optional(query.category),
            tag: optional(query.tag),
            search: optional(query.search),
            min_price,
            max_price,
            in_stock: query.in_stock,
            sort: optional(query.sort)
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            page: PageRequest::new(query.page, query.limit),
        })
    }
}
