//! Seed the database with site content from a YAML file.
//!
//! The whole file is validated before connecting, so a typo never leaves a
//! half-seeded database. Records that already exist are skipped: slugged
//! rows on unique conflicts, services by title, portfolio items by `src`.
//!
//! ```yaml
//! services:
//!   - title: Manicure
//!     description: Classic manicure with gel polish
//! portfolio:
//!   - type: image
//!     src: /uploads/nails-1.jpg
//!     category: nails
//! care:
//!   - title: After care
//!     content: <p>Avoid water for two hours.</p>
//! contacts:
//!   phone: "+7 900 123-45-67"
//!   instagram: "@atelier"
//!   address: 1 Main St
//! categories:
//!   - name: Care
//! tags:
//!   - name: Vegan
//! products:
//!   - name: Cuticle oil
//!     price: 12.5
//!     category: care
//!     tags: [vegan]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, error, info};

use atelier_api::db::{
    self, ArticleRepository, ContactRepository, PortfolioRepository, ProductRepository,
    RepositoryError, ServiceRepository, TaxonomyRepository,
};
use atelier_api::models::{
    ArticleDraft, ArticleInput, BlogPosts, CareArticles, Categories, ContactDraft, ContactInput,
    PortfolioDraft, PortfolioInput, ProductDraft, ProductInput, ServiceDraft, ServiceInput, Tags,
    TaxonomyDraft, TaxonomyInput, ValidationError,
};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: API_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("Unknown {kind} slug: {slug}")]
    UnknownReference { kind: &'static str, slug: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level layout of a seed file. Every section is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    services: Vec<ServiceInput>,
    portfolio: Vec<PortfolioInput>,
    care: Vec<ArticleInput>,
    blog: Vec<ArticleInput>,
    contacts: Option<ContactInput>,
    categories: Vec<TaxonomyInput>,
    tags: Vec<TaxonomyInput>,
    products: Vec<SeedProduct>,
}

/// A product that names its category and tags by slug.
#[derive(Debug, Deserialize)]
struct SeedProduct {
    category: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(flatten)]
    product: ProductInput,
}

/// Validated seed content.
#[derive(Debug, Default)]
struct Prepared {
    services: Vec<ServiceDraft>,
    portfolio: Vec<PortfolioDraft>,
    care: Vec<ArticleDraft>,
    blog: Vec<ArticleDraft>,
    contacts: Option<ContactDraft>,
    categories: Vec<TaxonomyDraft>,
    tags: Vec<TaxonomyDraft>,
    products: Vec<PendingProduct>,
}

#[derive(Debug)]
struct PendingProduct {
    draft: ProductDraft,
    category: Option<String>,
    tags: Vec<String>,
}

/// Inserted/skipped counts for one section.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    inserted: usize,
    skipped: usize,
}

impl Tally {
    /// Count a create result; unique conflicts are skips.
    fn record<T>(&mut self, section: &str, result: Result<T, RepositoryError>) -> Result<(), SeedError> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(RepositoryError::Conflict(what)) => {
                debug!(section, %what, "Already exists, skipping");
                self.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn log(self, section: &str) {
        info!(section, inserted = self.inserted, skipped = self.skipped, "Seeded");
    }
}

/// Deleted by `--clear`, children first. Services that appointments still
/// reference are kept.
const CLEAR_STATEMENTS: &[&str] = &[
    "DELETE FROM product_tags",
    "DELETE FROM products",
    "DELETE FROM tags",
    "DELETE FROM categories",
    "DELETE FROM blog_posts",
    "DELETE FROM care_articles",
    "DELETE FROM portfolio_items",
    "DELETE FROM contacts",
    "DELETE FROM services WHERE id NOT IN (SELECT service_id FROM appointments)",
];

/// Seed content from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, a product references
/// an unknown category or tag, or a database operation fails.
pub async fn content(path: &Path, clear_existing: bool) -> Result<(), SeedError> {
    if !path.exists() {
        return Err(SeedError::FileNotFound(path.display().to_string()));
    }

    info!(path = %path.display(), "Loading seed file");
    let raw = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&raw)?;

    let prepared = seed.prepare().map_err(|errors| {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        SeedError::Invalid(errors.len())
    })?;
    info!("Seed file validated");

    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if clear_existing {
        clear(&pool).await?;
        info!("Cleared existing content");
    }

    insert(&pool, prepared).await
}

impl SeedFile {
    /// Validate every record, labelling failures as `section[index]: message`.
    fn prepare(self) -> Result<Prepared, Vec<String>> {
        let mut errors = Vec::new();

        let services = validate("services", self.services, &mut errors, ServiceInput::into_draft);
        let portfolio = validate("portfolio", self.portfolio, &mut errors, PortfolioInput::into_draft);
        let care = validate("care", self.care, &mut errors, ArticleInput::into_draft);
        let blog = validate("blog", self.blog, &mut errors, ArticleInput::into_draft);
        let categories = validate("categories", self.categories, &mut errors, TaxonomyInput::into_draft);
        let tags = validate("tags", self.tags, &mut errors, TaxonomyInput::into_draft);
        let products = validate("products", self.products, &mut errors, |p| {
            Ok(PendingProduct {
                draft: p.product.into_draft()?,
                category: p.category,
                tags: p.tags,
            })
        });
        let contacts = match self.contacts.map(ContactInput::into_draft).transpose() {
            Ok(contacts) => contacts,
            Err(e) => {
                errors.push(format!("contacts: {e}"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Prepared {
            services,
            portfolio,
            care,
            blog,
            contacts,
            categories,
            tags,
            products,
        })
    }
}

fn validate<I, D>(
    section: &str,
    inputs: Vec<I>,
    errors: &mut Vec<String>,
    into_draft: impl Fn(I) -> Result<D, ValidationError>,
) -> Vec<D> {
    inputs
        .into_iter()
        .enumerate()
        .filter_map(|(i, input)| match into_draft(input) {
            Ok(draft) => Some(draft),
            Err(e) => {
                errors.push(format!("{section}[{i}]: {e}"));
                None
            }
        })
        .collect()
}

async fn clear(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in CLEAR_STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}

async fn insert(pool: &PgPool, prepared: Prepared) -> Result<(), SeedError> {
    // Services and portfolio items have no natural key, so match on content.
    let services = ServiceRepository::new(pool);
    let existing: HashSet<String> = services.list().await?.into_iter().map(|s| s.title).collect();
    let mut tally = Tally::default();
    for draft in &prepared.services {
        if existing.contains(&draft.title) {
            tally.skipped += 1;
        } else {
            tally.record("services", services.create(draft).await)?;
        }
    }
    tally.log("services");

    let portfolio = PortfolioRepository::new(pool);
    let existing: HashSet<String> = portfolio.list(None).await?.into_iter().map(|p| p.src).collect();
    let mut tally = Tally::default();
    for draft in &prepared.portfolio {
        if existing.contains(&draft.src) {
            tally.skipped += 1;
        } else {
            tally.record("portfolio", portfolio.create(draft).await)?;
        }
    }
    tally.log("portfolio");

    let care = ArticleRepository::<CareArticles>::new(pool);
    let mut tally = Tally::default();
    for draft in &prepared.care {
        tally.record("care", care.create(draft).await)?;
    }
    tally.log("care");

    let blog = ArticleRepository::<BlogPosts>::new(pool);
    let mut tally = Tally::default();
    for draft in &prepared.blog {
        tally.record("blog", blog.create(draft).await)?;
    }
    tally.log("blog");

    if let Some(draft) = &prepared.contacts {
        let contacts = ContactRepository::new(pool);
        if contacts.get().await?.is_some() {
            info!("Contacts already set, skipping");
        } else {
            contacts.upsert(draft).await?;
            info!("Seeded contacts");
        }
    }

    let categories = TaxonomyRepository::<Categories>::new(pool);
    let mut tally = Tally::default();
    for draft in &prepared.categories {
        tally.record("categories", categories.create(draft).await)?;
    }
    tally.log("categories");

    let tags = TaxonomyRepository::<Tags>::new(pool);
    let mut tally = Tally::default();
    for draft in &prepared.tags {
        tally.record("tags", tags.create(draft).await)?;
    }
    tally.log("tags");

    if prepared.products.is_empty() {
        return Ok(());
    }

    let category_ids: HashMap<String, _> = categories
        .list()
        .await?
        .into_iter()
        .map(|c| (c.slug.as_str().to_owned(), c.id))
        .collect();
    let tag_ids: HashMap<String, _> = tags
        .list()
        .await?
        .into_iter()
        .map(|t| (t.slug.as_str().to_owned(), t.id))
        .collect();

    let products = ProductRepository::new(pool);
    let mut tally = Tally::default();
    for pending in prepared.products {
        let mut draft = pending.draft;
        draft.category_id = match pending.category {
            Some(slug) => Some(*category_ids.get(&slug).ok_or(SeedError::UnknownReference {
                kind: "category",
                slug,
            })?),
            None => None,
        };
        for slug in pending.tags {
            let id = *tag_ids
                .get(&slug)
                .ok_or(SeedError::UnknownReference { kind: "tag", slug })?;
            draft.tag_ids.push(id);
        }
        draft.tag_ids.sort_by_key(|id| id.as_i32());
        draft.tag_ids.dedup();

        tally.record("products", products.create(&draft).await)?;
    }
    tally.log("products");

    Ok(())
}
