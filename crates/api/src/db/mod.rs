//! Database operations for the API.
//!
//! # Tables
//!
//! - `services`, `portfolio_items` - Site content
//! - `care_articles`, `blog_posts` - Slugged articles (same shape)
//! - `contacts` - Singleton contact block
//! - `clients`, `appointments` - CRM and scheduling
//! - `categories`, `tags`, `products`, `product_tags` - Catalog
//! - `admin_users` - Admin accounts with Argon2 password hashes
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod admin_users;
pub mod appointments;
pub mod articles;
pub mod catalog;
pub mod clients;
pub mod contacts;
pub mod portfolio;
pub mod services;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use appointments::AppointmentRepository;
pub use articles::ArticleRepository;
pub use catalog::{ProductRepository, TaxonomyRepository};
pub use clients::ClientRepository;
pub use contacts::ContactRepository;
pub use portfolio::PortfolioRepository;
pub use services::ServiceRepository;

/// SQLSTATE raised by an `EXCLUDE` constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug, referenced row).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An active appointment already holds an overlapping slot.
    #[error("time slot already booked")]
    SlotTaken,
}

/// Messages used when a write trips a constraint.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Constraints {
    /// Reported for unique violations.
    pub unique: &'static str,
    /// Reported for foreign key violations.
    pub foreign_key: &'static str,
}

impl Constraints {
    pub(crate) const fn new(unique: &'static str, foreign_key: &'static str) -> Self {
        Self {
            unique,
            foreign_key,
        }
    }

    /// Translate constraint violations into `Conflict`/`SlotTaken`.
    pub(crate) fn map(self, err: sqlx::Error) -> RepositoryError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) {
                return RepositoryError::SlotTaken;
            }
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return RepositoryError::Conflict(self.unique.to_owned());
                }
                ErrorKind::ForeignKeyViolation => {
                    return RepositoryError::Conflict(self.foreign_key.to_owned());
                }
                ErrorKind::CheckViolation => {
                    return RepositoryError::Conflict(format!(
                        "value rejected by constraint {}",
                        db_err.constraint().unwrap_or("check")
                    ));
                }
                _ => {}
            }
        }
        RepositoryError::Database(err)
    }
}

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("anna"), "%anna%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = Constraints::new("dup", "fk").map(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
