//! Portfolio repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::{PortfolioItemId, PortfolioKind};

use super::{Constraints, RepositoryError};
use crate::models::{PortfolioDraft, PortfolioItem};

const COLUMNS: &str = "id, kind, src, category, created_at, updated_at";
const CONSTRAINTS: Constraints = Constraints::new("item already exists", "item is referenced");

#[derive(Debug, sqlx::FromRow)]
struct PortfolioRow {
    id: PortfolioItemId,
    kind: PortfolioKind,
    src: String,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PortfolioRow> for PortfolioItem {
    fn from(row: PortfolioRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            src: row.src,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for portfolio items.
pub struct PortfolioRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PortfolioRepository<'a> {
    /// Create a new portfolio repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List items newest first, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<PortfolioItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, PortfolioRow>(&format!(
            "SELECT {COLUMNS} FROM portfolio_items
             WHERE ($1::text IS NULL OR category = $1)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: PortfolioItemId) -> Result<Option<PortfolioItem>, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "SELECT {COLUMNS} FROM portfolio_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, draft), fields(category = %draft.category))]
    pub async fn create(&self, draft: &PortfolioDraft) -> Result<PortfolioItem, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "INSERT INTO portfolio_items (kind, src, category)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(draft.kind)
        .bind(&draft.src)
        .bind(&draft.category)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        Ok(row.into())
    }

    /// Overwrite an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such item exists.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update(
        &self,
        id: PortfolioItemId,
        draft: &PortfolioDraft,
    ) -> Result<PortfolioItem, RepositoryError> {
        let row = sqlx::query_as::<_, PortfolioRow>(&format!(
            "UPDATE portfolio_items
             SET kind = $2, src = $3, category = $4, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(draft.kind)
        .bind(&draft.src)
        .bind(&draft.category)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such item exists.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: PortfolioItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
