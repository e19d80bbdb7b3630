//! Service repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::ServiceId;

use super::{Constraints, RepositoryError};
use crate::models::{Service, ServiceDraft};

const COLUMNS: &str = "id, title, description, image, created_at, updated_at";
const CONSTRAINTS: Constraints = Constraints::new(
    "service already exists",
    "service is still referenced by appointments",
);

#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: ServiceId,
    title: String,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for salon services.
pub struct ServiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ServiceRepository<'a> {
    /// Create a new service repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List services in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Service>, RepositoryError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {COLUMNS} FROM services ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a service by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: ServiceId) -> Result<Option<Service>, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "INSERT INTO services (title, description, image)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        Ok(row.into())
    }

    /// Overwrite a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such service exists.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update(&self, id: ServiceId, draft: &ServiceDraft) -> Result<Service, RepositoryError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "UPDATE services
             SET title = $2, description = $3, image = $4, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.image)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such service exists, or
    /// `RepositoryError::Conflict` if appointments still reference it.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ServiceId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CONSTRAINTS.map(e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
