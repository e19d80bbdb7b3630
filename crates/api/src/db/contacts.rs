//! Contact block repository. The table holds at most one row (`id = 1`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;
use crate::models::{Contact, ContactDraft};

const COLUMNS: &str = "phone, instagram, address, email, working_hours, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    phone: String,
    instagram: String,
    address: String,
    email: Option<String>,
    working_hours: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            phone: row.phone,
            instagram: row.instagram,
            address: row.address,
            email: row.email,
            working_hours: row.working_hours,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the salon contact block.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The contact block, if it has been set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {COLUMNS} FROM contacts WHERE id = 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create or replace the contact block.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    #[instrument(skip(self, draft))]
    pub async fn upsert(&self, draft: &ContactDraft) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "INSERT INTO contacts (id, phone, instagram, address, email, working_hours)
             VALUES (1, $1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE
             SET phone = EXCLUDED.phone,
                 instagram = EXCLUDED.instagram,
                 address = EXCLUDED.address,
                 email = EXCLUDED.email,
                 working_hours = EXCLUDED.working_hours,
                 updated_at = now()
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.phone)
        .bind(&draft.instagram)
        .bind(&draft.address)
        .bind(&draft.email)
        .bind(&draft.working_hours)
        .fetch_one(self.pool)
        .await?;

        tracing::info!("Contact block updated");
        Ok(row.into())
    }
}
