//! Client repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::{ClientId, Email, Phone};

use super::{Constraints, RepositoryError, contains_pattern};
use crate::models::{Client, ClientDraft};

const COLUMNS: &str = "id, name, phone, email, notes, created_at, updated_at";
const CONSTRAINTS: Constraints = Constraints::new(
    "client with this phone already exists",
    "client has appointments and cannot be deleted",
);

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: ClientId,
    name: String,
    phone: Phone,
    email: Option<String>,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = RepositoryError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        let email = Email::parse_optional(row.email.as_deref()).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid client email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for CRM clients.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List clients by name, optionally matching `search` against name,
    /// phone or email (case-insensitive substring).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Client>, RepositoryError> {
        let pattern = search.map(contains_pattern);
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {COLUMNS} FROM clients
             WHERE $1::text IS NULL
                OR name ILIKE $1
                OR phone ILIKE $1
                OR email ILIKE $1
             ORDER BY name ASC, id ASC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already registered.
    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: &ClientDraft) -> Result<Client, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "INSERT INTO clients (name, phone, email, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(&draft.notes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        row.try_into()
    }

    /// Overwrite a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such client exists, or
    /// `RepositoryError::Conflict` if the phone belongs to another client.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update(&self, id: ClientId, draft: &ClientDraft) -> Result<Client, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            "UPDATE clients
             SET name = $2, phone = $3, email = $4, notes = $5, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.phone)
        .bind(&draft.email)
        .bind(&draft.notes)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such client exists, or
    /// `RepositoryError::Conflict` if the client still has appointments.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ClientId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
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
