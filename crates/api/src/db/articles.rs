//! Care article and blog post repository.
//!
//! One implementation serves both tables; the [`ArticleKind`] parameter
//! picks the table and id type.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use atelier_core::Slug;

use super::{Constraints, RepositoryError};
use crate::models::{Article, ArticleDraft, ArticleKind};

const COLUMNS: &str =
    "id, slug, title, excerpt, content, image, sidebar_title, sidebar_text, created_at, updated_at";
const CONSTRAINTS: Constraints = Constraints::new("slug already exists", "article is referenced");

#[derive(Debug, sqlx::FromRow)]
struct ArticleRow {
    id: i32,
    slug: Slug,
    title: String,
    excerpt: String,
    content: String,
    image: Option<String>,
    sidebar_title: Option<String>,
    sidebar_text: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ArticleRow {
    fn into_article<K: ArticleKind>(self) -> Article<K> {
        Article {
            id: K::Id::from(self.id),
            slug: self.slug,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image: self.image,
            sidebar_title: self.sidebar_title,
            sidebar_text: self.sidebar_text,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for one article collection.
pub struct ArticleRepository<'a, K: ArticleKind> {
    pool: &'a PgPool,
    kind: PhantomData<K>,
}

impl<'a, K: ArticleKind> ArticleRepository<'a, K> {
    /// Create a new article repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    /// List articles newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn list(&self) -> Result<Vec<Article<K>>, RepositoryError> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY created_at DESC, id DESC",
            K::TABLE
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ArticleRow::into_article).collect())
    }

    /// Get an article by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn get(&self, id: K::Id) -> Result<Option<Article<K>>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = $1",
            K::TABLE
        ))
        .bind(Into::<i32>::into(id))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ArticleRow::into_article))
    }

    /// Get an article by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article<K>>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE slug = $1",
            K::TABLE
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ArticleRow::into_article))
    }

    /// Insert an article.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, draft), fields(table = K::TABLE, slug = %draft.slug))]
    pub async fn create(&self, draft: &ArticleDraft) -> Result<Article<K>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "INSERT INTO {} (slug, title, excerpt, content, image, sidebar_title, sidebar_text)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}",
            K::TABLE
        ))
        .bind(&draft.slug)
        .bind(&draft.title)
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(&draft.image)
        .bind(&draft.sidebar_title)
        .bind(&draft.sidebar_text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?;

        Ok(row.into_article())
    }

    /// Overwrite an article.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such article exists, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    #[instrument(skip(self, draft), fields(table = K::TABLE, slug = %draft.slug))]
    pub async fn update(&self, id: K::Id, draft: &ArticleDraft) -> Result<Article<K>, RepositoryError> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "UPDATE {}
             SET slug = $2, title = $3, excerpt = $4, content = $5, image = $6,
                 sidebar_title = $7, sidebar_text = $8, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}",
            K::TABLE
        ))
        .bind(Into::<i32>::into(id))
        .bind(&draft.slug)
        .bind(&draft.title)
        .bind(&draft.excerpt)
        .bind(&draft.content)
        .bind(&draft.image)
        .bind(&draft.sidebar_title)
        .bind(&draft.sidebar_text)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CONSTRAINTS.map(e))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into_article())
    }

    /// Delete an article.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such article exists.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn delete(&self, id: K::Id) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", K::TABLE))
            .bind(Into::<i32>::into(id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
