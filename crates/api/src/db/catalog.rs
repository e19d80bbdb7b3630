//! Catalog repositories: categories, tags and products.

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use atelier_core::{CategoryId, Price, ProductId, Slug, TagId};

use super::{Constraints, RepositoryError, contains_pattern};
use crate::models::{
    CategoryRef, Product, ProductDraft, ProductFilter, TagRef, Taxonomy, TaxonomyDraft, TaxonomyKind,
};

// =============================================================================
// Categories and tags
// =============================================================================

const TAXONOMY_COLUMNS: &str = "id, name, slug, created_at, updated_at";
const TAXONOMY_CONSTRAINTS: Constraints = Constraints::new("slug already exists", "still referenced");

#[derive(Debug, sqlx::FromRow)]
struct TaxonomyRow {
    id: i32,
    name: String,
    slug: Slug,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaxonomyRow {
    fn into_taxonomy<K: TaxonomyKind>(self) -> Taxonomy<K> {
        Taxonomy {
            id: K::Id::from(self.id),
            name: self.name,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for categories or tags, chosen by `K`.
pub struct TaxonomyRepository<'a, K: TaxonomyKind> {
    pool: &'a PgPool,
    kind: PhantomData<K>,
}

impl<'a, K: TaxonomyKind> TaxonomyRepository<'a, K> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    /// List entries alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn list(&self) -> Result<Vec<Taxonomy<K>>, RepositoryError> {
        let rows = sqlx::query_as::<_, TaxonomyRow>(&format!(
            "SELECT {TAXONOMY_COLUMNS} FROM {} ORDER BY name ASC, id ASC",
            K::TABLE
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(TaxonomyRow::into_taxonomy).collect())
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(table = K::TABLE))]
    pub async fn get(&self, id: K::Id) -> Result<Option<Taxonomy<K>>, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonomyRow>(&format!(
            "SELECT {TAXONOMY_COLUMNS} FROM {} WHERE id = $1",
            K::TABLE
        ))
        .bind(Into::<i32>::into(id))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(TaxonomyRow::into_taxonomy))
    }

    /// Insert an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    #[instrument(skip(self, draft), fields(table = K::TABLE, slug = %draft.slug))]
    pub async fn create(&self, draft: &TaxonomyDraft) -> Result<Taxonomy<K>, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonomyRow>(&format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING {TAXONOMY_COLUMNS}",
            K::TABLE
        ))
        .bind(&draft.name)
        .bind(&draft.slug)
        .fetch_one(self.pool)
        .await
        .map_err(|e| TAXONOMY_CONSTRAINTS.map(e))?;

        Ok(row.into_taxonomy())
    }

    /// Overwrite an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such entry exists, or
    /// `RepositoryError::Conflict` if the new slug is taken.
    #[instrument(skip(self, draft), fields(table = K::TABLE, slug = %draft.slug))]
    pub async fn update(&self, id: K::Id, draft: &TaxonomyDraft) -> Result<Taxonomy<K>, RepositoryError> {
        let row = sqlx::query_as::<_, TaxonomyRow>(&format!(
            "UPDATE {} SET name = $2, slug = $3, updated_at = now()
             WHERE id = $1
             RETURNING {TAXONOMY_COLUMNS}",
            K::TABLE
        ))
        .bind(Into::<i32>::into(id))
        .bind(&draft.name)
        .bind(&draft.slug)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| TAXONOMY_CONSTRAINTS.map(e))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into_taxonomy())
    }

    /// Delete an entry. Products in a deleted category become uncategorised;
    /// a deleted tag is removed from every product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such entry exists.
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

// =============================================================================
// Products
// =============================================================================

const PRODUCT_SELECT: &str = "
    SELECT p.id, p.name, p.slug, p.description, p.price, p.image, p.category_id,
           p.in_stock, p.created_at, p.updated_at,
           c.name AS category_name, c.slug AS category_slug
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id";

const PRODUCT_CONSTRAINTS: Constraints = Constraints::new(
    "slug already exists",
    "categoryId or tagIds reference a missing record",
);

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    slug: Slug,
    description: String,
    price: Price,
    image: Option<String>,
    category_id: Option<CategoryId>,
    in_stock: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    category_slug: Option<Slug>,
}

impl ProductRow {
    fn into_product(self, tags: Vec<TagRef>) -> Product {
        let category = match (self.category_id, self.category_name, self.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };

        Product {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            price: self.price,
            image: self.image,
            category_id: self.category_id,
            in_stock: self.in_stock,
            category,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductTagRow {
    product_id: ProductId,
    id: TagId,
    name: String,
    slug: Slug,
}

/// Append the `WHERE` clause shared by the page and count queries.
fn push_filters<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q ProductFilter) {
    qb.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        qb.push(" AND c.slug = ").push_bind(category);
    }
    if let Some(tag) = &filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM product_tags pt JOIN tags t ON t.id = pt.tag_id
              WHERE pt.product_id = p.id AND t.slug = ",
        )
        .push_bind(tag)
        .push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        qb.push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ").push_bind(max);
    }
    if let Some(in_stock) = filter.in_stock {
        qb.push(" AND p.in_stock = ").push_bind(in_stock);
    }
}

/// Load tags for `products`, keyed by product.
async fn load_tags(
    conn: &mut PgConnection,
    products: &[ProductId],
) -> Result<HashMap<ProductId, Vec<TagRef>>, RepositoryError> {
    if products.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<i32> = products.iter().map(ProductId::as_i32).collect();
    let rows = sqlx::query_as::<_, ProductTagRow>(
        "SELECT pt.product_id, t.id, t.name, t.slug
         FROM product_tags pt
         JOIN tags t ON t.id = pt.tag_id
         WHERE pt.product_id = ANY($1)
         ORDER BY t.name ASC",
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut tags: HashMap<ProductId, Vec<TagRef>> = HashMap::new();
    for row in rows {
        tags.entry(row.product_id).or_default().push(TagRef {
            id: row.id,
            name: row.name,
            slug: row.slug,
        });
    }
    Ok(tags)
}

async fn fetch_product(
    conn: &mut PgConnection,
    column: &str,
    value: ProductLookup<'_>,
) -> Result<Option<Product>, RepositoryError> {
    let query = format!("{PRODUCT_SELECT} WHERE p.{column} = $1");
    let query = sqlx::query_as::<_, ProductRow>(&query);
    let row = match value {
        ProductLookup::Id(id) => query.bind(id),
        ProductLookup::Slug(slug) => query.bind(slug),
    }
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut tags = load_tags(conn, &[row.id]).await?;
    let own = tags.remove(&row.id).unwrap_or_default();
    Ok(Some(row.into_product(own)))
}

#[derive(Debug, Clone, Copy)]
enum ProductLookup<'a> {
    Id(ProductId),
    Slug(&'a str),
}

/// Replace the tag set of `product`.
async fn set_tags(conn: &mut PgConnection, product: ProductId, tags: &[TagId]) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM product_tags WHERE product_id = $1")
        .bind(product)
        .execute(&mut *conn)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = tags.iter().map(TagId::as_i32).collect();
    sqlx::query(
        "INSERT INTO product_tags (product_id, tag_id)
         SELECT $1, tag_id FROM UNNEST($2::int[]) AS tag_id",
    )
    .bind(product)
    .bind(ids)
    .execute(&mut *conn)
    .await
    .map_err(|e| PRODUCT_CONSTRAINTS.map(e))?;
    Ok(())
}

/// Repository for products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of products matching `filter`, plus the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, u64), RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM products p LEFT JOIN categories c ON c.id = p.category_id",
        );
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut page = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        push_filters(&mut page, filter);
        page.push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(i64::from(filter.page.limit))
            .push(" OFFSET ")
            .push_bind(filter.page.offset());
        let rows: Vec<ProductRow> = page.build_query_as().fetch_all(&mut *conn).await?;

        let ids: Vec<ProductId> = rows.iter().map(|r| r.id).collect();
        let mut tags = load_tags(&mut conn, &ids).await?;
        let products = rows
            .into_iter()
            .map(|row| {
                let own = tags.remove(&row.id).unwrap_or_default();
                row.into_product(own)
            })
            .collect();

        Ok((products, u64::try_from(total).unwrap_or(0)))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, "id", ProductLookup::Id(id)).await
    }

    /// Get a product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, "slug", ProductLookup::Slug(slug)).await
    }

    /// Insert a product and its tag links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or a
    /// referenced category or tag does not exist.
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO products (name, slug, description, price, image, category_id, in_stock)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.image)
        .bind(draft.category_id)
        .bind(draft.in_stock)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PRODUCT_CONSTRAINTS.map(e))?;

        set_tags(&mut tx, id, &draft.tag_ids).await?;
        let product = fetch_product(&mut tx, "id", ProductLookup::Id(id))
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(product)
    }

    /// Overwrite a product and replace its tag links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists, or
    /// `RepositoryError::Conflict` on slug or reference violations.
    #[instrument(skip(self, draft), fields(id = %id, slug = %draft.slug))]
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE products
             SET name = $2, slug = $3, description = $4, price = $5, image = $6,
                 category_id = $7, in_stock = $8, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(&draft.image)
        .bind(draft.category_id)
        .bind(draft.in_stock)
        .execute(&mut *tx)
        .await
        .map_err(|e| PRODUCT_CONSTRAINTS.map(e))?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        set_tags(&mut tx, id, &draft.tag_ids).await?;
        let product = fetch_product(&mut tx, "id", ProductLookup::Id(id))
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(product)
    }

    /// Delete a product. Tag links go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such product exists.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
