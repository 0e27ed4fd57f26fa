//! Product (inventory) repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use cloudcrm_core::{Money, ProductId, StockStatus, SupplierId};

use super::{RepositoryError, like_contains};
use crate::models::Product;

const BASE_SELECT: &str = "SELECT id, name, sku, category, price_cents, stock, \
     low_stock_threshold, supplier_id, created_at, updated_at FROM products";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    category: String,
    price_cents: i64,
    stock: i64,
    low_stock_threshold: i64,
    supplier_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            sku: row.sku,
            category: row.category,
            price_cents: Money::from_cents(row.price_cents),
            stock: row.stock,
            low_stock_threshold: row.low_stock_threshold,
            supplier_id: row.supplier_id.map(SupplierId::new),
            stock_status: StockStatus::for_level(row.stock, row.low_stock_threshold),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Outcome of a stock adjustment: the classification before the change and
/// the product after it. Callers compare the two to detect low-stock
/// crossings.
#[derive(Debug)]
pub struct StockAdjustment {
    /// Stock classification before the adjustment.
    pub previous: StockStatus,
    /// The product after the adjustment.
    pub product: Product,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List products, newest first, optionally filtered.
    ///
    /// `search` matches name, SKU, or category as a case-insensitive
    /// substring. `stock_status` filters on the derived classification,
    /// expressed in SQL over `stock` and `low_stock_threshold`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        stock_status: Option<StockStatus>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::<sqlx::Sqlite>::new(BASE_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = like_contains(term);
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(sku) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(category) LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
        if let Some(status) = stock_status {
            query.push(match status {
                StockStatus::OutOfStock => " AND stock <= 0",
                StockStatus::LowStock => " AND stock > 0 AND stock <= low_stock_threshold",
                StockStatus::InStock => " AND stock > low_stock_threshold",
            });
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{BASE_SELECT} WHERE id = ?");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        sku: &str,
        category: &str,
        price: Money,
        stock: i64,
        low_stock_threshold: i64,
        supplier_id: Option<SupplierId>,
    ) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO products \
             (name, sku, category, price_cents, stock, low_stock_threshold, supplier_id, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(sku)
        .bind(category)
        .bind(price)
        .bind(stock)
        .bind(low_stock_threshold)
        .bind(supplier_id)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a product with this SKU already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        let id = ProductId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update a product's descriptive fields.
    ///
    /// Stock is deliberately not updatable here: all stock movement goes
    /// through [`Self::adjust_stock`] so low-stock crossings have a single
    /// choke point.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Conflict` if the new SKU is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: ProductId,
        name: &str,
        sku: &str,
        category: &str,
        price: Money,
        low_stock_threshold: i64,
        supplier_id: Option<SupplierId>,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products \
             SET name = ?, sku = ?, category = ?, price_cents = ?, low_stock_threshold = ?, \
                 supplier_id = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name)
        .bind(sku)
        .bind(category)
        .bind(price)
        .bind(low_stock_threshold)
        .bind(supplier_id)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a product with this SKU already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a stock delta inside a transaction.
    ///
    /// Stock can never go negative; an adjustment that would take it below
    /// zero is rejected whole.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Conflict` if the result would be negative.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT stock, low_stock_threshold FROM products WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (stock, threshold) = row.ok_or(RepositoryError::NotFound)?;

        let new_stock = stock + delta;
        if new_stock < 0 {
            return Err(RepositoryError::Conflict(format!(
                "stock cannot go below zero (have {stock}, adjustment {delta})"
            )));
        }

        sqlx::query("UPDATE products SET stock = ?, updated_at = ? WHERE id = ?")
            .bind(new_stock)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let product = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
        Ok(StockAdjustment {
            previous: StockStatus::for_level(stock, threshold),
            product,
        })
    }
}
