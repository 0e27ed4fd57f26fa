//! Backup service: JSON snapshots of the business tables.
//!
//! A backup captures customers, suppliers, products, and orders as raw rows
//! serialized to one JSON document, stored in the `backups` table next to a
//! descriptor. Restore replaces the live business tables with a snapshot,
//! keeping row IDs so orders still point at their customers. Operator
//! accounts, sessions, settings, notifications, and other backups are never
//! part of a snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::RepositoryError;
use crate::models::Backup;

/// Raw `customers` row as stored in a snapshot.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct CustomerRecord {
    id: i64,
    name: String,
    company: String,
    email: String,
    phone: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Raw `suppliers` row as stored in a snapshot.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct SupplierRecord {
    id: i64,
    name: String,
    contact_name: String,
    email: String,
    phone: String,
    city: String,
    country: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Raw `products` row as stored in a snapshot.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct ProductRecord {
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

/// Raw `orders` row as stored in a snapshot.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
struct OrderRecord {
    id: i64,
    order_number: String,
    customer_id: i64,
    status: String,
    total_cents: i64,
    items_count: i64,
    placed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// The complete backup payload.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    customers: Vec<CustomerRecord>,
    suppliers: Vec<SupplierRecord>,
    products: Vec<ProductRecord>,
    orders: Vec<OrderRecord>,
}

/// How many rows a restore brought back, per table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RestoreSummary {
    pub customers: usize,
    pub suppliers: usize,
    pub products: usize,
    pub orders: usize,
}

/// Internal row type for backup descriptor queries.
#[derive(Debug, sqlx::FromRow)]
struct BackupRow {
    id: String,
    created_at: DateTime<Utc>,
    size_bytes: i64,
    customers_count: i64,
    suppliers_count: i64,
    products_count: i64,
    orders_count: i64,
}

impl TryFrom<BackupRow> for Backup {
    type Error = RepositoryError;

    fn try_from(row: BackupRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid backup id in database: {e}"))
        })?;

        Ok(Self {
            id,
            created_at: row.created_at,
            size_bytes: row.size_bytes,
            customers_count: row.customers_count,
            suppliers_count: row.suppliers_count,
            products_count: row.products_count,
            orders_count: row.orders_count,
        })
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Backup service.
pub struct BackupService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BackupService<'a> {
    /// Create a new backup service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Take a snapshot of the business tables and store it.
    ///
    /// Reads and the descriptor insert share one transaction, so the
    /// snapshot is a consistent view even while other writes are queued.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self) -> Result<Backup, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let customers = sqlx::query_as::<_, CustomerRecord>(
            "SELECT id, name, company, email, phone, status, created_at, updated_at \
             FROM customers ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let suppliers = sqlx::query_as::<_, SupplierRecord>(
            "SELECT id, name, contact_name, email, phone, city, country, status, \
                    created_at, updated_at \
             FROM suppliers ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let products = sqlx::query_as::<_, ProductRecord>(
            "SELECT id, name, sku, category, price_cents, stock, low_stock_threshold, \
                    supplier_id, created_at, updated_at \
             FROM products ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let orders = sqlx::query_as::<_, OrderRecord>(
            "SELECT id, order_number, customer_id, status, total_cents, items_count, \
                    placed_at, created_at, updated_at \
             FROM orders ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;

        let snapshot = Snapshot {
            customers,
            suppliers,
            products,
            orders,
        };
        let data = serde_json::to_string(&snapshot).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to encode backup: {e}"))
        })?;

        let backup = Backup {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            size_bytes: count(data.len()),
            customers_count: count(snapshot.customers.len()),
            suppliers_count: count(snapshot.suppliers.len()),
            products_count: count(snapshot.products.len()),
            orders_count: count(snapshot.orders.len()),
        };

        sqlx::query(
            "INSERT INTO backups \
             (id, created_at, size_bytes, customers_count, suppliers_count, products_count, \
              orders_count, data) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(backup.id.to_string())
        .bind(backup.created_at)
        .bind(backup.size_bytes)
        .bind(backup.customers_count)
        .bind(backup.suppliers_count)
        .bind(backup.products_count)
        .bind(backup.orders_count)
        .bind(&data)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(backup)
    }

    /// List backup descriptors, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored ID is not a UUID.
    pub async fn list(&self) -> Result<Vec<Backup>, RepositoryError> {
        let rows = sqlx::query_as::<_, BackupRow>(
            "SELECT id, created_at, size_bytes, customers_count, suppliers_count, \
                    products_count, orders_count \
             FROM backups ORDER BY created_at DESC, id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Replace the business tables with a stored snapshot.
    ///
    /// All deletes and inserts run in one transaction; a failed restore
    /// leaves the live data untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the backup does not exist.
    /// Returns `RepositoryError::DataCorruption` if the payload does not
    /// parse. Returns `RepositoryError::Database` for other database errors.
    pub async fn restore(&self, id: Uuid) -> Result<RestoreSummary, RepositoryError> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM backups WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await?;
        let data = data.ok_or(RepositoryError::NotFound)?;

        let snapshot: Snapshot = serde_json::from_str(&data).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to decode backup: {e}"))
        })?;

        let mut tx = self.pool.begin().await?;

        // Children before parents: orders reference customers, products
        // reference suppliers.
        sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM customers").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM suppliers").execute(&mut *tx).await?;

        for supplier in &snapshot.suppliers {
            insert_supplier(&mut tx, supplier).await?;
        }
        for customer in &snapshot.customers {
            insert_customer(&mut tx, customer).await?;
        }
        for product in &snapshot.products {
            insert_product(&mut tx, product).await?;
        }
        for order in &snapshot.orders {
            insert_order(&mut tx, order).await?;
        }

        tx.commit().await?;

        Ok(RestoreSummary {
            customers: snapshot.customers.len(),
            suppliers: snapshot.suppliers.len(),
            products: snapshot.products.len(),
            orders: snapshot.orders.len(),
        })
    }
}

async fn insert_supplier(
    tx: &mut Transaction<'_, Sqlite>,
    record: &SupplierRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO suppliers \
         (id, name, contact_name, email, phone, city, country, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.contact_name)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.city)
    .bind(&record.country)
    .bind(&record.status)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_customer(
    tx: &mut Transaction<'_, Sqlite>,
    record: &CustomerRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO customers \
         (id, name, company, email, phone, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.company)
    .bind(&record.email)
    .bind(&record.phone)
    .bind(&record.status)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_product(
    tx: &mut Transaction<'_, Sqlite>,
    record: &ProductRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products \
         (id, name, sku, category, price_cents, stock, low_stock_threshold, supplier_id, \
          created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.sku)
    .bind(&record.category)
    .bind(record.price_cents)
    .bind(record.stock)
    .bind(record.low_stock_threshold)
    .bind(record.supplier_id)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_order(
    tx: &mut Transaction<'_, Sqlite>,
    record: &OrderRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders \
         (id, order_number, customer_id, status, total_cents, items_count, placed_at, \
          created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(record.id)
    .bind(&record.order_number)
    .bind(record.customer_id)
    .bind(&record.status)
    .bind(record.total_cents)
    .bind(record.items_count)
    .bind(record.placed_at)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
