//! Order repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use cloudcrm_core::{CustomerId, Money, OrderId, OrderStatus};

use super::{RepositoryError, like_contains};
use crate::models::Order;

const BASE_SELECT: &str = "SELECT o.id, o.order_number, o.customer_id, c.name AS customer_name, \
     o.status, o.total_cents, o.items_count, o.placed_at, o.created_at, o.updated_at \
     FROM orders o JOIN customers c ON c.id = o.customer_id";

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    customer_id: i64,
    customer_name: String,
    status: OrderStatus,
    total_cents: i64,
    items_count: i64,
    placed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            customer_id: CustomerId::new(row.customer_id),
            customer_name: row.customer_name,
            status: row.status,
            total_cents: Money::from_cents(row.total_cents),
            items_count: row.items_count,
            placed_at: row.placed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered.
    ///
    /// `search` matches the order number or the customer name as a
    /// case-insensitive substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut query = QueryBuilder::<sqlx::Sqlite>::new(BASE_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = like_contains(term);
            query.push(" AND (LOWER(o.order_number) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(c.name) LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
        if let Some(status) = status {
            query.push(" AND o.status = ");
            query.push_bind(status);
        }
        query.push(" ORDER BY o.created_at DESC, o.id DESC");

        let rows: Vec<OrderRow> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{BASE_SELECT} WHERE o.id = ?");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create an order in `pending` status.
    ///
    /// The order number is assigned inside the INSERT as `ORD-` followed by
    /// one more than the highest existing number, starting at `ORD-1001`.
    /// SQLite's single-writer model makes the subquery-and-insert atomic.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, including
    /// when `customer_id` does not exist (foreign key violation). Callers
    /// validate the customer first to give a friendlier error.
    pub async fn create(
        &self,
        customer_id: CustomerId,
        total: Money,
        items_count: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO orders \
             (order_number, customer_id, status, total_cents, items_count, placed_at, \
              created_at, updated_at) \
             VALUES ( \
                 'ORD-' || (SELECT COALESCE(MAX(CAST(substr(order_number, 5) AS INTEGER)), 1000) + 1 \
                            FROM orders), \
                 ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(OrderStatus::Pending)
        .bind(total)
        .bind(items_count)
        .bind(placed_at)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = OrderId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Move an order to a new status.
    ///
    /// Delivered and cancelled orders are terminal and cannot change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Conflict` if the order is terminal.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or(RepositoryError::NotFound)?;

        if current.is_terminal() {
            return Err(RepositoryError::Conflict(format!(
                "order is {current} and cannot change status"
            )));
        }

        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}
