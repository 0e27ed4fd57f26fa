//! Dashboard statistics assembled from aggregate queries.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use cloudcrm_core::Money;

use super::RepositoryError;

/// Aggregate counters shown on the dashboard landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub customers_total: i64,
    pub customers_active: i64,
    pub orders_total: i64,
    pub orders_pending: i64,
    /// Revenue across all non-cancelled orders.
    pub revenue_cents: Money,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub unread_notifications: i64,
}

impl DashboardStats {
    /// Compute all counters, running the per-table aggregates concurrently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn load(pool: &SqlitePool) -> Result<Self, RepositoryError> {
        let customers = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'active') FROM customers",
        )
        .fetch_one(pool);
        let orders = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'pending'), \
                    COALESCE(SUM(total_cents) FILTER (WHERE status != 'cancelled'), 0) \
             FROM orders",
        )
        .fetch_one(pool);
        let products = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE stock > 0 AND stock <= low_stock_threshold), \
                    COUNT(*) FILTER (WHERE stock <= 0) \
             FROM products",
        )
        .fetch_one(pool);
        let unread =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE read = 0")
                .fetch_one(pool);

        let (customers, orders, products, unread) =
            tokio::join!(customers, orders, products, unread);
        let (customers_total, customers_active) = customers?;
        let (orders_total, orders_pending, revenue_cents) = orders?;
        let (low_stock_count, out_of_stock_count) = products?;

        Ok(Self {
            customers_total,
            customers_active,
            orders_total,
            orders_pending,
            revenue_cents: Money::from_cents(revenue_cents),
            low_stock_count,
            out_of_stock_count,
            unread_notifications: unread?,
        })
    }
}
