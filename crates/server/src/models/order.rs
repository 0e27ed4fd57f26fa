//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{CustomerId, Money, OrderId, OrderStatus};

/// A wholesale order as the dashboard renders it.
///
/// The customer name is always joined in; order pages never show a bare ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Human-facing number, "ORD-1042" style, unique.
    pub order_number: String,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Joined customer name for display.
    pub customer_name: String,
    /// Fulfillment status; `delivered` and `cancelled` are terminal.
    pub status: OrderStatus,
    /// Order total in cents.
    pub total_cents: Money,
    /// Number of line items.
    pub items_count: i64,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// When the order record was created.
    pub created_at: DateTime<Utc>,
    /// When the order record was last updated.
    pub updated_at: DateTime<Utc>,
}
