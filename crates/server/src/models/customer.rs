//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{CustomerId, CustomerStatus, Email, Money};

/// A wholesale customer as the dashboard renders it.
///
/// `orders_count` and `total_spent_cents` are derived by aggregation over the
/// customer's non-cancelled orders; they are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Contact person's name.
    pub name: String,
    /// Company the contact buys for.
    pub company: String,
    /// Contact email, unique across customers.
    pub email: Email,
    /// Contact phone number (free-form).
    pub phone: String,
    /// Account lifecycle status.
    pub status: CustomerStatus,
    /// Number of non-cancelled orders.
    pub orders_count: i64,
    /// Sum of `total_cents` over non-cancelled orders.
    pub total_spent_cents: Money,
    /// When the customer was created.
    pub created_at: DateTime<Utc>,
    /// When the customer was last updated.
    pub updated_at: DateTime<Utc>,
}
