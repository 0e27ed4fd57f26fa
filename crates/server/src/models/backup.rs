//! Backup descriptor types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Descriptor of a stored backup, without the snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    /// Backup UUID.
    pub id: Uuid,
    /// When the snapshot was taken.
    pub created_at: DateTime<Utc>,
    /// Size of the serialized snapshot in bytes.
    pub size_bytes: i64,
    /// Customers captured in the snapshot.
    pub customers_count: i64,
    /// Suppliers captured in the snapshot.
    pub suppliers_count: i64,
    /// Products captured in the snapshot.
    pub products_count: i64,
    /// Orders captured in the snapshot.
    pub orders_count: i64,
}
