//! Supplier domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{Email, SupplierId, SupplierStatus};

/// A vendor the business buys inventory from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    /// Unique supplier ID.
    pub id: SupplierId,
    /// Company name.
    pub name: String,
    /// Contact person at the supplier.
    pub contact_name: String,
    /// Contact email, unique across suppliers.
    pub email: Email,
    /// Contact phone number (free-form).
    pub phone: String,
    /// City of the supplier's main office.
    pub city: String,
    /// Country of the supplier's main office.
    pub country: String,
    /// Relationship status.
    pub status: SupplierStatus,
    /// When the supplier was created.
    pub created_at: DateTime<Utc>,
    /// When the supplier was last updated.
    pub updated_at: DateTime<Utc>,
}
