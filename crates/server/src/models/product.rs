//! Product (inventory) domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{Money, ProductId, StockStatus, SupplierId};

/// An inventory item.
///
/// `stock_status` is classified from `stock` and `low_stock_threshold` when
/// the row is read; it is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit, unique across products.
    pub sku: String,
    /// Free-form category ("Outerwear", "Denim", ...).
    pub category: String,
    /// Wholesale unit price in cents.
    pub price_cents: Money,
    /// Units on hand, never negative.
    pub stock: i64,
    /// At or below this level the product counts as low stock.
    pub low_stock_threshold: i64,
    /// Supplier this product is bought from, if known.
    pub supplier_id: Option<SupplierId>,
    /// Derived stock classification.
    pub stock_status: StockStatus,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
