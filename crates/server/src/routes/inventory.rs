//! Inventory route handlers.
//!
//! Stock never moves through `PUT`; every movement goes through the adjust
//! endpoint, which is also where low-stock notifications are raised. A
//! notification fires only when an adjustment crosses out of `in_stock`, so
//! repeated decrements inside the low band stay quiet.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use cloudcrm_core::{Money, NotificationKind, ProductId, Severity, StockStatus, SupplierId};

use crate::db::{NotificationRepository, ProductRepository, StockAdjustment, SupplierRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::state::AppState;

/// Threshold applied when a create request does not send one.
const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

// =============================================================================
// Request Types
// =============================================================================

/// List query parameters. `status` takes the derived stock classification.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub low_stock_threshold: Option<i64>,
    pub supplier_id: Option<i64>,
}

/// Update request body. Carries no `stock` field on purpose.
#[derive(Debug, Deserialize)]
pub struct UpdateProduct {
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub price_cents: i64,
    pub low_stock_threshold: Option<i64>,
    pub supplier_id: Option<i64>,
}

/// Stock adjustment request body.
#[derive(Debug, Deserialize)]
pub struct AdjustStock {
    pub delta: i64,
}

fn validate_fields(
    name: &str,
    sku: &str,
    price_cents: i64,
    low_stock_threshold: i64,
) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if sku.trim().is_empty() {
        return Err(AppError::Validation("sku is required".to_string()));
    }
    if price_cents < 0 {
        return Err(AppError::Validation(
            "price_cents cannot be negative".to_string(),
        ));
    }
    if low_stock_threshold < 0 {
        return Err(AppError::Validation(
            "low_stock_threshold cannot be negative".to_string(),
        ));
    }
    Ok(())
}

async fn validate_supplier(
    state: &AppState,
    supplier_id: Option<i64>,
) -> Result<Option<SupplierId>, AppError> {
    let Some(raw) = supplier_id else {
        return Ok(None);
    };
    let id = SupplierId::new(raw);
    if SupplierRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::Validation("unknown supplier".to_string()));
    }
    Ok(Some(id))
}

// =============================================================================
// Handlers
// =============================================================================

/// List products, optionally filtered by search term and stock status.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let products = ProductRepository::new(state.pool())
        .list(query.q.as_deref(), status)
        .await?;
    Ok(Json(products))
}

/// Create a product.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let threshold = payload
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    validate_fields(&payload.name, &payload.sku, payload.price_cents, threshold)?;
    if payload.stock < 0 {
        return Err(AppError::Validation(
            "stock cannot be negative".to_string(),
        ));
    }
    let supplier_id = validate_supplier(&state, payload.supplier_id).await?;

    let product = ProductRepository::new(state.pool())
        .create(
            payload.name.trim(),
            payload.sku.trim(),
            payload.category.as_deref().unwrap_or_default(),
            Money::from_cents(payload.price_cents),
            payload.stock,
            threshold,
            supplier_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Fetch a single product.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(product))
}

/// Replace a product's descriptive fields. Stock is untouched.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>, AppError> {
    let threshold = payload
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    validate_fields(&payload.name, &payload.sku, payload.price_cents, threshold)?;
    let supplier_id = validate_supplier(&state, payload.supplier_id).await?;

    let product = ProductRepository::new(state.pool())
        .update(
            ProductId::new(id),
            payload.name.trim(),
            payload.sku.trim(),
            payload.category.as_deref().unwrap_or_default(),
            Money::from_cents(payload.price_cents),
            threshold,
            supplier_id,
        )
        .await?;
    Ok(Json(product))
}

/// Apply a stock delta. Adjustments that would go negative refuse with 409.
pub async fn adjust(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
    Json(payload): Json<AdjustStock>,
) -> Result<Json<Product>, AppError> {
    let adjustment = ProductRepository::new(state.pool())
        .adjust_stock(ProductId::new(id), payload.delta)
        .await?;

    notify_if_crossed(&state, &adjustment).await;

    Ok(Json(adjustment.product))
}

/// Raise a bell notification when an adjustment leaves `in_stock`.
///
/// Best effort: a failed insert is logged and the adjustment still succeeds.
async fn notify_if_crossed(state: &AppState, adjustment: &StockAdjustment) {
    if adjustment.previous != StockStatus::InStock {
        return;
    }
    let (severity, headline) = match adjustment.product.stock_status {
        StockStatus::LowStock => (Severity::Warning, "Low stock"),
        StockStatus::OutOfStock => (Severity::Critical, "Out of stock"),
        StockStatus::InStock => return,
    };

    let title = format!("{headline}: {}", adjustment.product.name);
    let body = format!(
        "{} has {} units left",
        adjustment.product.sku, adjustment.product.stock
    );
    if let Err(e) = NotificationRepository::new(state.pool())
        .insert(NotificationKind::Inventory, severity, &title, &body)
        .await
    {
        tracing::warn!(
            error = %e,
            sku = %adjustment.product.sku,
            "failed to record stock notification"
        );
    }
}
