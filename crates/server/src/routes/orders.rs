//! Order route handlers.
//!
//! Order numbers are assigned server side; clients only pick the customer,
//! the total and the item count. Status moves through its own endpoint so
//! the terminal-status rule has one enforcement point.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use cloudcrm_core::{CustomerId, Money, OrderId};

use crate::db::{CustomerRepository, OrderRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// List query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub customer_id: i64,
    pub total_cents: i64,
    pub items_count: i64,
    /// Defaults to now when omitted.
    pub placed_at: Option<DateTime<Utc>>,
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// List orders, optionally filtered by search term and status.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let orders = OrderRepository::new(state.pool())
        .list(query.q.as_deref(), status)
        .await?;
    Ok(Json(orders))
}

/// Create an order in `pending` for an existing customer.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Json(payload): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    if payload.items_count < 1 {
        return Err(AppError::Validation(
            "items_count must be at least 1".to_string(),
        ));
    }
    if payload.total_cents < 0 {
        return Err(AppError::Validation(
            "total_cents cannot be negative".to_string(),
        ));
    }

    let customer_id = CustomerId::new(payload.customer_id);
    if CustomerRepository::new(state.pool())
        .get(customer_id)
        .await?
        .is_none()
    {
        return Err(AppError::Validation("unknown customer".to_string()));
    }

    let order = OrderRepository::new(state.pool())
        .create(
            customer_id,
            Money::from_cents(payload.total_cents),
            payload.items_count,
            payload.placed_at.unwrap_or_else(Utc::now),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch a single order.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(order))
}

/// Move an order to a new status. Terminal orders refuse with 409.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange>,
) -> Result<Json<Order>, AppError> {
    let status = payload.status.parse().map_err(AppError::Validation)?;

    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await?;
    Ok(Json(order))
}
