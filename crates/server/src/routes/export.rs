//! CSV export handlers.
//!
//! Each export pulls the full unfiltered list and streams it back as an
//! attachment with a timestamped filename.

use axum::{
    extract::State,
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::db::{CustomerRepository, OrderRepository, ProductRepository};
use crate::error::AppError;
use crate::export::{attachment_filename, customers_csv, inventory_csv, orders_csv};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn csv_response(prefix: &str, body: String) -> Result<Response, AppError> {
    let filename = attachment_filename(prefix, Utc::now());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(format!("invalid content disposition: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE)),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Export all customers.
pub async fn customers(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Response, AppError> {
    let customers = CustomerRepository::new(state.pool()).list(None, None).await?;
    csv_response("customers", customers_csv(&customers))
}

/// Export all orders.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Response, AppError> {
    let orders = OrderRepository::new(state.pool()).list(None, None).await?;
    csv_response("orders", orders_csv(&orders))
}

/// Export all inventory.
pub async fn inventory(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Response, AppError> {
    let products = ProductRepository::new(state.pool()).list(None, None).await?;
    csv_response("inventory", inventory_csv(&products))
}
