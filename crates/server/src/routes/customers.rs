//! Customer route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use cloudcrm_core::{CustomerId, CustomerStatus, Email};

use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Customer;
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

/// Create/update request body. `PUT` replaces the whole record, so the same
/// shape serves both.
#[derive(Debug, Deserialize)]
pub struct CustomerPayload {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// Validated fields shared by create and update.
struct ValidatedCustomer {
    name: String,
    email: Email,
    status: CustomerStatus,
}

fn validate_payload(payload: &CustomerPayload) -> Result<ValidatedCustomer, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let email = Email::parse(&payload.email).map_err(|e| AppError::Validation(e.to_string()))?;
    let status = match payload.status.as_deref() {
        Some(raw) => raw.parse().map_err(AppError::Validation)?,
        None => CustomerStatus::default(),
    };
    Ok(ValidatedCustomer {
        name: name.to_string(),
        email,
        status,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// List customers, optionally filtered by search term and status.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Customer>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let customers = CustomerRepository::new(state.pool())
        .list(query.q.as_deref(), status)
        .await?;
    Ok(Json(customers))
}

/// Create a customer.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Json(payload): Json<CustomerPayload>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let valid = validate_payload(&payload)?;

    let customer = CustomerRepository::new(state.pool())
        .create(
            &valid.name,
            payload.company.as_deref().unwrap_or_default(),
            &valid.email,
            payload.phone.as_deref().unwrap_or_default(),
            valid.status,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Fetch a single customer.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    let customer = CustomerRepository::new(state.pool())
        .get(CustomerId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(customer))
}

/// Replace a customer record.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Json<Customer>, AppError> {
    let valid = validate_payload(&payload)?;

    let customer = CustomerRepository::new(state.pool())
        .update(
            CustomerId::new(id),
            &valid.name,
            payload.company.as_deref().unwrap_or_default(),
            &valid.email,
            payload.phone.as_deref().unwrap_or_default(),
            valid.status,
        )
        .await?;
    Ok(Json(customer))
}

/// Delete a customer. Refused with 409 while orders still reference it.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    CustomerRepository::new(state.pool())
        .delete(CustomerId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
