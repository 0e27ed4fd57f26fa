//! Supplier route handlers.
//!
//! Mirrors the customer handlers. Deleting a supplier is always allowed:
//! products keep a nullable reference and are detached by the schema.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use cloudcrm_core::{Email, SupplierId, SupplierStatus};

use crate::db::SupplierRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Supplier;
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

/// Create/update request body.
#[derive(Debug, Deserialize)]
pub struct SupplierPayload {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: Option<String>,
}

struct ValidatedSupplier {
    name: String,
    email: Email,
    status: SupplierStatus,
}

fn validate_payload(payload: &SupplierPayload) -> Result<ValidatedSupplier, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let email = Email::parse(&payload.email).map_err(|e| AppError::Validation(e.to_string()))?;
    let status = match payload.status.as_deref() {
        Some(raw) => raw.parse().map_err(AppError::Validation)?,
        None => SupplierStatus::default(),
    };
    Ok(ValidatedSupplier {
        name: name.to_string(),
        email,
        status,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// List suppliers, optionally filtered by search term and status.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(AppError::Validation)?;

    let suppliers = SupplierRepository::new(state.pool())
        .list(query.q.as_deref(), status)
        .await?;
    Ok(Json(suppliers))
}

/// Create a supplier.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Json(payload): Json<SupplierPayload>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let valid = validate_payload(&payload)?;

    let supplier = SupplierRepository::new(state.pool())
        .create(
            &valid.name,
            payload.contact_name.as_deref().unwrap_or_default(),
            &valid.email,
            payload.phone.as_deref().unwrap_or_default(),
            payload.city.as_deref().unwrap_or_default(),
            payload.country.as_deref().unwrap_or_default(),
            valid.status,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Fetch a single supplier.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = SupplierRepository::new(state.pool())
        .get(SupplierId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(supplier))
}

/// Replace a supplier record.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
    Json(payload): Json<SupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    let valid = validate_payload(&payload)?;

    let supplier = SupplierRepository::new(state.pool())
        .update(
            SupplierId::new(id),
            &valid.name,
            payload.contact_name.as_deref().unwrap_or_default(),
            &valid.email,
            payload.phone.as_deref().unwrap_or_default(),
            payload.city.as_deref().unwrap_or_default(),
            payload.country.as_deref().unwrap_or_default(),
            valid.status,
        )
        .await?;
    Ok(Json(supplier))
}

/// Delete a supplier.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    SupplierRepository::new(state.pool())
        .delete(SupplierId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
