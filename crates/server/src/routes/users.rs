//! Operator management handlers. Admin only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use cloudcrm_core::{UserId, UserRole, UserStatus};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Create request body.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

/// Status change request body.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// List all operators.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_current): RequireAdmin,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// Create an operator account.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_current): RequireAdmin,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let role: UserRole = payload.role.parse().map_err(AppError::Validation)?;

    let user = AuthService::new(state.pool())
        .create_user(name, &payload.email, role, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Activate or suspend an operator. Suspending yourself is refused.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<StatusChange>,
) -> Result<Json<User>, AppError> {
    let status: UserStatus = payload.status.parse().map_err(AppError::Validation)?;

    let id = UserId::new(id);
    if id == current.user.id && status == UserStatus::Suspended {
        return Err(AppError::Conflict(
            "cannot suspend your own account".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update_status(id, status)
        .await?;
    Ok(Json(user))
}
