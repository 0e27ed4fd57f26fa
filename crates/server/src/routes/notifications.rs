//! Notification route handlers for the dashboard bell menu.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use cloudcrm_core::NotificationId;

use crate::db::NotificationRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Notification;
use crate::state::AppState;

/// List query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub unread: Option<String>,
}

/// List notifications, newest first. `?unread=true` narrows to unread,
/// `?unread=false` to read.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let unread = match query.unread.as_deref() {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "invalid unread filter: {other}"
            )));
        }
    };

    let notifications = NotificationRepository::new(state.pool()).list(unread).await?;
    Ok(Json(notifications))
}

/// Count unread notifications for the bell badge.
pub async fn unread_count(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Json<Value>, AppError> {
    let count = NotificationRepository::new(state.pool()).unread_count().await?;
    Ok(Json(json!({ "count": count })))
}

/// Mark one notification read. Marking twice is a no-op, not an error.
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    NotificationRepository::new(state.pool())
        .mark_read(NotificationId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every unread notification read and report how many changed.
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Json<Value>, AppError> {
    let updated = NotificationRepository::new(state.pool()).mark_all_read().await?;
    Ok(Json(json!({ "updated": updated })))
}
