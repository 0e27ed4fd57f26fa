//! Backup and restore handlers. Admin only.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

use cloudcrm_core::{NotificationKind, SecurityEventKind, Severity};

use crate::db::{NewSecurityEvent, NotificationRepository, audit};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, client_ip};
use crate::models::Backup;
use crate::services::{BackupService, RestoreSummary};
use crate::state::AppState;

/// Take a snapshot of the business tables.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Backup>), AppError> {
    let backup = BackupService::new(state.pool()).create().await?;

    let ip = client_ip(&headers, peer).to_string();
    let detail = format!("backup {} created ({} bytes)", backup.id, backup.size_bytes);
    audit(
        state.pool(),
        NewSecurityEvent {
            kind: SecurityEventKind::BackupCreated,
            user_email: Some(current.user.email.as_str()),
            ip: Some(&ip),
            detail: Some(&detail),
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(backup)))
}

/// List stored backups, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_current): RequireAdmin,
) -> Result<Json<Vec<Backup>>, AppError> {
    let backups = BackupService::new(state.pool()).list().await?;
    Ok(Json(backups))
}

/// Replace the business tables with a snapshot's contents.
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<RestoreSummary>, AppError> {
    let summary = BackupService::new(state.pool()).restore(id).await?;

    let ip = client_ip(&headers, peer).to_string();
    let detail = format!(
        "backup {id} restored ({} customers, {} suppliers, {} products, {} orders)",
        summary.customers, summary.suppliers, summary.products, summary.orders
    );
    audit(
        state.pool(),
        NewSecurityEvent {
            kind: SecurityEventKind::BackupRestored,
            user_email: Some(current.user.email.as_str()),
            ip: Some(&ip),
            detail: Some(&detail),
        },
    )
    .await;

    if let Err(e) = NotificationRepository::new(state.pool())
        .insert(
            NotificationKind::System,
            Severity::Info,
            "Backup restored",
            &format!("Data was restored from backup {id}"),
        )
        .await
    {
        tracing::warn!(error = %e, "failed to record restore notification");
    }

    Ok(Json(summary))
}
