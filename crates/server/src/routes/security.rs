//! Security page handlers: audit log and active sessions. Admin only.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use uuid::Uuid;

use cloudcrm_core::SecurityEventKind;

use crate::db::{NewSecurityEvent, SecurityEventRepository, SessionRepository, audit};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, client_ip};
use crate::models::{SecurityEvent, SessionView};
use crate::state::AppState;

/// Audit log query parameters.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub q: Option<String>,
    pub kind: Option<String>,
}

/// List recent security events, optionally filtered by search term and kind.
pub async fn events(
    State(state): State<AppState>,
    RequireAdmin(_current): RequireAdmin,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<SecurityEvent>>, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<SecurityEventKind>)
        .transpose()
        .map_err(AppError::Validation)?;

    let events = SecurityEventRepository::new(state.pool())
        .list(query.q.as_deref(), kind)
        .await?;
    Ok(Json(events))
}

/// List live sessions across all operators, the caller's marked `current`.
pub async fn sessions(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
) -> Result<Json<Vec<SessionView>>, AppError> {
    let sessions = SessionRepository::new(state.pool())
        .list_active(current.session_id)
        .await?;
    Ok(Json(sessions))
}

/// Revoke a session. The targeted login fails its next request.
///
/// Revoking your own session is allowed and behaves as a logout from the
/// security page.
pub async fn revoke_session(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SessionRepository::new(state.pool()).revoke(id).await?;

    let ip = client_ip(&headers, peer).to_string();
    let detail = format!("session {id} revoked");
    audit(
        state.pool(),
        NewSecurityEvent {
            kind: SecurityEventKind::SessionRevoked,
            user_email: Some(current.user.email.as_str()),
            ip: Some(&ip),
            detail: Some(&detail),
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
