//! Authentication route handlers.
//!
//! Login issues a cookie session backed by a `sessions` row; logout revokes
//! that row, so a stolen cookie dies with it.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use cloudcrm_core::SecurityEventKind;

use crate::db::{NewSecurityEvent, SessionRepository, audit};
use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{RequireAuth, client_ip, establish_session};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// User agents longer than this are truncated before storage.
const MAX_USER_AGENT_LEN: usize = 256;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change request body.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Log an operator in and establish a cookie session.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let ip = client_ip(&headers, peer).to_string();
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect::<String>());

    let user = AuthService::new(state.pool())
        .login(&payload.email, &payload.password, Some(&ip))
        .await?;

    let session_id = Uuid::new_v4();
    SessionRepository::new(state.pool())
        .insert(session_id, user.id, Some(&ip), user_agent.as_deref())
        .await?;
    establish_session(&session, user.id, session_id)
        .await
        .map_err(|e| AppError::Internal(format!("failed to persist session: {e}")))?;

    Ok(Json(user))
}

/// Log the caller out: revoke the session row and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    session: Session,
) -> Result<StatusCode, AppError> {
    let ip = client_ip(&headers, peer).to_string();

    // A concurrent admin revocation can get here first; logout stays
    // idempotent either way.
    match SessionRepository::new(state.pool())
        .revoke(current.session_id)
        .await
    {
        Ok(()) | Err(crate::db::RepositoryError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    audit(
        state.pool(),
        NewSecurityEvent {
            kind: SecurityEventKind::Logout,
            user_email: Some(current.user.email.as_str()),
            ip: Some(&ip),
            detail: None,
        },
    )
    .await;

    clear_sentry_user();
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Return the authenticated operator.
pub async fn me(RequireAuth(current): RequireAuth) -> Json<User> {
    Json(current.user)
}

/// Change the caller's password after re-verifying the current one.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<StatusCode, AppError> {
    let ip = client_ip(&headers, peer).to_string();

    AuthService::new(state.pool())
        .change_password(
            &current.user,
            &payload.current_password,
            &payload.new_password,
            Some(&ip),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
