//! Settings route handlers.
//!
//! Settings travel as `[{key, value}]` arrays. Reads fold stored overrides
//! over the area defaults, so the client always receives every key the area
//! defines. Writes are admin only and validated against the area schema
//! before anything is stored.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
};

use cloudcrm_core::SecurityEventKind;

use crate::db::{NewSecurityEvent, SettingsRepository, audit};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAuth, client_ip};
use crate::settings::{SettingPair, SettingsArea, fold, validate};
use crate::state::AppState;

fn parse_area(raw: &str) -> Result<SettingsArea, AppError> {
    // An unknown area is an unknown URL, not a bad payload.
    raw.parse().map_err(|()| AppError::NotFound)
}

/// Return one area's settings, fully folded.
pub async fn show_area(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(raw_area): Path<String>,
) -> Result<Json<Vec<SettingPair>>, AppError> {
    let area = parse_area(&raw_area)?;

    let stored = SettingsRepository::new(state.pool()).get_area(area).await?;
    Ok(Json(fold(area, &stored)))
}

/// Store new values for one area and return the folded result.
pub async fn update_area(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Path(raw_area): Path<String>,
    Json(pairs): Json<Vec<SettingPair>>,
) -> Result<Json<Vec<SettingPair>>, AppError> {
    let area = parse_area(&raw_area)?;
    validate(area, &pairs).map_err(AppError::Validation)?;

    let mut entries = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let raw = serde_json::to_string(&pair.value)
            .map_err(|e| AppError::Internal(format!("failed to encode setting value: {e}")))?;
        entries.push((pair.key.clone(), raw));
    }

    let repo = SettingsRepository::new(state.pool());
    repo.upsert_area(area, &entries).await?;

    let ip = client_ip(&headers, peer).to_string();
    let detail = format!("{area} settings updated ({} keys)", entries.len());
    audit(
        state.pool(),
        NewSecurityEvent {
            kind: SecurityEventKind::SettingsChanged,
            user_email: Some(current.user.email.as_str()),
            ip: Some(&ip),
            detail: Some(&detail),
        },
    )
    .await;

    let stored = repo.get_area(area).await?;
    Ok(Json(fold(area, &stored)))
}
