//! Dashboard stat card handler.

use axum::{Json, extract::State};

use crate::db::DashboardStats;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Cache key for the single aggregated stats entry.
const STATS_KEY: &str = "dashboard_stats";

/// Return the aggregated dashboard stats.
///
/// Served from a short-lived cache so a dashboard full of polling widgets
/// does not re-run the aggregation on every request. Staleness is bounded
/// by the cache TTL.
pub async fn stats(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> Result<Json<DashboardStats>, AppError> {
    if let Some(stats) = state.stats_cache().get(STATS_KEY).await {
        return Ok(Json(stats));
    }

    let stats = DashboardStats::load(state.pool()).await?;
    state.stats_cache().insert(STATS_KEY, stats.clone()).await;
    Ok(Json(stats))
}
