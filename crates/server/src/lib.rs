//! CloudCRM server library.
//!
//! This crate provides the dashboard API as a library, allowing it to be
//! tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod settings;
pub mod state;

use axum::{Router, routing::get};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::ServerConfig;
pub use state::AppState;

/// Assemble the application router: health endpoints, the `/api` tree, and
/// the session, security header and tracing layers.
///
/// The Sentry layers are applied in `main` so integration tests run the
/// identical stack without a Sentry client.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session store migration fails.
pub async fn build_router(config: ServerConfig, pool: SqlitePool) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(&pool, &config).await?;
    let state = AppState::new(config, pool);

    Ok(Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .nest("/api", routes::api_routes())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state))
}
