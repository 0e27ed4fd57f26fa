//! HTTP route handlers for the dashboard API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database ping)
//!
//! # Auth
//! POST /api/auth/login              - Log in (rate limited per client IP)
//! POST /api/auth/logout             - Log out, revoke the session row
//! GET  /api/auth/me                 - Current operator
//! POST /api/auth/password           - Change own password
//!
//! # Customers
//! GET  /api/customers               - List (?q=, ?status=)
//! POST /api/customers               - Create
//! GET  /api/customers/{id}          - Fetch one
//! PUT  /api/customers/{id}          - Update
//! DELETE /api/customers/{id}        - Delete (409 while orders reference it)
//!
//! # Suppliers
//! GET  /api/suppliers               - List (?q=, ?status=)
//! POST /api/suppliers               - Create
//! GET  /api/suppliers/{id}          - Fetch one
//! PUT  /api/suppliers/{id}          - Update
//! DELETE /api/suppliers/{id}        - Delete
//!
//! # Orders
//! GET  /api/orders                  - List (?q=, ?status=)
//! POST /api/orders                  - Create (number is assigned server side)
//! GET  /api/orders/{id}             - Fetch one
//! PUT  /api/orders/{id}/status      - Advance status (409 once terminal)
//!
//! # Inventory
//! GET  /api/inventory               - List (?q=, ?status=)
//! POST /api/inventory               - Create
//! GET  /api/inventory/{id}          - Fetch one
//! PUT  /api/inventory/{id}          - Update (stock moves only via adjust)
//! POST /api/inventory/{id}/adjust   - Apply a stock delta
//!
//! # Notifications
//! GET  /api/notifications           - List (?unread=)
//! GET  /api/notifications/unread-count - Bell badge count
//! POST /api/notifications/{id}/read - Mark one read
//! POST /api/notifications/read-all  - Mark all read
//!
//! # Dashboard
//! GET  /api/dashboard/stats         - Aggregated stat cards (cached briefly)
//!
//! # CSV export
//! GET  /api/export/customers.csv    - Customers as a download
//! GET  /api/export/orders.csv       - Orders as a download
//! GET  /api/export/inventory.csv    - Inventory as a download
//!
//! # Security (admin)
//! GET  /api/security/events         - Audit log (?q=, ?kind=)
//! GET  /api/security/sessions       - Active sessions
//! DELETE /api/security/sessions/{id} - Revoke a session
//!
//! # Settings
//! GET  /api/settings/{area}         - Folded key/value pairs for one area
//! POST /api/settings/{area}         - Replace stored values (admin)
//!
//! # Users (admin)
//! GET  /api/users                   - List operators
//! POST /api/users                   - Create an operator
//! PUT  /api/users/{id}/status       - Activate or suspend
//!
//! # Backups (admin)
//! POST /api/backups                 - Take a snapshot
//! GET  /api/backups                 - List snapshots
//! POST /api/backups/{id}/restore    - Restore a snapshot
//! ```
//!
//! Everything under `/api` except `/api/auth/login` requires a cookie
//! session; routes marked admin additionally require the `admin` role.

pub mod auth;
pub mod backups;
pub mod customers;
pub mod dashboard;
pub mod export;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod security;
pub mod settings;
pub mod suppliers;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Liveness check. Returns 200 as long as the process is up.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check. Verifies the database connection is usable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login).layer(login_rate_limiter()))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password", post(auth::change_password))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::remove),
        )
}

/// Create the supplier routes router.
pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(suppliers::list).post(suppliers::create))
        .route(
            "/{id}",
            get(suppliers::show)
                .put(suppliers::update)
                .delete(suppliers::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::list).post(inventory::create))
        .route("/{id}", get(inventory::show).put(inventory::update))
        .route("/{id}/adjust", post(inventory::adjust))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/unread-count", get(notifications::unread_count))
        .route("/{id}/read", post(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard::stats))
}

/// Create the CSV export routes router.
pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/customers.csv", get(export::customers))
        .route("/orders.csv", get(export::orders))
        .route("/inventory.csv", get(export::inventory))
}

/// Create the security routes router.
pub fn security_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(security::events))
        .route("/sessions", get(security::sessions))
        .route("/sessions/{id}", delete(security::revoke_session))
}

/// Create the settings routes router.
pub fn settings_routes() -> Router<AppState> {
    Router::new().route(
        "/{area}",
        get(settings::show_area).post(settings::update_area),
    )
}

/// Create the user management routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/{id}/status", put(users::update_status))
}

/// Create the backup routes router.
pub fn backup_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(backups::create).get(backups::list))
        .route("/{id}/restore", post(backups::restore))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/customers", customer_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/orders", order_routes())
        .nest("/inventory", inventory_routes())
        .nest("/notifications", notification_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/export", export_routes())
        .nest("/security", security_routes())
        .nest("/settings", settings_routes())
        .nest("/users", user_routes())
        .nest("/backups", backup_routes())
}
