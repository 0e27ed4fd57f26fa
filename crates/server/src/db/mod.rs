//! Database operations for the CRM `SQLite` store.
//!
//! ## Tables
//!
//! - `customers`, `suppliers`, `products`, `orders` - Business data
//! - `users` - Dashboard operators
//! - `sessions` - One row per login, revocable from the security page
//! - `security_events` - Append-only audit log
//! - `notifications` - Dashboard bell menu entries
//! - `settings` - Overridden settings keys (folded over defaults on read)
//! - `backups` - JSON snapshots of the business tables
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p cloudcrm-cli -- migrate
//! ```

pub mod customers;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod security_events;
pub mod sessions;
pub mod settings;
pub mod stats;
pub mod suppliers;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use customers::CustomerRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use products::{ProductRepository, StockAdjustment};
pub use security_events::{NewSecurityEvent, SecurityEventRepository, audit};
pub use sessions::SessionRepository;
pub use settings::SettingsRepository;
pub use stats::DashboardStats;
pub use suppliers::SupplierRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Creates the database file if missing and keeps foreign key enforcement on.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the connection cannot be
/// established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Build a case-insensitive `LIKE` containment pattern from user input.
///
/// `%`, `_`, and `\` are escaped so search terms match literally; queries
/// using the result must declare `ESCAPE '\'`.
pub(crate) fn like_contains(term: &str) -> String {
    let lowered = term.to_lowercase();
    let mut pattern = String::with_capacity(lowered.len() + 2);
    pattern.push('%');
    for c in lowered.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// In-memory pool for repository tests, with migrations applied.
///
/// A single connection with disabled reclamation, so the shared in-memory
/// database lives for the whole test.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations apply cleanly");
    pool
}
