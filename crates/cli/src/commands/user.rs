//! Operator account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin account
//! cloudcrm-cli user create -e admin@example.com -n "Avery Admin" -r admin -p <password>
//!
//! # Create a staff account
//! cloudcrm-cli user create -e sam@example.com -n "Sam Staff" -r staff -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `CLOUDCRM_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`)

use secrecy::SecretString;
use thiserror::Error;

use cloudcrm_core::UserRole;
use cloudcrm_server::db;
use cloudcrm_server::services::{AuthError, AuthService};

/// Errors that can occur during operator management.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, manager, staff")]
    InvalidRole(String),

    /// Account creation failed (duplicate email, weak password, bad email).
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new operator account.
///
/// The password goes through the same strength checks as the dashboard's
/// password change form, so a bootstrap account cannot be weaker than one
/// created through the API.
///
/// # Arguments
///
/// * `email` - Operator's email address
/// * `name` - Operator's display name
/// * `role` - Operator's role (`admin`, `manager`, or `staff`)
/// * `password` - Initial password
///
/// # Returns
///
/// The ID of the created operator.
///
/// # Errors
///
/// Returns `UserError` if the role is unknown, the database is unreachable,
/// or account creation is refused.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<i64, UserError> {
    dotenvy::dotenv().ok();

    // Parse and validate role
    let role: UserRole = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;

    let database_url = std::env::var("CLOUDCRM_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| UserError::MissingEnvVar("CLOUDCRM_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Creating operator: {} ({})", email, role);

    let user = AuthService::new(&pool)
        .create_user(name, email, role, password)
        .await?;

    tracing::info!(
        "Operator created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id.as_i64())
}
