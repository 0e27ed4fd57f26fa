//! Dashboard operator domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{Email, UserId, UserRole, UserStatus};

/// A dashboard operator (domain type).
///
/// The password hash never leaves the `users` repository; this view is safe
/// to serialize to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique across users.
    pub email: Email,
    /// Permission level.
    pub role: UserRole,
    /// Account status; suspended users cannot authenticate.
    pub status: UserStatus,
    /// When the user last logged in, if ever.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
