//! Session-related types for operator authentication.

use uuid::Uuid;

use super::user::User;

/// The authenticated operator attached to a request.
///
/// Built by the auth extractors from the cookie session plus a fresh read of
/// the `users` and `sessions` tables, so suspension and revocation take
/// effect on the next request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The operator, freshly loaded.
    pub user: User,
    /// UUID of the session row backing this login.
    pub session_id: Uuid,
}

/// Session keys for operator authentication data.
pub mod keys {
    /// Key for the logged-in operator's user ID.
    pub const USER_ID: &str = "user_id";

    /// Key for the UUID of the `sessions` row created at login.
    pub const SESSION_ID: &str = "session_record_id";
}
