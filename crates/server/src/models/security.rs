//! Security page domain types: audit log entries and session views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudcrm_core::{SecurityEventId, SecurityEventKind, UserId};

/// An entry in the append-only security audit log.
///
/// `user_email` is recorded as entered, not parsed: failed logins legitimately
/// carry addresses that are not valid emails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique event ID.
    pub id: SecurityEventId,
    /// What happened.
    pub kind: SecurityEventKind,
    /// Email involved, if any.
    pub user_email: Option<String>,
    /// Client IP the request came from, if known.
    pub ip: Option<String>,
    /// Free-form context ("wrong password", "store settings updated").
    pub detail: Option<String>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

/// A login session as shown on the security page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Session record UUID.
    pub id: Uuid,
    /// Operator the session belongs to.
    pub user_id: UserId,
    /// Joined operator name.
    pub user_name: String,
    /// Joined operator email.
    pub user_email: String,
    /// Client IP at login, if known.
    pub ip: Option<String>,
    /// Browser user agent at login, if sent.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last authenticated request through this session.
    pub last_seen_at: DateTime<Utc>,
    /// Whether this is the caller's own session.
    pub current: bool,
}
