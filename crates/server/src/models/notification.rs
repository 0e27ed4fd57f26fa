//! Notification domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudcrm_core::{NotificationId, NotificationKind, Severity};

/// An entry in the dashboard bell menu.
///
/// Produced by the system itself (low-stock crossings, restores), never by
/// clients directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification ID.
    pub id: NotificationId,
    /// Source category.
    pub kind: NotificationKind,
    /// Urgency.
    pub severity: Severity,
    /// One-line headline.
    pub title: String,
    /// Longer description.
    pub body: String,
    /// Whether an operator has read it.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}
