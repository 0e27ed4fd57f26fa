//! Notification repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use cloudcrm_core::{NotificationId, NotificationKind, Severity};

use super::RepositoryError;
use crate::models::Notification;

/// Most notifications a single list call returns.
const LIST_LIMIT: i64 = 100;

/// Internal row type for notification queries.
#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    kind: NotificationKind,
    severity: Severity,
    title: String,
    body: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            kind: row.kind,
            severity: row.severity,
            title: row.title,
            body: row.body,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List notifications, newest first, capped at 100.
    ///
    /// `unread` of `Some(true)` returns only unread rows, `Some(false)`
    /// only read rows, `None` both.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, unread: Option<bool>) -> Result<Vec<Notification>, RepositoryError> {
        let filter = match unread {
            Some(true) => " WHERE read = 0",
            Some(false) => " WHERE read = 1",
            None => "",
        };
        let sql = format!(
            "SELECT id, kind, severity, title, body, read, created_at FROM notifications\
             {filter} ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(LIST_LIMIT)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count unread notifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE read = 0")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Mark one notification as read. Marking an already-read notification
    /// succeeds without effect.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), RepositoryError> {
        // SQLite counts matched rows, not changed rows, so a repeat call
        // still reports one row and stays idempotent.
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark every unread notification as read, returning how many changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Insert an unread notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        kind: NotificationKind,
        severity: Severity,
        title: &str,
        body: &str,
    ) -> Result<Notification, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO notifications (kind, severity, title, body, read, created_at) \
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(kind)
        .bind(severity)
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        let id = NotificationId::new(result.last_insert_rowid());
        let row = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, kind, severity, title, body, read, created_at \
             FROM notifications WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_pool;
    use super::*;

    #[tokio::test]
    async fn test_insert_list_and_counts() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(&pool);

        repo.insert(
            NotificationKind::Inventory,
            Severity::Warning,
            "Low stock: Wool Peacoat",
            "SKU-PC-01 is down to 4 units",
        )
        .await
        .unwrap();
        let second = repo
            .insert(
                NotificationKind::Order,
                Severity::Info,
                "New order ORD-1001",
                "Zoe Quinn placed an order",
            )
            .await
            .unwrap();

        assert_eq!(repo.unread_count().await.unwrap(), 2);

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
        // Newest first.
        assert_eq!(all[0].id, second.id);

        repo.mark_read(second.id).await.unwrap();
        assert_eq!(repo.unread_count().await.unwrap(), 1);

        let unread = repo.list(Some(true)).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Low stock: Wool Peacoat");

        let read = repo.list(Some(false)).await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, second.id);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(&pool);

        let n = repo
            .insert(
                NotificationKind::System,
                Severity::Info,
                "Backup restored",
                "Snapshot applied",
            )
            .await
            .unwrap();

        repo.mark_read(n.id).await.unwrap();
        repo.mark_read(n.id).await.unwrap();
        assert_eq!(repo.unread_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_notification() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(&pool);

        let err = repo.mark_read(NotificationId::new(404)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_mark_all_read_reports_changed_rows() {
        let pool = test_pool().await;
        let repo = NotificationRepository::new(&pool);

        for i in 0..3 {
            repo.insert(
                NotificationKind::Customer,
                Severity::Info,
                &format!("New customer {i}"),
                "",
            )
            .await
            .unwrap();
        }
        let first = repo.list(None).await.unwrap()[0].id;
        repo.mark_read(first).await.unwrap();

        assert_eq!(repo.mark_all_read().await.unwrap(), 2);
        assert_eq!(repo.mark_all_read().await.unwrap(), 0);
    }
}
