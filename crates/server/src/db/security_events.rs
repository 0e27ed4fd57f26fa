//! Security event repository for database operations.
//!
//! Events are append-only. Recording is best-effort through [`audit`]: a
//! failed write is logged and swallowed so the action that triggered it
//! still succeeds.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use cloudcrm_core::{SecurityEventId, SecurityEventKind};

use super::{RepositoryError, like_contains};
use crate::models::SecurityEvent;

/// Most events a single list call returns.
const LIST_LIMIT: i64 = 200;

/// A security event about to be recorded.
#[derive(Debug, Clone, Copy)]
pub struct NewSecurityEvent<'a> {
    pub kind: SecurityEventKind,
    /// Email as the client supplied it, not validated.
    pub user_email: Option<&'a str>,
    pub ip: Option<&'a str>,
    pub detail: Option<&'a str>,
}

/// Internal row type for security event queries.
#[derive(Debug, sqlx::FromRow)]
struct SecurityEventRow {
    id: i64,
    kind: SecurityEventKind,
    user_email: Option<String>,
    ip: Option<String>,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SecurityEventRow> for SecurityEvent {
    fn from(row: SecurityEventRow) -> Self {
        Self {
            id: SecurityEventId::new(row.id),
            kind: row.kind,
            user_email: row.user_email,
            ip: row.ip,
            detail: row.detail,
            created_at: row.created_at,
        }
    }
}

/// Repository for security event database operations.
pub struct SecurityEventRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SecurityEventRepository<'a> {
    /// Create a new security event repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(&self, event: &NewSecurityEvent<'_>) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO security_events (kind, user_email, ip, detail, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.kind)
        .bind(event.user_email)
        .bind(event.ip)
        .bind(event.detail)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List events, newest first, capped at 200.
    ///
    /// `search` matches the recorded email or detail text as a
    /// case-insensitive substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        kind: Option<SecurityEventKind>,
    ) -> Result<Vec<SecurityEvent>, RepositoryError> {
        let mut query = QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, kind, user_email, ip, detail, created_at FROM security_events WHERE 1 = 1",
        );

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = like_contains(term);
            query.push(" AND (LOWER(COALESCE(user_email, '')) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(COALESCE(detail, '')) LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
        if let Some(kind) = kind {
            query.push(" AND kind = ");
            query.push_bind(kind);
        }
        query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        query.push_bind(LIST_LIMIT);

        let rows: Vec<SecurityEventRow> = query.build_query_as().fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Record a security event, logging instead of failing on error.
pub async fn audit(pool: &SqlitePool, event: NewSecurityEvent<'_>) {
    if let Err(e) = SecurityEventRepository::new(pool).record(&event).await {
        tracing::warn!(error = %e, kind = %event.kind, "failed to record security event");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_pool;
    use super::*;

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let pool = test_pool().await;
        let repo = SecurityEventRepository::new(&pool);

        repo.record(&NewSecurityEvent {
            kind: SecurityEventKind::LoginFailure,
            user_email: Some("intruder@example.com"),
            ip: Some("203.0.113.9"),
            detail: Some("wrong password"),
        })
        .await
        .unwrap();
        repo.record(&NewSecurityEvent {
            kind: SecurityEventKind::LoginSuccess,
            user_email: Some("avery@cloudcrm.example"),
            ip: Some("203.0.113.10"),
            detail: None,
        })
        .await
        .unwrap();

        let all = repo.list(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, SecurityEventKind::LoginSuccess);
        assert_eq!(all[1].kind, SecurityEventKind::LoginFailure);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let pool = test_pool().await;
        let repo = SecurityEventRepository::new(&pool);

        repo.record(&NewSecurityEvent {
            kind: SecurityEventKind::LoginFailure,
            user_email: Some("intruder@example.com"),
            ip: None,
            detail: Some("unknown email"),
        })
        .await
        .unwrap();
        repo.record(&NewSecurityEvent {
            kind: SecurityEventKind::SettingsChanged,
            user_email: Some("avery@cloudcrm.example"),
            ip: None,
            detail: Some("store settings updated (2 keys)"),
        })
        .await
        .unwrap();

        let by_kind = repo
            .list(None, Some(SecurityEventKind::SettingsChanged))
            .await
            .unwrap();
        assert_eq!(by_kind.len(), 1);

        let by_detail = repo.list(Some("UNKNOWN"), None).await.unwrap();
        assert_eq!(by_detail.len(), 1);
        assert_eq!(by_detail[0].kind, SecurityEventKind::LoginFailure);

        let by_email = repo.list(Some("avery@"), None).await.unwrap();
        assert_eq!(by_email.len(), 1);
    }

    #[tokio::test]
    async fn test_audit_swallows_errors() {
        let pool = test_pool().await;
        // Closing the pool forces the insert to fail.
        pool.close().await;

        audit(
            &pool,
            NewSecurityEvent {
                kind: SecurityEventKind::Logout,
                user_email: None,
                ip: None,
                detail: None,
            },
        )
        .await;
    }
}
