//! Login session repository for database operations.
//!
//! These rows mirror the cookie-backed session store so revocation and the
//! active-session list work without touching serialized session blobs.
//! Session IDs are stored as UUID text.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use cloudcrm_core::UserId;

use super::RepositoryError;
use crate::models::SessionView;

/// Internal row type for session queries.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: i64,
    user_name: String,
    user_email: String,
    ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_view(self, current: Uuid) -> Result<SessionView, RepositoryError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid session id in database: {e}"))
        })?;

        Ok(SessionView {
            current: id == current,
            id,
            user_id: UserId::new(self.user_id),
            user_name: self.user_name,
            user_email: self.user_email,
            ip: self.ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_seen_at: self.last_seen_at,
        })
    }
}

/// Repository for login session database operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a fresh login session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        id: Uuid,
        user_id: UserId,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO sessions (id, user_id, ip, user_agent, revoked, created_at, last_seen_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id)
        .bind(ip)
        .bind(user_agent)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Bump `last_seen_at` for a live session. Returns `false` when the
    /// session is unknown or revoked, in which case the caller must treat
    /// the request as unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE id = ? AND revoked = 0")
                .bind(Utc::now())
                .bind(id.to_string())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke a live session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the session is unknown or
    /// already revoked. Returns `RepositoryError::Database` for other
    /// database errors.
    pub async fn revoke(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE sessions SET revoked = 1 WHERE id = ? AND revoked = 0")
            .bind(id.to_string())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// List live sessions across all users, most recently seen first.
    /// `current` marks which row belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored ID is not a UUID.
    pub async fn list_active(&self, current: Uuid) -> Result<Vec<SessionView>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT s.id, s.user_id, u.name AS user_name, u.email AS user_email, \
                    s.ip, s.user_agent, s.created_at, s.last_seen_at \
             FROM sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.revoked = 0 \
             ORDER BY s.last_seen_at DESC, s.id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_view(current)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_pool;
    use super::*;
    use crate::db::UserRepository;
    use cloudcrm_core::{Email, UserRole};

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAAAAAAAAAAAAAAAAAAAA";

    async fn seed_user(pool: &SqlitePool) -> UserId {
        UserRepository::new(pool)
            .create(
                "Avery Ops",
                &Email::parse("avery@cloudcrm.example").unwrap(),
                UserRole::Admin,
                HASH,
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_insert_touch_and_list() {
        let pool = test_pool().await;
        let repo = SessionRepository::new(&pool);
        let user_id = seed_user(&pool).await;

        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.insert(mine, user_id, Some("203.0.113.7"), Some("Mozilla/5.0"))
            .await
            .unwrap();
        repo.insert(other, user_id, None, None).await.unwrap();

        assert!(repo.touch(mine).await.unwrap());

        let sessions = repo.list_active(mine).await.unwrap();
        assert_eq!(sessions.len(), 2);
        let current = sessions.iter().find(|s| s.id == mine).unwrap();
        assert!(current.current);
        assert_eq!(current.user_email, "avery@cloudcrm.example");
        assert!(!sessions.iter().find(|s| s.id == other).unwrap().current);
    }

    #[tokio::test]
    async fn test_revoked_sessions_stop_touching_and_listing() {
        let pool = test_pool().await;
        let repo = SessionRepository::new(&pool);
        let user_id = seed_user(&pool).await;

        let id = Uuid::new_v4();
        repo.insert(id, user_id, None, None).await.unwrap();
        repo.revoke(id).await.unwrap();

        assert!(!repo.touch(id).await.unwrap());
        assert!(repo.list_active(id).await.unwrap().is_empty());

        // Revoking again reports not found.
        let err = repo.revoke(id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_revoke_unknown_session() {
        let pool = test_pool().await;
        let repo = SessionRepository::new(&pool);

        let err = repo.revoke(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
