//! Settings repository for database operations.
//!
//! Rows hold JSON-encoded values keyed by `(area, key)`. Schema knowledge
//! (which keys exist, their types and defaults) lives in
//! [`crate::settings`]; this layer only stores and retrieves strings.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::settings::SettingsArea;

/// Repository for settings database operations.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch all stored overrides for one area, keyed by setting name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_area(
        &self,
        area: SettingsArea,
    ) -> Result<HashMap<String, String>, RepositoryError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings WHERE area = ?")
                .bind(area.as_str())
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    /// Write a batch of key/value pairs for one area in a single
    /// transaction. Existing keys are overwritten; either every pair lands
    /// or none do.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any write fails.
    pub async fn upsert_area(
        &self,
        area: SettingsArea,
        pairs: &[(String, String)],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for (key, value) in pairs {
            sqlx::query(
                "INSERT INTO settings (area, key, value, updated_at) VALUES (?, ?, ?, ?) \
                 ON CONFLICT (area, key) DO UPDATE \
                 SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(area.as_str())
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
