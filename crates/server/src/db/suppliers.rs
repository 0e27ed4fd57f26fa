//! Supplier repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use cloudcrm_core::{Email, SupplierId, SupplierStatus};

use super::{RepositoryError, like_contains};
use crate::models::Supplier;

const BASE_SELECT: &str = "SELECT id, name, contact_name, email, phone, city, country, status, \
     created_at, updated_at FROM suppliers";

/// Internal row type for supplier queries.
#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: i64,
    name: String,
    contact_name: String,
    email: String,
    phone: String,
    city: String,
    country: String,
    status: SupplierStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = RepositoryError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: SupplierId::new(row.id),
            name: row.name,
            contact_name: row.contact_name,
            email,
            phone: row.phone,
            city: row.city,
            country: row.country,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for supplier database operations.
pub struct SupplierRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SupplierRepository<'a> {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List suppliers, name ascending, optionally filtered.
    ///
    /// `search` matches name, contact name, or email as a case-insensitive
    /// substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<SupplierStatus>,
    ) -> Result<Vec<Supplier>, RepositoryError> {
        let mut query = QueryBuilder::<sqlx::Sqlite>::new(BASE_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = like_contains(term);
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(contact_name) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(email) LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
        if let Some(status) = status {
            query.push(" AND status = ");
            query.push_bind(status);
        }
        query.push(" ORDER BY name COLLATE NOCASE ASC");

        let rows: Vec<SupplierRow> = query.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a supplier by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let sql = format!("{BASE_SELECT} WHERE id = ?");
        let row = sqlx::query_as::<_, SupplierRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        name: &str,
        contact_name: &str,
        email: &Email,
        phone: &str,
        city: &str,
        country: &str,
        status: SupplierStatus,
    ) -> Result<Supplier, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO suppliers \
             (name, contact_name, email, phone, city, country, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(contact_name)
        .bind(email.as_str())
        .bind(phone)
        .bind(city)
        .bind(country)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a supplier with this email already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        let id = SupplierId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a supplier's fields (full update).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: SupplierId,
        name: &str,
        contact_name: &str,
        email: &Email,
        phone: &str,
        city: &str,
        country: &str,
        status: SupplierStatus,
    ) -> Result<Supplier, RepositoryError> {
        let result = sqlx::query(
            "UPDATE suppliers \
             SET name = ?, contact_name = ?, email = ?, phone = ?, city = ?, country = ?, \
                 status = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name)
        .bind(contact_name)
        .bind(email.as_str())
        .bind(phone)
        .bind(city)
        .bind(country)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a supplier with this email already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a supplier. Products referencing it keep their rows with
    /// `supplier_id` cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
