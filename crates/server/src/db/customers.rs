//! Customer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, SqlitePool};

use cloudcrm_core::{CustomerId, CustomerStatus, Email, Money};

use super::{RepositoryError, like_contains};
use crate::models::Customer;

/// Shared SELECT for customer queries; the two subqueries derive
/// `orders_count` and `total_spent_cents` over non-cancelled orders.
const BASE_SELECT: &str = "SELECT c.id, c.name, c.company, c.email, c.phone, c.status, \
     c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM orders o \
        WHERE o.customer_id = c.id AND o.status != 'cancelled') AS orders_count, \
     (SELECT COALESCE(SUM(o.total_cents), 0) FROM orders o \
        WHERE o.customer_id = c.id AND o.status != 'cancelled') AS total_spent_cents \
     FROM customers c";

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    company: String,
    email: String,
    phone: String,
    status: CustomerStatus,
    orders_count: i64,
    total_spent_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            company: row.company,
            email,
            phone: row.phone,
            status: row.status,
            orders_count: row.orders_count,
            total_spent_cents: Money::from_cents(row.total_spent_cents),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List customers, name ascending, optionally filtered.
    ///
    /// `search` matches name, company, or email as a case-insensitive
    /// substring with LIKE metacharacters escaped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(
        &self,
        search: Option<&str>,
        status: Option<CustomerStatus>,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let mut query = QueryBuilder::<sqlx::Sqlite>::new(BASE_SELECT);
        query.push(" WHERE 1 = 1");

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            let pattern = like_contains(term);
            query.push(" AND (LOWER(c.name) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(c.company) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" ESCAPE '\\' OR LOWER(c.email) LIKE ");
            query.push_bind(pattern);
            query.push(" ESCAPE '\\')");
        }
        if let Some(status) = status {
            query.push(" AND c.status = ");
            query.push_bind(status);
        }
        query.push(" ORDER BY c.name COLLATE NOCASE ASC");

        let rows: Vec<CustomerRow> = query.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("{BASE_SELECT} WHERE c.id = ?");
        let row = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        company: &str,
        email: &Email,
        phone: &str,
        status: CustomerStatus,
    ) -> Result<Customer, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO customers (name, company, email, phone, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(company)
        .bind(email.as_str())
        .bind(phone)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a customer with this email already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        let id = CustomerId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a customer's fields (full update).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CustomerId,
        name: &str,
        company: &str,
        email: &Email,
        phone: &str,
        status: CustomerStatus,
    ) -> Result<Customer, RepositoryError> {
        let result = sqlx::query(
            "UPDATE customers \
             SET name = ?, company = ?, email = ?, phone = ?, status = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(name)
        .bind(company)
        .bind(email.as_str())
        .bind(phone)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict("a customer with this email already exists".to_string())
            }
            other => RepositoryError::Database(other),
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer.
    ///
    /// Customers with orders cannot be deleted; the orders keep their
    /// history and the dashboard offers deactivation instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer has orders.
    /// Returns `RepositoryError::NotFound` if the ID does not exist.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let order_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        if order_count > 0 {
            return Err(RepositoryError::Conflict(
                "customer has orders and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
