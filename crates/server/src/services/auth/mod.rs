//! Authentication service.
//!
//! Operator login, password changes, and account creation. Every login
//! outcome lands in the security event log, while the caller only ever
//! learns "invalid credentials" for any failure.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::SqlitePool;

use cloudcrm_core::{Email, SecurityEventKind, UserRole, UserStatus};

use crate::config::ConfigError;
use crate::db::users::UserRepository;
use crate::db::{NewSecurityEvent, RepositoryError, audit};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Login with email and password.
    ///
    /// Records a `login_failure` or `login_success` event with the precise
    /// cause; the returned error is always `InvalidCredentials` so the
    /// response cannot be used to probe which emails exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for any bad login.
    /// Returns `AuthError::Repository` if a query fails.
    pub async fn login(
        &self,
        email_raw: &str,
        password: &str,
        ip: Option<&str>,
    ) -> Result<User, AuthError> {
        let failed = |detail: &'static str| NewSecurityEvent {
            kind: SecurityEventKind::LoginFailure,
            user_email: Some(email_raw),
            ip,
            detail: Some(detail),
        };

        let Ok(email) = Email::parse(email_raw) else {
            audit(self.pool, failed("malformed email")).await;
            return Err(AuthError::InvalidCredentials);
        };

        let users = UserRepository::new(self.pool);
        let Some((mut user, password_hash)) = users.get_credentials(&email).await? else {
            audit(self.pool, failed("unknown email")).await;
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &password_hash).is_err() {
            audit(self.pool, failed("wrong password")).await;
            return Err(AuthError::InvalidCredentials);
        }

        if user.status == UserStatus::Suspended {
            audit(self.pool, failed("account suspended")).await;
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        users.touch_last_login(user.id, now).await?;
        user.last_login_at = Some(now);

        audit(
            self.pool,
            NewSecurityEvent {
                kind: SecurityEventKind::LoginSuccess,
                user_email: Some(email.as_str()),
                ip,
                detail: None,
            },
        )
        .await;

        Ok(user)
    }

    /// Change an operator's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the current password is
    /// wrong. Returns `AuthError::WeakPassword` if the new one fails
    /// validation. Returns `AuthError::Repository` if a query fails.
    pub async fn change_password(
        &self,
        user: &User,
        current: &str,
        new: &str,
        ip: Option<&str>,
    ) -> Result<(), AuthError> {
        let users = UserRepository::new(self.pool);
        let (_, password_hash) = users
            .get_credentials(&user.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(current, &password_hash)?;

        validate_password(new)?;
        let new_hash = hash_password(new)?;
        users.update_password(user.id, &new_hash).await?;

        audit(
            self.pool,
            NewSecurityEvent {
                kind: SecurityEventKind::PasswordChanged,
                user_email: Some(user.email.as_str()),
                ip,
                detail: None,
            },
        )
        .await;

        Ok(())
    }

    /// Create an operator account with a validated password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password fails validation.
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    /// Returns `AuthError::Repository` if a query fails.
    pub async fn create_user(
        &self,
        name: &str,
        email_raw: &str,
        role: UserRole,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email_raw)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        UserRepository::new(self.pool)
            .create(name, &email, role, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

/// Validate password strength.
///
/// Length first, then the same placeholder and entropy checks applied to
/// configured secrets.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    crate::config::validate_secret_strength(password, "password").map_err(|e| match e {
        ConfigError::InsecureSecret(_, reason) => AuthError::WeakPassword(reason),
        other => AuthError::WeakPassword(other.to_string()),
    })
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
