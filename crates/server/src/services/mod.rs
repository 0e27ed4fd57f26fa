//! Business logic services for the CRM API.
//!
//! # Services
//!
//! - `auth` - Operator login, password changes, account creation
//! - `backup` - JSON snapshots of the business tables and their restore

pub mod auth;
pub mod backup;

pub use auth::{AuthError, AuthService};
pub use backup::{BackupService, RestoreSummary};
