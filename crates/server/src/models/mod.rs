//! Domain models for the CRM service.
//!
//! These are the JSON views the dashboard consumes, built from database rows
//! by the repositories in [`crate::db`]. Validated domain types from
//! `cloudcrm-core` (typed IDs, `Email`, `Money`, status enums) flow through
//! unchanged.

pub mod backup;
pub mod customer;
pub mod notification;
pub mod order;
pub mod product;
pub mod security;
pub mod session;
pub mod supplier;
pub mod user;

pub use backup::Backup;
pub use customer::Customer;
pub use notification::Notification;
pub use order::Order;
pub use product::Product;
pub use security::{SecurityEvent, SessionView};
pub use session::CurrentUser;
pub use session::keys as session_keys;
pub use supplier::Supplier;
pub use user::User;
