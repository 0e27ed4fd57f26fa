//! Status enums for CRM entities.
//!
//! Every enumerated state the dashboard renders lives here, together with its
//! human label and badge color class. Keeping the mappings beside the enum
//! (and writing them without wildcard arms) means adding a variant without a
//! label or color is a compile error, so the mappings stay total.
//!
//! Wire format is `snake_case` everywhere: serde, `Display`, `FromStr`, and
//! the database all agree on the same string.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a wholesale customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Inactive,
    #[default]
    Pending,
}

impl CustomerStatus {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Pending];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Active => "badge-green",
            Self::Inactive => "badge-gray",
            Self::Pending => "badge-yellow",
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            _ => Err(format!("invalid customer status: {s}")),
        }
    }
}

/// Status of a supplier relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

impl SupplierStatus {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Active => "badge-green",
            Self::Inactive => "badge-gray",
        }
    }
}

impl std::fmt::Display for SupplierStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for SupplierStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid supplier status: {s}")),
        }
    }
}

/// Fulfillment status of a wholesale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Terminal statuses accept no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Pending => "badge-yellow",
            Self::Processing => "badge-blue",
            Self::Shipped => "badge-purple",
            Self::Delivered => "badge-green",
            Self::Cancelled => "badge-red",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Stock level classification, derived from `stock` and the per-product
/// low-stock threshold. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 3] = [Self::InStock, Self::LowStock, Self::OutOfStock];

    /// Classify a stock level against a low-stock threshold.
    ///
    /// Zero is always out of stock, at or below the threshold is low.
    #[must_use]
    pub const fn for_level(stock: i64, low_stock_threshold: i64) -> Self {
        if stock <= 0 {
            Self::OutOfStock
        } else if stock <= low_stock_threshold {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::InStock => "badge-green",
            Self::LowStock => "badge-yellow",
            Self::OutOfStock => "badge-red",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in_stock"),
            Self::LowStock => write!(f, "low_stock"),
            Self::OutOfStock => write!(f, "out_of_stock"),
        }
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "low_stock" => Ok(Self::LowStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

/// Role of a dashboard operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including settings, backups, and user management.
    Admin,
    /// Day-to-day management of customers, orders, and inventory.
    Manager,
    /// Read and basic edit access.
    #[default]
    Staff,
}

impl UserRole {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Manager, Self::Staff];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Staff => "Staff",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Admin => "badge-purple",
            Self::Manager => "badge-blue",
            Self::Staff => "badge-gray",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Account status of a dashboard operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Suspended,
}

impl UserStatus {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 2] = [Self::Active, Self::Suspended];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Active => "badge-green",
            Self::Suspended => "badge-red",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(format!("invalid user status: {s}")),
        }
    }
}

/// Source category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Inventory,
    Customer,
    System,
}

impl NotificationKind {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 4] = [Self::Order, Self::Inventory, Self::Customer, Self::System];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Order => "Order",
            Self::Inventory => "Inventory",
            Self::Customer => "Customer",
            Self::System => "System",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Order => "badge-blue",
            Self::Inventory => "badge-yellow",
            Self::Customer => "badge-green",
            Self::System => "badge-gray",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Order => write!(f, "order"),
            Self::Inventory => write!(f, "inventory"),
            Self::Customer => write!(f, "customer"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "inventory" => Ok(Self::Inventory),
            "customer" => Ok(Self::Customer),
            "system" => Ok(Self::System),
            _ => Err(format!("invalid notification kind: {s}")),
        }
    }
}

/// Urgency of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 3] = [Self::Info, Self::Warning, Self::Critical];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::Info => "badge-blue",
            Self::Warning => "badge-yellow",
            Self::Critical => "badge-red",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("invalid severity: {s}")),
        }
    }
}

/// Kind of entry in the security audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlite", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    LoginSuccess,
    LoginFailure,
    Logout,
    SessionRevoked,
    PasswordChanged,
    SettingsChanged,
    BackupCreated,
    BackupRestored,
}

impl SecurityEventKind {
    /// Every variant, for totality checks and filter dropdowns.
    pub const ALL: [Self; 8] = [
        Self::LoginSuccess,
        Self::LoginFailure,
        Self::Logout,
        Self::SessionRevoked,
        Self::PasswordChanged,
        Self::SettingsChanged,
        Self::BackupCreated,
        Self::BackupRestored,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "Login",
            Self::LoginFailure => "Failed Login",
            Self::Logout => "Logout",
            Self::SessionRevoked => "Session Revoked",
            Self::PasswordChanged => "Password Changed",
            Self::SettingsChanged => "Settings Changed",
            Self::BackupCreated => "Backup Created",
            Self::BackupRestored => "Backup Restored",
        }
    }

    /// Badge color class rendered by the dashboard.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "badge-green",
            Self::LoginFailure => "badge-red",
            Self::Logout => "badge-gray",
            Self::SessionRevoked => "badge-yellow",
            Self::PasswordChanged => "badge-blue",
            Self::SettingsChanged => "badge-blue",
            Self::BackupCreated => "badge-green",
            Self::BackupRestored => "badge-yellow",
        }
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoginSuccess => write!(f, "login_success"),
            Self::LoginFailure => write!(f, "login_failure"),
            Self::Logout => write!(f, "logout"),
            Self::SessionRevoked => write!(f, "session_revoked"),
            Self::PasswordChanged => write!(f, "password_changed"),
            Self::SettingsChanged => write!(f, "settings_changed"),
            Self::BackupCreated => write!(f, "backup_created"),
            Self::BackupRestored => write!(f, "backup_restored"),
        }
    }
}

impl std::str::FromStr for SecurityEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login_success" => Ok(Self::LoginSuccess),
            "login_failure" => Ok(Self::LoginFailure),
            "logout" => Ok(Self::Logout),
            "session_revoked" => Ok(Self::SessionRevoked),
            "password_changed" => Ok(Self::PasswordChanged),
            "settings_changed" => Ok(Self::SettingsChanged),
            "backup_created" => Ok(Self::BackupCreated),
            "backup_restored" => Ok(Self::BackupRestored),
            _ => Err(format!("invalid security event kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PALETTE: [&str; 6] = [
        "badge-green",
        "badge-yellow",
        "badge-red",
        "badge-blue",
        "badge-purple",
        "badge-gray",
    ];

    fn assert_total<T>(all: &[T])
    where
        T: Copy
            + PartialEq
            + std::fmt::Debug
            + std::fmt::Display
            + std::str::FromStr<Err = String>,
    {
        for variant in all {
            let wire = variant.to_string();
            assert!(!wire.is_empty());
            let back: T = wire.parse().unwrap();
            assert_eq!(back, *variant, "wire round-trip for {variant:?}");
        }
    }

    #[test]
    fn test_customer_status_total() {
        assert_total(&CustomerStatus::ALL);
        for s in CustomerStatus::ALL {
            assert!(!s.label().is_empty());
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_supplier_status_total() {
        assert_total(&SupplierStatus::ALL);
        for s in SupplierStatus::ALL {
            assert!(!s.label().is_empty());
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_order_status_total() {
        assert_total(&OrderStatus::ALL);
        for s in OrderStatus::ALL {
            assert!(!s.label().is_empty());
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_stock_status_total() {
        assert_total(&StockStatus::ALL);
        for s in StockStatus::ALL {
            assert!(!s.label().is_empty());
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_user_enums_total() {
        assert_total(&UserRole::ALL);
        assert_total(&UserStatus::ALL);
        for r in UserRole::ALL {
            assert!(PALETTE.contains(&r.badge_class()));
        }
        for s in UserStatus::ALL {
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_notification_enums_total() {
        assert_total(&NotificationKind::ALL);
        assert_total(&Severity::ALL);
        for k in NotificationKind::ALL {
            assert!(PALETTE.contains(&k.badge_class()));
        }
        for s in Severity::ALL {
            assert!(PALETTE.contains(&s.badge_class()));
        }
    }

    #[test]
    fn test_security_event_kind_total() {
        assert_total(&SecurityEventKind::ALL);
        for k in SecurityEventKind::ALL {
            assert!(!k.label().is_empty());
            assert!(PALETTE.contains(&k.badge_class()));
        }
    }

    #[test]
    fn test_order_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_stock_classification() {
        assert_eq!(StockStatus::for_level(0, 10), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_level(1, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::for_level(10, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::for_level(11, 10), StockStatus::InStock);
        // Zero threshold disables the low band without disabling out-of-stock
        assert_eq!(StockStatus::for_level(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::for_level(1, 0), StockStatus::InStock);
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&SecurityEventKind::LoginFailure).unwrap(),
            "\"login_failure\""
        );
        let status: CustomerStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, CustomerStatus::Pending);
    }

    #[test]
    fn test_badge_stability() {
        // Pinned: pages cache these classes, changing one is a UI break.
        assert_eq!(OrderStatus::Pending.badge_class(), "badge-yellow");
        assert_eq!(OrderStatus::Delivered.badge_class(), "badge-green");
        assert_eq!(OrderStatus::Cancelled.badge_class(), "badge-red");
        assert_eq!(StockStatus::OutOfStock.badge_class(), "badge-red");
        assert_eq!(UserStatus::Suspended.badge_class(), "badge-red");
    }
}
