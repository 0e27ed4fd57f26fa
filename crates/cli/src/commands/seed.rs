//! Seed the database with demo data.
//!
//! Fills an empty database with a plausible wholesale-clothing dataset so
//! the dashboard has something to show during development: suppliers,
//! customers, products at varied stock levels, orders across every status,
//! and a few notifications. Operator accounts are not seeded; create one
//! with `cloudcrm-cli user create`.

use chrono::{Duration, Utc};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

use cloudcrm_core::{
    CustomerStatus, Email, EmailError, Money, NotificationKind, OrderStatus, Severity,
    SupplierStatus,
};
use cloudcrm_server::db::{
    self, CustomerRepository, NotificationRepository, OrderRepository, ProductRepository,
    RepositoryError, SupplierRepository,
};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A repository refused part of the dataset.
    #[error("Seeding failed: {0}")]
    Repository(#[from] RepositoryError),

    /// A seed email failed validation.
    #[error("Invalid seed email: {0}")]
    Email(#[from] EmailError),

    /// The database already holds business data.
    #[error("Database already contains data; rerun with --force to seed anyway")]
    NotEmpty,
}

/// Seed the database with the demo dataset.
///
/// Refuses to run against a database that already has customers unless
/// `force` is set. Assumes migrations have been applied.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing, the connection
/// fails, or an insert is refused.
pub async fn run(force: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CLOUDCRM_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("CLOUDCRM_DATABASE_URL"))?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        if !force {
            return Err(SeedError::NotEmpty);
        }
        warn!("Database already contains {existing} customers, seeding anyway");
    }

    let suppliers = SupplierRepository::new(&pool);
    let customers = CustomerRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let orders = OrderRepository::new(&pool);
    let notifications = NotificationRepository::new(&pool);

    // Suppliers
    info!("Seeding suppliers...");
    let herrera = suppliers
        .create(
            "Herrera Textiles",
            "Nina Herrera",
            &Email::parse("supply@herreratextiles.example")?,
            "+34 961 555 210",
            "Valencia",
            "ES",
            SupplierStatus::Active,
        )
        .await?;
    let mercer = suppliers
        .create(
            "Mercer & Sloane",
            "Jack Mercer",
            &Email::parse("orders@mercersloane.example")?,
            "+44 20 7946 0018",
            "London",
            "GB",
            SupplierStatus::Active,
        )
        .await?;
    let kogane = suppliers
        .create(
            "Kogane Fabrics",
            "Yui Tanaka",
            &Email::parse("hello@koganefabrics.example")?,
            "+81 3 5555 0142",
            "Osaka",
            "JP",
            SupplierStatus::Active,
        )
        .await?;
    let atlas = suppliers
        .create(
            "Atlas Knitwear",
            "Omar Haddad",
            &Email::parse("sales@atlasknitwear.example")?,
            "",
            "Casablanca",
            "MA",
            SupplierStatus::Inactive,
        )
        .await?;

    // Customers
    info!("Seeding customers...");
    let zoe = customers
        .create(
            "Zoe Quinn",
            "Quinn Retail Group",
            &Email::parse("zoe@quinnretail.example")?,
            "+1 212 555 0184",
            CustomerStatus::Active,
        )
        .await?;
    let amir = customers
        .create(
            "Amir Patel",
            "Patel & Daughters",
            &Email::parse("amir@pateldaughters.example")?,
            "+1 415 555 0119",
            CustomerStatus::Active,
        )
        .await?;
    let lena = customers
        .create(
            "Lena Fischer",
            "Nordwind Mode",
            &Email::parse("lena@nordwindmode.example")?,
            "+49 30 555 0173",
            CustomerStatus::Active,
        )
        .await?;
    let marcus = customers
        .create(
            "Marcus Webb",
            "Webb Outfitters",
            &Email::parse("marcus@webboutfitters.example")?,
            "",
            CustomerStatus::Pending,
        )
        .await?;
    customers
        .create(
            "Sofia Rossi",
            "Rossi Boutique",
            &Email::parse("sofia@rossiboutique.example")?,
            "+39 02 555 0147",
            CustomerStatus::Inactive,
        )
        .await?;
    let priya = customers
        .create(
            "Priya Nair",
            "Nair Trading Co",
            &Email::parse("priya@nairtrading.example")?,
            "+91 22 5555 0160",
            CustomerStatus::Active,
        )
        .await?;

    // Products, spread across stock bands so the inventory page has
    // in-stock, low, and sold-out rows from the start.
    info!("Seeding products...");
    let catalog = [
        ("Wool Peacoat", "SKU-OUT-001", "Outerwear", 18_900, 42, 10, Some(herrera.id)),
        ("Linen Summer Shirt", "SKU-SHI-002", "Shirts", 4_900, 180, 25, Some(mercer.id)),
        ("Selvedge Denim Jeans", "SKU-DEN-003", "Denim", 9_800, 8, 15, Some(kogane.id)),
        ("Merino Crewneck", "SKU-KNI-004", "Knitwear", 7_600, 0, 20, Some(atlas.id)),
        ("Oxford Button-Down", "SKU-SHI-005", "Shirts", 5_400, 96, 25, Some(mercer.id)),
        ("Canvas Chore Jacket", "SKU-OUT-006", "Outerwear", 11_200, 12, 15, Some(herrera.id)),
        ("Silk Pocket Square", "SKU-ACC-007", "Accessories", 2_400, 300, 50, Some(kogane.id)),
        ("Cashmere Scarf", "SKU-ACC-008", "Accessories", 8_800, 0, 10, None),
    ];
    for (name, sku, category, cents, stock, threshold, supplier_id) in catalog {
        products
            .create(
                name,
                sku,
                category,
                Money::from_cents(cents),
                stock,
                threshold,
                supplier_id,
            )
            .await?;
    }

    // Orders over the past three weeks, oldest first so order numbers
    // follow the timeline.
    info!("Seeding orders...");
    let history = [
        (zoe.id, 145_600, 12, 21, OrderStatus::Delivered),
        (amir.id, 89_000, 8, 18, OrderStatus::Delivered),
        (zoe.id, 47_800, 4, 12, OrderStatus::Shipped),
        (lena.id, 156_000, 15, 10, OrderStatus::Shipped),
        (priya.id, 32_400, 3, 7, OrderStatus::Processing),
        (amir.id, 99_000, 9, 5, OrderStatus::Cancelled),
        (marcus.id, 21_800, 2, 2, OrderStatus::Pending),
        (lena.id, 68_000, 6, 1, OrderStatus::Pending),
    ];
    let mut order_count = 0;
    for (customer_id, cents, items, days_ago, status) in history {
        let placed_at = Utc::now() - Duration::days(days_ago);
        let order = orders
            .create(customer_id, Money::from_cents(cents), items, placed_at)
            .await?;
        if status != OrderStatus::Pending {
            orders.update_status(order.id, status).await?;
        }
        order_count += 1;
    }

    // Notifications matching the seeded stock levels.
    info!("Seeding notifications...");
    notifications
        .insert(
            NotificationKind::Inventory,
            Severity::Warning,
            "Low stock: Selvedge Denim Jeans",
            "SKU-DEN-003 has 8 units left",
        )
        .await?;
    notifications
        .insert(
            NotificationKind::Inventory,
            Severity::Critical,
            "Out of stock: Merino Crewneck",
            "SKU-KNI-004 has 0 units left",
        )
        .await?;
    notifications
        .insert(
            NotificationKind::Order,
            Severity::Info,
            "New order ORD-1007",
            "Webb Outfitters placed an order",
        )
        .await?;

    info!("Seeding complete!");
    info!("  Suppliers: 4");
    info!("  Customers: 6");
    info!("  Products: {}", catalog.len());
    info!("  Orders: {order_count}");
    info!("  Notifications: 3");

    Ok(())
}
