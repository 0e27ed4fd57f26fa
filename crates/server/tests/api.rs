//! End-to-end API tests.
//!
//! Each test spawns the full router (session, security header and rate-limit
//! layers included) on an ephemeral port with a fresh in-memory database,
//! then drives it over HTTP with a cookie-holding client exactly as the
//! dashboard would.

#![allow(clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use cloudcrm_core::UserRole;
use cloudcrm_server::{ServerConfig, build_router, services::AuthService};

const ADMIN_EMAIL: &str = "admin@cloudcrm.test";
const ADMIN_PASSWORD: &str = "Tr1dent&Halcyon-9x";
const STAFF_EMAIL: &str = "staff@cloudcrm.test";
const STAFF_PASSWORD: &str = "v4lkyrie-Qu3st!88";

// =============================================================================
// Harness
// =============================================================================

struct TestApp {
    base_url: String,
    pool: SqlitePool,
}

async fn spawn_app() -> TestApp {
    // A single connection keeps the in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");

    AuthService::new(&pool)
        .create_user("Avery Admin", ADMIN_EMAIL, UserRole::Admin, ADMIN_PASSWORD)
        .await
        .expect("failed to seed admin user");

    let config = ServerConfig {
        database_url: SecretString::from("sqlite::memory:".to_string()),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:8080".to_string(),
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };

    let app = build_router(config, pool.clone())
        .await
        .expect("failed to build router");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        pool,
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn client() -> Client {
        Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build HTTP client")
    }

    /// Log in and return a client holding the session cookie.
    async fn login(&self, email: &str, password: &str) -> Client {
        let client = Self::client();
        let resp = client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
        client
    }

    async fn admin(&self) -> Client {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    async fn seed_staff(&self) {
        AuthService::new(&self.pool)
            .create_user("Sam Staff", STAFF_EMAIL, UserRole::Staff, STAFF_PASSWORD)
            .await
            .expect("failed to seed staff user");
    }
}

async fn create_customer(client: &Client, app: &TestApp, name: &str, email: &str) -> Value {
    let resp = client
        .post(app.url("/api/customers"))
        .json(&json!({ "name": name, "email": email, "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn create_product(
    client: &Client,
    app: &TestApp,
    sku: &str,
    stock: i64,
    threshold: i64,
) -> Value {
    let resp = client
        .post(app.url("/api/inventory"))
        .json(&json!({
            "name": "Wool Peacoat",
            "sku": sku,
            "category": "Outerwear",
            "price_cents": 18_900,
            "stock": stock,
            "low_stock_threshold": threshold,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn create_order(client: &Client, app: &TestApp, customer_id: i64, total_cents: i64) -> Value {
    let resp = client
        .post(app.url("/api/orders"))
        .json(&json!({
            "customer_id": customer_id,
            "total_cents": total_cents,
            "items_count": 3,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

async fn error_message(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app().await;
    let client = TestApp::client();

    let resp = client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get(app.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_api_requires_authentication() {
    let app = spawn_app().await;
    let client = TestApp::client();

    for path in [
        "/api/customers",
        "/api/orders",
        "/api/dashboard/stats",
        "/api/security/events",
        "/api/settings/store",
    ] {
        let resp = client.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "expected 401 for {path}");
        assert_eq!(error_message(resp).await, "authentication required");
    }

    let resp = client.post(app.url("/api/backups")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = spawn_app().await;
    let client = TestApp::client();

    // Unknown email and wrong password must be indistinguishable.
    for (email, password) in [
        ("nobody@cloudcrm.test", ADMIN_PASSWORD),
        (ADMIN_EMAIL, "not-the-password-7"),
    ] {
        let resp = client
            .post(app.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(resp).await, "invalid credentials");
    }

    // The audit log still records why each attempt failed.
    let admin = app.admin().await;
    let events: Vec<Value> = admin
        .get(app.url("/api/security/events?kind=login_failure"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let details: Vec<&str> = events
        .iter()
        .filter_map(|e| e["detail"].as_str())
        .collect();
    assert!(details.contains(&"unknown email"));
    assert!(details.contains(&"wrong password"));
}

#[tokio::test]
async fn test_login_logout_flow() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let resp = client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert_eq!(me["role"], "admin");
    assert!(me.get("password_hash").is_none());
    assert!(me["last_login_at"].is_string());

    let resp = client.post(app.url("/api/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The cookie is dead afterwards.
    let resp = client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Both sides of the visit are in the audit log.
    let admin = app.admin().await;
    for kind in ["login_success", "logout"] {
        let events: Vec<Value> = admin
            .get(app.url(&format!("/api/security/events?kind={kind}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(!events.is_empty(), "no {kind} events recorded");
        assert_eq!(events[0]["user_email"], ADMIN_EMAIL);
    }
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = spawn_app().await;
    let client = TestApp::client();

    let mut statuses = Vec::new();
    for _ in 0..10 {
        let resp = client
            .post(app.url("/api/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong-guess-42" }))
            .send()
            .await
            .unwrap();
        statuses.push(resp.status());
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            assert_eq!(error_message(resp).await, "too many requests");
            return;
        }
    }
    panic!("no request was rate limited: {statuses:?}");
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;
    app.seed_staff().await;
    let client = app.login(STAFF_EMAIL, STAFF_PASSWORD).await;

    // Wrong current password.
    let resp = client
        .post(app.url("/api/auth/password"))
        .json(&json!({
            "current_password": "not-it-at-all-9",
            "new_password": "Br@mble-Citadel-77",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // New password too weak.
    let resp = client
        .post(app.url("/api/auth/password"))
        .json(&json!({
            "current_password": STAFF_PASSWORD,
            "new_password": "password123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Valid change.
    let resp = client
        .post(app.url("/api/auth/password"))
        .json(&json!({
            "current_password": STAFF_PASSWORD,
            "new_password": "Br@mble-Citadel-77",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Old password stops working, the new one works.
    let resp = TestApp::client()
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": STAFF_EMAIL, "password": STAFF_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    app.login(STAFF_EMAIL, "Br@mble-Citadel-77").await;
}

// =============================================================================
// Customers
// =============================================================================

#[tokio::test]
async fn test_customer_crud() {
    let app = spawn_app().await;
    let client = app.admin().await;

    // Create with defaults.
    let resp = client
        .post(app.url("/api/customers"))
        .json(&json!({ "name": "Zoe Quinn", "email": "Zoe@Example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["email"], "zoe@example.com");
    assert_eq!(created["orders_count"], 0);
    assert_eq!(created["total_spent_cents"], 0);
    let id = created["id"].as_i64().unwrap();

    // Fetch it back.
    let resp = client
        .get(app.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Duplicate email.
    let resp = client
        .post(app.url("/api/customers"))
        .json(&json!({ "name": "Other", "email": "zoe@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "a customer with this email already exists"
    );

    // Invalid payloads.
    let resp = client
        .post(app.url("/api/customers"))
        .json(&json!({ "name": "  ", "email": "a@b.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let resp = client
        .post(app.url("/api/customers"))
        .json(&json!({ "name": "No Email", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Update replaces the record.
    let resp = client
        .put(app.url(&format!("/api/customers/{id}")))
        .json(&json!({
            "name": "Zoe Quinn",
            "company": "Quinn Retail",
            "email": "zoe@example.com",
            "status": "active",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["company"], "Quinn Retail");
    assert_eq!(updated["status"], "active");

    // Search and status filters.
    let found: Vec<Value> = client
        .get(app.url("/api/customers?q=quinn&status=active"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    let none: Vec<Value> = client
        .get(app.url("/api/customers?status=inactive"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(none.is_empty());

    let resp = client
        .get(app.url("/api/customers?status=bogus"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(resp).await, "invalid customer status: bogus");

    // Delete, then the record is gone.
    let resp = client
        .delete(app.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = client
        .get(app.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_delete_blocked_by_orders() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let customer = create_customer(&client, &app, "Blocked", "blocked@example.com").await;
    let id = customer["id"].as_i64().unwrap();
    create_order(&client, &app, id, 5_000).await;

    let resp = client
        .delete(app.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "customer has orders and cannot be deleted"
    );
}

#[tokio::test]
async fn test_customer_aggregates_skip_cancelled_orders() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let customer = create_customer(&client, &app, "Agg", "agg@example.com").await;
    let id = customer["id"].as_i64().unwrap();

    create_order(&client, &app, id, 10_000).await;
    let cancelled = create_order(&client, &app, id, 99_000).await;
    let resp = client
        .put(app.url(&format!("/api/orders/{}/status", cancelled["id"])))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let fetched: Value = client
        .get(app.url(&format!("/api/customers/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["orders_count"], 1);
    assert_eq!(fetched["total_spent_cents"], 10_000);
}

// =============================================================================
// Suppliers
// =============================================================================

#[tokio::test]
async fn test_supplier_crud() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let resp = client
        .post(app.url("/api/suppliers"))
        .json(&json!({
            "name": "Herrera Textiles",
            "contact_name": "Nina Herrera",
            "email": "nina@herrera.test",
            "city": "Valencia",
            "country": "ES",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let supplier: Value = resp.json().await.unwrap();
    assert_eq!(supplier["status"], "active");
    let id = supplier["id"].as_i64().unwrap();

    // Duplicate email refused.
    let resp = client
        .post(app.url("/api/suppliers"))
        .json(&json!({ "name": "Copy", "email": "nina@herrera.test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Update and filter.
    let resp = client
        .put(app.url(&format!("/api/suppliers/{id}")))
        .json(&json!({
            "name": "Herrera Textiles",
            "contact_name": "Nina Herrera",
            "email": "nina@herrera.test",
            "city": "Valencia",
            "country": "ES",
            "status": "inactive",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let inactive: Vec<Value> = client
        .get(app.url("/api/suppliers?status=inactive"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);

    let resp = client
        .delete(app.url(&format!("/api/suppliers/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_flow() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let customer = create_customer(&client, &app, "Order Corp", "orders@example.com").await;
    let customer_id = customer["id"].as_i64().unwrap();

    // Bad payloads.
    let resp = client
        .post(app.url("/api/orders"))
        .json(&json!({ "customer_id": customer_id, "total_cents": 100, "items_count": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let resp = client
        .post(app.url("/api/orders"))
        .json(&json!({ "customer_id": 9_999, "total_cents": 100, "items_count": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(resp).await, "unknown customer");

    // Numbers are assigned sequentially from ORD-1001.
    let first = create_order(&client, &app, customer_id, 12_500).await;
    assert_eq!(first["order_number"], "ORD-1001");
    assert_eq!(first["status"], "pending");
    assert_eq!(first["customer_name"], "Order Corp");
    let second = create_order(&client, &app, customer_id, 7_000).await;
    assert_eq!(second["order_number"], "ORD-1002");

    // Walk a normal lifecycle.
    let id = first["id"].as_i64().unwrap();
    for status in ["processing", "shipped", "delivered"] {
        let resp = client
            .put(app.url(&format!("/api/orders/{id}/status")))
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "failed moving to {status}");
    }

    // Terminal orders refuse further movement.
    let resp = client
        .put(app.url(&format!("/api/orders/{id}/status")))
        .json(&json!({ "status": "pending" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "order is delivered and cannot change status"
    );

    // Unknown status string.
    let resp = client
        .put(app.url(&format!("/api/orders/{}/status", second["id"])))
        .json(&json!({ "status": "teleported" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Search by number.
    let found: Vec<Value> = client
        .get(app.url("/api/orders?q=1002"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["order_number"], "ORD-1002");

    let resp = client.get(app.url("/api/orders/424242")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Inventory
// =============================================================================

#[tokio::test]
async fn test_inventory_crud_and_validation() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let product = create_product(&client, &app, "SKU-PC-01", 40, 5).await;
    assert_eq!(product["stock_status"], "in_stock");
    let id = product["id"].as_i64().unwrap();

    // Duplicate SKU.
    let resp = client
        .post(app.url("/api/inventory"))
        .json(&json!({
            "name": "Another Coat",
            "sku": "SKU-PC-01",
            "price_cents": 100,
            "stock": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "a product with this SKU already exists"
    );

    // Bad fields.
    for payload in [
        json!({ "name": "X", "sku": "  ", "price_cents": 100, "stock": 1 }),
        json!({ "name": "X", "sku": "SKU-2", "price_cents": -5, "stock": 1 }),
        json!({ "name": "X", "sku": "SKU-2", "price_cents": 100, "stock": -1 }),
        json!({ "name": "X", "sku": "SKU-2", "price_cents": 100, "stock": 1, "supplier_id": 777 }),
    ] {
        let resp = client
            .post(app.url("/api/inventory"))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(
            resp.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload should be refused: {payload}"
        );
    }

    // Update cannot move stock.
    let resp = client
        .put(app.url(&format!("/api/inventory/{id}")))
        .json(&json!({
            "name": "Wool Peacoat",
            "sku": "SKU-PC-01",
            "category": "Outerwear",
            "price_cents": 20_900,
            "low_stock_threshold": 8,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["price_cents"], 20_900);
    assert_eq!(updated["stock"], 40);

    // Stock status filter.
    let in_stock: Vec<Value> = client
        .get(app.url("/api/inventory?status=in_stock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(in_stock.len(), 1);
    let low: Vec<Value> = client
        .get(app.url("/api/inventory?status=low_stock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(low.is_empty());
}

#[tokio::test]
async fn test_stock_adjustments_raise_notifications_on_crossing() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let product = create_product(&client, &app, "SKU-LOW-01", 10, 5).await;
    let id = product["id"].as_i64().unwrap();

    // Crossing in_stock -> low_stock raises a warning notification.
    let resp = client
        .post(app.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({ "delta": -7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let adjusted: Value = resp.json().await.unwrap();
    assert_eq!(adjusted["stock"], 3);
    assert_eq!(adjusted["stock_status"], "low_stock");

    let count: Value = client
        .get(app.url("/api/notifications/unread-count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 1);

    // Further movement inside the low band stays quiet.
    let resp = client
        .post(app.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({ "delta": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let count: Value = client
        .get(app.url("/api/notifications/unread-count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 1);

    // Going below zero is refused and leaves stock unchanged.
    let resp = client
        .post(app.url(&format!("/api/inventory/{id}/adjust")))
        .json(&json!({ "delta": -10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        error_message(resp).await,
        "stock cannot go below zero (have 2, adjustment -10)"
    );

    // Restock, then empty it in one move: in_stock -> out_of_stock.
    for delta in [20, -22] {
        let resp = client
            .post(app.url(&format!("/api/inventory/{id}/adjust")))
            .json(&json!({ "delta": delta }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let notifications: Vec<Value> = client
        .get(app.url("/api/notifications?unread=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0]["severity"], "critical");
    assert!(
        notifications[0]["title"]
            .as_str()
            .unwrap()
            .starts_with("Out of stock:")
    );
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_endpoints() {
    let app = spawn_app().await;
    let client = app.admin().await;

    // Produce two notifications via stock crossings.
    let a = create_product(&client, &app, "SKU-N-01", 6, 5).await;
    let b = create_product(&client, &app, "SKU-N-02", 6, 5).await;
    for product in [&a, &b] {
        let resp = client
            .post(app.url(&format!("/api/inventory/{}/adjust", product["id"])))
            .json(&json!({ "delta": -2 }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let all: Vec<Value> = client
        .get(app.url("/api/notifications"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    let first_id = all[0]["id"].as_i64().unwrap();

    // Mark one read, twice; second call is a no-op.
    for _ in 0..2 {
        let resp = client
            .post(app.url(&format!("/api/notifications/{first_id}/read")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    let unread: Vec<Value> = client
        .get(app.url("/api/notifications?unread=true"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);

    let resp = client
        .get(app.url("/api/notifications?unread=sideways"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let updated: Value = client
        .post(app.url("/api/notifications/read-all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["updated"], 1);

    let count: Value = client
        .get(app.url("/api/notifications/unread-count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 0);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let app = spawn_app().await;
    let client = app.admin().await;

    let customer = create_customer(&client, &app, "Stats Co", "stats@example.com").await;
    let customer_id = customer["id"].as_i64().unwrap();
    create_order(&client, &app, customer_id, 10_000).await;
    let cancelled = create_order(&client, &app, customer_id, 50_000).await;
    client
        .put(app.url(&format!("/api/orders/{}/status", cancelled["id"])))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .unwrap();
    create_product(&client, &app, "SKU-S-01", 2, 5).await;
    create_product(&client, &app, "SKU-S-02", 0, 5).await;

    let stats: Value = client
        .get(app.url("/api/dashboard/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["customers_total"], 1);
    assert_eq!(stats["customers_active"], 1);
    assert_eq!(stats["orders_total"], 2);
    assert_eq!(stats["orders_pending"], 1);
    assert_eq!(stats["revenue_cents"], 10_000);
    assert_eq!(stats["low_stock_count"], 1);
    assert_eq!(stats["out_of_stock_count"], 1);

    // The aggregate is served from cache for a short window; writes made
    // after the first read do not appear immediately.
    create_customer(&client, &app, "Late Co", "late@example.com").await;
    let cached: Value = client
        .get(app.url("/api/dashboard/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cached["customers_total"], 1);
}

// =============================================================================
// CSV export
// =============================================================================

#[tokio::test]
async fn test_csv_export() {
    let app = spawn_app().await;
    let client = app.admin().await;

    create_customer(&client, &app, "Zoe Quinn", "zoe@example.com").await;
    create_product(&client, &app, "SKU-PC-01", 4, 5).await;

    let resp = client
        .get(app.url("/api/export/customers.csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"customers_export_"));
    let body = resp.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,name,company,email,phone,status,created_at"
    );
    assert!(lines.next().unwrap().contains("Zoe Quinn"));

    let resp = client
        .get(app.url("/api/export/inventory.csv"))
        .send()
        .await
        .unwrap();
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("sku,name,category,price_usd,stock,stock_status"));
    assert!(body.contains("SKU-PC-01,Wool Peacoat,Outerwear,189.00,4,Low Stock"));

    let resp = client
        .get(app.url("/api/export/orders.csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Settings
// =============================================================================

#[tokio::test]
async fn test_settings_fold_and_update() {
    let app = spawn_app().await;
    app.seed_staff().await;
    let admin = app.admin().await;
    let staff = app.login(STAFF_EMAIL, STAFF_PASSWORD).await;

    // Reads return the full key set even with nothing stored.
    let store: Vec<Value> = staff
        .get(app.url("/api/settings/store"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(store.len(), 9);
    assert_eq!(store[0]["key"], "store_name");
    assert_eq!(store[0]["value"], "CloudCRM Pro");

    // Writes are admin only.
    let resp = staff
        .post(app.url("/api/settings/store"))
        .json(&json!([{ "key": "store_name", "value": "Nope" }]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_message(resp).await, "admin access required");

    // Valid write folds back the full set.
    let resp = admin
        .post(app.url("/api/settings/store"))
        .json(&json!([
            { "key": "store_name", "value": "Quinn Wholesale" },
            { "key": "timezone", "value": "Europe/Madrid" },
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let folded: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(folded.len(), 9);
    assert_eq!(folded[0]["value"], "Quinn Wholesale");

    // And persists for later readers.
    let reread: Vec<Value> = staff
        .get(app.url("/api/settings/store"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reread[0]["value"], "Quinn Wholesale");

    // Unknown key and wrong type are refused.
    let resp = admin
        .post(app.url("/api/settings/store"))
        .json(&json!([{ "key": "font_size", "value": 12 }]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_message(resp).await, "unknown store setting 'font_size'");
    let resp = admin
        .post(app.url("/api/settings/payment"))
        .json(&json!([{ "key": "tax_rate_bps", "value": "seven" }]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_message(resp).await.contains("must be a"));

    // Unknown area is an unknown URL.
    let resp = admin
        .get(app.url("/api/settings/llamas"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The write landed in the audit log.
    let events: Vec<Value> = admin
        .get(app.url("/api/security/events?kind=settings_changed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!events.is_empty());
    assert!(events[0]["detail"].as_str().unwrap().contains("store"));
}

// =============================================================================
// Security
// =============================================================================

#[tokio::test]
async fn test_security_pages_are_admin_only() {
    let app = spawn_app().await;
    app.seed_staff().await;
    let staff = app.login(STAFF_EMAIL, STAFF_PASSWORD).await;

    for path in [
        "/api/security/events",
        "/api/security/sessions",
        "/api/users",
        "/api/backups",
    ] {
        let resp = staff.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "expected 403 for {path}");
        assert_eq!(error_message(resp).await, "admin access required");
    }
}

#[tokio::test]
async fn test_session_listing_and_revocation() {
    let app = spawn_app().await;
    let first = app.admin().await;
    let second = app.admin().await;

    let sessions: Vec<Value> = second
        .get(app.url("/api/security/sessions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sessions.len(), 2);
    let current: Vec<bool> = sessions
        .iter()
        .map(|s| s["current"].as_bool().unwrap())
        .collect();
    assert_eq!(current.iter().filter(|c| **c).count(), 1);

    // Revoke the other session; its holder is logged out mid-flight.
    let other_id = sessions
        .iter()
        .find(|s| !s["current"].as_bool().unwrap())
        .map(|s| s["id"].as_str().unwrap().to_string())
        .unwrap();
    let resp = second
        .delete(app.url(&format!("/api/security/sessions/{other_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = first.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Revoking the same session again is a 404.
    let resp = second
        .delete(app.url(&format!("/api/security/sessions/{other_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let events: Vec<Value> = second
        .get(app.url("/api/security/events?kind=session_revoked"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_user_management() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    // Weak passwords and unknown roles are refused.
    let resp = admin
        .post(app.url("/api/users"))
        .json(&json!({
            "name": "Weak",
            "email": "weak@cloudcrm.test",
            "role": "staff",
            "password": "password123",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let resp = admin
        .post(app.url("/api/users"))
        .json(&json!({
            "name": "Rogue",
            "email": "rogue@cloudcrm.test",
            "role": "wizard",
            "password": STAFF_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Create a staff operator who can then log in.
    let resp = admin
        .post(app.url("/api/users"))
        .json(&json!({
            "name": "Sam Staff",
            "email": STAFF_EMAIL,
            "role": "staff",
            "password": STAFF_PASSWORD,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let staff_id = created["id"].as_i64().unwrap();
    assert!(created.get("password_hash").is_none());

    let users: Vec<Value> = admin
        .get(app.url("/api/users"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.len(), 2);

    let staff = app.login(STAFF_EMAIL, STAFF_PASSWORD).await;

    // Suspension takes effect on the suspended operator's next request.
    let resp = admin
        .put(app.url(&format!("/api/users/{staff_id}/status")))
        .json(&json!({ "status": "suspended" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = staff.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A suspended operator cannot log back in either.
    let resp = TestApp::client()
        .post(app.url("/api/auth/login"))
        .json(&json!({ "email": STAFF_EMAIL, "password": STAFF_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Reactivation restores access.
    let resp = admin
        .put(app.url(&format!("/api/users/{staff_id}/status")))
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    app.login(STAFF_EMAIL, STAFF_PASSWORD).await;

    // Admins cannot suspend themselves.
    let me: Value = admin
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let resp = admin
        .put(app.url(&format!("/api/users/{}/status", me["id"])))
        .json(&json!({ "status": "suspended" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_message(resp).await, "cannot suspend your own account");
}

// =============================================================================
// Backups
// =============================================================================

#[tokio::test]
async fn test_backup_and_restore() {
    let app = spawn_app().await;
    let admin = app.admin().await;

    let customer = create_customer(&admin, &app, "Kept Co", "kept@example.com").await;
    create_order(&admin, &app, customer["id"].as_i64().unwrap(), 10_000).await;
    create_product(&admin, &app, "SKU-B-01", 12, 5).await;

    let resp = admin.post(app.url("/api/backups")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let backup: Value = resp.json().await.unwrap();
    assert_eq!(backup["customers_count"], 1);
    assert_eq!(backup["orders_count"], 1);
    assert_eq!(backup["products_count"], 1);
    let backup_id = backup["id"].as_str().unwrap().to_string();

    let backups: Vec<Value> = admin
        .get(app.url("/api/backups"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(backups.len(), 1);

    // Drift from the snapshot.
    create_customer(&admin, &app, "Drift Co", "drift@example.com").await;
    let resp = admin
        .post(app.url(&format!(
            "/api/inventory/{}/adjust",
            create_product(&admin, &app, "SKU-B-02", 9, 5).await["id"]
        )))
        .json(&json!({ "delta": -3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Restore rolls the business tables back.
    let resp = admin
        .post(app.url(&format!("/api/backups/{backup_id}/restore")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = resp.json().await.unwrap();
    assert_eq!(summary["customers"], 1);
    assert_eq!(summary["orders"], 1);
    assert_eq!(summary["products"], 1);

    let customers: Vec<Value> = admin
        .get(app.url("/api/customers"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["email"], "kept@example.com");

    // Restoring an unknown backup is a 404.
    let resp = admin
        .post(app.url(&format!(
            "/api/backups/{}/restore",
            uuid::Uuid::new_v4()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Audit events and the broadcast notification are in place.
    for kind in ["backup_created", "backup_restored"] {
        let events: Vec<Value> = admin
            .get(app.url(&format!("/api/security/events?kind={kind}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(events.len(), 1, "missing {kind} event");
    }
    let notifications: Vec<Value> = admin
        .get(app.url("/api/notifications"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n["title"] == "Backup restored")
    );
}
