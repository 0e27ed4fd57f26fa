//! Integration tests for CloudCRM Pro.
//!
//! # Running Tests
//!
//! ```bash
//! # Database-level workflow tests (self-contained, in-memory SQLite)
//! cargo test -p cloudcrm-integration-tests
//!
//! # Live smoke tests against a running server
//! cargo run -p cloudcrm-server &
//! CLOUDCRM_BASE_URL=http://localhost:8080 \
//! CLOUDCRM_TEST_EMAIL=admin@example.com \
//! CLOUDCRM_TEST_PASSWORD=... \
//! cargo test -p cloudcrm-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `server_workflows` - Repository and service flows over a real schema
//! - `server_live` - HTTP smoke tests against a running server (ignored by
//!   default)

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::json;

/// Base URL for the CloudCRM server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CLOUDCRM_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Operator credentials for live tests, from the environment.
#[must_use]
pub fn test_credentials() -> (String, String) {
    let email =
        std::env::var("CLOUDCRM_TEST_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let password = std::env::var("CLOUDCRM_TEST_PASSWORD").unwrap_or_default();
    (email, password)
}

/// A cookie-holding client with no session.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
pub fn anonymous_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in with the environment credentials and return a client holding the
/// session cookie.
///
/// # Panics
///
/// Panics if the server is unreachable or the credentials are refused.
pub async fn authenticated_client() -> Client {
    let client = anonymous_client();
    let (email, password) = test_credentials();

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to reach server, is it running?");
    assert!(
        resp.status().is_success(),
        "Login failed for {email}: {}",
        resp.status()
    );

    client
}
