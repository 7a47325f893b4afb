//! End-to-end test harness for the Farm Village API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database, migrate, and seed
//! docker compose up -d postgres
//! cargo run -p farm-village-cli -- migrate
//!
//! # Start the server, then run the ignored tests
//! cargo run -p farm-village-server &
//! cargo test -p farm-village-integration-tests -- --ignored
//! ```
//!
//! Tests create their own throwaway accounts (UUID-suffixed usernames) so
//! they can run repeatedly against the same database. Admin-only tests log
//! in with `FARM_VILLAGE_TEST_ADMIN_USERNAME` / `_PASSWORD`, which must name
//! an admin created via `farm-village-cli admin create`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("FARM_VILLAGE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Plain HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A username no other test run has used.
#[must_use]
pub fn unique_username(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &suffix[..12])
}

/// Register an account, panicking unless the server says 201.
pub async fn register(client: &Client, username: &str, password: &str, role: &str) -> Value {
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "username": username,
            "password": password,
            "role": role,
            "display_name": format!("Test {role}"),
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status(), 201, "register should succeed");
    resp.json().await.expect("register response not JSON")
}

/// Login and return the bearer token.
pub async fn login(client: &Client, username: &str, password: &str, role: &str) -> String {
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": username,
            "password": password,
            "role": role,
        }))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status(), 200, "login should succeed");

    let body: Value = resp.json().await.expect("login response not JSON");
    body["token"].as_str().expect("token missing").to_owned()
}

/// Register a fresh account and log it in, returning (username, token).
pub async fn fresh_account(client: &Client, prefix: &str, role: &str) -> (String, String) {
    let username = unique_username(prefix);
    let password = "integration-pass";

    register(client, &username, password, role).await;
    let token = login(client, &username, password, role).await;

    (username, token)
}

/// Token for the pre-provisioned test admin.
pub async fn admin_token(client: &Client) -> String {
    let username = std::env::var("FARM_VILLAGE_TEST_ADMIN_USERNAME")
        .unwrap_or_else(|_| "marketmaster".to_owned());
    let password = std::env::var("FARM_VILLAGE_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "integration-pass".to_owned());

    login(client, &username, &password, "admin").await
}

/// Create a listing as the seller and have the admin verify it.
///
/// Returns the product id, ready to be bought.
pub async fn verified_listing(
    client: &Client,
    seller_token: &str,
    admin_token: &str,
    name: &str,
    unit_price: &str,
    quantity: i32,
) -> i64 {
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(seller_token)
        .json(&json!({
            "name": name,
            "description": "integration test listing",
            "category": "vegetables",
            "unit_price": unit_price,
            "quantity": quantity,
        }))
        .send()
        .await
        .expect("create listing failed");

    assert_eq!(resp.status(), 201, "listing create should succeed");
    let product: Value = resp.json().await.expect("listing response not JSON");
    let id = product["id"].as_i64().expect("product id missing");

    let resp = client
        .post(format!("{}/admin/products/{id}/verify", base_url()))
        .bearer_auth(admin_token)
        .send()
        .await
        .expect("verify listing failed");

    assert_eq!(resp.status(), 200, "listing verify should succeed");

    id
}
