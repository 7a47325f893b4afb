//! End-to-end tests for registration, login, and the lockout policy.
//!
//! These tests require a running server and a migrated database.
//! Run with: cargo test -p farm-village-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use farm_village_integration_tests::{base_url, client, login, register, unique_username};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_register_then_login() {
    let client = client();
    let username = unique_username("buyer");

    let account = register(&client, &username, "integration-pass", "buyer").await;
    assert_eq!(account["username"], username.as_str());
    assert_eq!(account["role"], "buyer");
    // Lockout bookkeeping must never leak into responses
    assert!(account.get("failed_attempts").is_none());

    let token = login(&client, &username, "integration-pass", "buyer").await;
    assert!(!token.is_empty());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let username = unique_username("buyer");

    register(&client, &username, "integration-pass", "buyer").await;

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "username": username,
            "password": "integration-pass",
            "role": "buyer",
            "display_name": "Duplicate",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Same username under a different role is fine
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "username": username,
            "password": "integration-pass",
            "role": "seller",
            "display_name": "Same Name, Seller",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_admin_registration_is_rejected() {
    let client = client();
    let username = unique_username("wannabe-admin");

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "username": username,
            "password": "integration-pass",
            "role": "admin",
            "display_name": "Not An Admin",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("body not JSON");
    assert_eq!(body["error"], "forbidden");

    // The rejected request must not have created an account
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": username,
            "password": "integration-pass",
            "role": "admin",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_lockout_after_five_failures() {
    let client = client();
    let username = unique_username("buyer");

    register(&client, &username, "integration-pass", "buyer").await;

    // Five wrong passwords: four plain 401s, the fifth locks
    for attempt in 1..=5 {
        let resp = client
            .post(format!("{}/auth/login", base_url()))
            .json(&json!({
                "username": username,
                "password": "wrong-password",
                "role": "buyer",
            }))
            .send()
            .await
            .expect("request failed");

        if attempt < 5 {
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        } else {
            assert_eq!(resp.status(), StatusCode::LOCKED);
            let body: Value = resp.json().await.expect("body not JSON");
            assert_eq!(body["error"], "account_locked");
            assert!(body["retry_after_secs"].as_i64().expect("retry_after_secs") > 0);
        }
    }

    // The correct password is also rejected while locked
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "username": username,
            "password": "integration-pass",
            "role": "buyer",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::LOCKED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_failed_attempts_reset_on_success() {
    let client = client();
    let username = unique_username("buyer");

    register(&client, &username, "integration-pass", "buyer").await;

    // Three failures, then a success
    for _ in 0..3 {
        let resp = client
            .post(format!("{}/auth/login", base_url()))
            .json(&json!({
                "username": username,
                "password": "wrong-password",
                "role": "buyer",
            }))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    login(&client, &username, "integration-pass", "buyer").await;

    // The counter restarted: four more failures still don't lock
    for _ in 0..4 {
        let resp = client
            .post(format!("{}/auth/login", base_url()))
            .json(&json!({
                "username": username,
                "password": "wrong-password",
                "role": "buyer",
            }))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_protected_route_rejects_missing_and_garbage_tokens() {
    let client = client();

    let resp = client
        .get(format!("{}/cart", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/cart", base_url()))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
