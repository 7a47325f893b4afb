//! End-to-end tests for the cart and the checkout workflow.
//!
//! These tests require a running server, a migrated database, and a
//! pre-provisioned admin account (see the crate docs).
//! Run with: cargo test -p farm-village-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use farm_village_integration_tests::{
    admin_token, base_url, client, fresh_account, verified_listing,
};

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_cart_add_merges_lines() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, seller) = fresh_account(&client, "seller", "seller").await;
    let (_, buyer) = fresh_account(&client, "buyer", "buyer").await;

    let product_id = verified_listing(&client, &seller, &admin, "Merge Carrots", "2.00", 20).await;

    for quantity in [3, 2] {
        let resp = client
            .post(format!("{}/cart", base_url()))
            .bearer_auth(&buyer)
            .json(&json!({"product_id": product_id, "quantity": quantity}))
            .send()
            .await
            .expect("cart add failed");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client
        .get(format!("{}/cart", base_url()))
        .bearer_auth(&buyer)
        .send()
        .await
        .expect("cart get failed");

    let items: Vec<Value> = resp.json().await.expect("cart not JSON");
    let line = items
        .iter()
        .find(|i| i["product_id"].as_i64() == Some(product_id))
        .expect("cart line missing");

    // 3 + 2 must merge into a single line of 5
    assert_eq!(line["quantity"], 5);
    assert_eq!(
        items
            .iter()
            .filter(|i| i["product_id"].as_i64() == Some(product_id))
            .count(),
        1
    );
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_cart_rejects_more_than_stock() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, seller) = fresh_account(&client, "seller", "seller").await;
    let (_, buyer) = fresh_account(&client, "buyer", "buyer").await;

    let product_id = verified_listing(&client, &seller, &admin, "Scarce Beans", "3.00", 4).await;

    let resp = client
        .post(format!("{}/cart", base_url()))
        .bearer_auth(&buyer)
        .json(&json!({"product_id": product_id, "quantity": 5}))
        .send()
        .await
        .expect("cart add failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_checkout_decrements_stock_and_clears_cart() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, seller) = fresh_account(&client, "seller", "seller").await;
    let (_, buyer) = fresh_account(&client, "buyer", "buyer").await;

    let product_id = verified_listing(&client, &seller, &admin, "Order Apples", "1.50", 10).await;

    let resp = client
        .post(format!("{}/cart", base_url()))
        .bearer_auth(&buyer)
        .json(&json!({"product_id": product_id, "quantity": 4}))
        .send()
        .await
        .expect("cart add failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&buyer)
        .json(&json!({
            "lines": [{"product_id": product_id, "quantity": 4}],
            "delivery_address": "Village Road 1",
            "payment_method": "cash_on_delivery",
        }))
        .send()
        .await
        .expect("checkout failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed: Value = resp.json().await.expect("order not JSON");
    // 4 x 1.50, priced server-side
    assert_eq!(placed["total"].as_str(), Some("6.00"));

    // Stock went from 10 to 6
    let resp = client
        .get(format!("{}/products/{product_id}", base_url()))
        .send()
        .await
        .expect("product get failed");
    let product: Value = resp.json().await.expect("product not JSON");
    assert_eq!(product["quantity"], 6);

    // The fulfilled cart line is gone
    let resp = client
        .get(format!("{}/cart", base_url()))
        .bearer_auth(&buyer)
        .send()
        .await
        .expect("cart get failed");
    let items: Vec<Value> = resp.json().await.expect("cart not JSON");
    assert!(
        !items
            .iter()
            .any(|i| i["product_id"].as_i64() == Some(product_id))
    );

    // And the order shows up in the buyer's history
    let resp = client
        .get(format!("{}/orders", base_url()))
        .bearer_auth(&buyer)
        .send()
        .await
        .expect("orders get failed");
    let orders: Vec<Value> = resp.json().await.expect("orders not JSON");
    assert!(
        orders
            .iter()
            .any(|o| o["id"].as_i64() == placed["order_id"].as_i64())
    );
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_checkout_insufficient_stock_rolls_back() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, seller) = fresh_account(&client, "seller", "seller").await;
    let (_, buyer) = fresh_account(&client, "buyer", "buyer").await;

    let plenty = verified_listing(&client, &seller, &admin, "Plenty Potatoes", "2.00", 50).await;
    let scarce = verified_listing(&client, &seller, &admin, "Scarce Saffron", "9.00", 1).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&buyer)
        .json(&json!({
            "lines": [
                {"product_id": plenty, "quantity": 5},
                {"product_id": scarce, "quantity": 2},
            ],
            "delivery_address": "Village Road 1",
            "payment_method": "cash_on_delivery",
        }))
        .send()
        .await
        .expect("checkout failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("body not JSON");
    assert_eq!(body["error"], "insufficient_stock");
    assert_eq!(body["product_id"].as_i64(), Some(scarce));

    // The passing line must not have been decremented
    let resp = client
        .get(format!("{}/products/{plenty}", base_url()))
        .send()
        .await
        .expect("product get failed");
    let product: Value = resp.json().await.expect("product not JSON");
    assert_eq!(product["quantity"], 50);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_racing_checkouts_for_last_unit() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, seller) = fresh_account(&client, "seller", "seller").await;
    let (_, buyer_a) = fresh_account(&client, "buyer", "buyer").await;
    let (_, buyer_b) = fresh_account(&client, "buyer", "buyer").await;

    let product_id = verified_listing(&client, &seller, &admin, "Last Melon", "7.00", 1).await;

    let order_body = json!({
        "lines": [{"product_id": product_id, "quantity": 1}],
        "delivery_address": "Village Road 1",
        "payment_method": "cash_on_delivery",
    });

    let (a, b) = tokio::join!(
        client
            .post(format!("{}/orders", base_url()))
            .bearer_auth(&buyer_a)
            .json(&order_body)
            .send(),
        client
            .post(format!("{}/orders", base_url()))
            .bearer_auth(&buyer_b)
            .json(&order_body)
            .send(),
    );

    let statuses = [
        a.expect("checkout A failed").status(),
        b.expect("checkout B failed").status(),
    ];

    // Exactly one buyer wins the last unit
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CREATED)
            .count(),
        1,
        "exactly one racing checkout should succeed, got {statuses:?}"
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count(),
        1,
        "the losing checkout should see insufficient stock, got {statuses:?}"
    );

    // Final stock is zero, never negative
    let resp = client
        .get(format!("{}/products/{product_id}", base_url()))
        .send()
        .await
        .expect("product get failed");
    let product: Value = resp.json().await.expect("product not JSON");
    assert_eq!(product["quantity"], 0);
}
