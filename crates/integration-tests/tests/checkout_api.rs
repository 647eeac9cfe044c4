//! End-to-end checkout and cancellation against running servers.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The storefront and admin servers running
//! - Admin credentials in `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p brandbazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use brandbazaar_integration_tests::{
    admin_client, admin_url, body, create_listed_product, register_customer, session_client,
    storefront_url, test_address,
};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn add_to_cart(client: &Client, variant_id: &Value, quantity: u32) -> StatusCode {
    client
        .post(format!("{}/api/cart/items", storefront_url()))
        .json(&json!({ "variantId": variant_id, "quantity": quantity }))
        .send()
        .await
        .unwrap()
        .status()
}

async fn checkout(client: &Client) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({ "shippingAddress": test_address() }))
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, body(resp).await)
}

async fn stock(admin: &Client, product: &Value) -> i64 {
    let resp = admin
        .get(format!("{}/api/admin/products/{}", admin_url(), product["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body(resp).await["variants"][0]["stock"].as_i64().unwrap()
}

async fn xp(client: &Client) -> i64 {
    let resp = client
        .get(format!("{}/api/auth/me", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body(resp).await["level"]["xp"].as_i64().unwrap()
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_checkout_conflict_names_short_sku() {
    let admin = admin_client().await;
    let product = create_listed_product(&admin, 3).await;
    let variant = &product["variants"][0];
    let sku = variant["sku"].as_str().unwrap();

    let client = session_client();
    register_customer(&client).await;
    assert_eq!(add_to_cart(&client, &variant["id"], 2).await, StatusCode::OK);

    // Stock drops after the item went into the cart.
    let resp = admin
        .patch(format!(
            "{}/api/admin/products/{}/variants/{}",
            admin_url(),
            product["id"].as_str().unwrap(),
            variant["id"].as_str().unwrap()
        ))
        .json(&json!({ "stock": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, error) = checkout(&client).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let message = error["error"].as_str().unwrap();
    assert!(message.contains(sku), "{message}");

    // Nothing was taken and the cart is intact.
    assert_eq!(stock(&admin, &product).await, 1);
    let resp = client
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(body(resp).await["itemCount"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_cancel_restocks_and_takes_back_xp() {
    let admin = admin_client().await;
    let product = create_listed_product(&admin, 3).await;
    let variant = &product["variants"][0];

    let client = session_client();
    register_customer(&client).await;
    let xp_before = xp(&client).await;
    assert_eq!(add_to_cart(&client, &variant["id"], 2).await, StatusCode::OK);

    let (status, order) = checkout(&client).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "paid");
    assert_eq!(order["items"][0]["quantity"], 2);
    let earned = order["xpEarned"].as_i64().unwrap();
    assert!(earned > 0);
    assert_eq!(stock(&admin, &product).await, 1);
    assert_eq!(xp(&client).await, xp_before + earned);

    let resp = client
        .get(format!("{}/api/cart", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(body(resp).await["itemCount"], 0);

    let id = order["id"].as_str().unwrap();
    let resp = client
        .post(format!("{}/api/orders/{id}/cancel", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["status"], "cancelled");
    assert_eq!(stock(&admin, &product).await, 3);
    assert_eq!(xp(&client).await, xp_before);

    let resp = client
        .post(format!("{}/api/orders/{id}/cancel", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers"]
async fn test_other_customers_cannot_cancel() {
    let admin = admin_client().await;
    let product = create_listed_product(&admin, 2).await;

    let owner = session_client();
    register_customer(&owner).await;
    add_to_cart(&owner, &product["variants"][0]["id"], 1).await;
    let (status, order) = checkout(&owner).await;
    assert_eq!(status, StatusCode::CREATED);

    let stranger = session_client();
    register_customer(&stranger).await;
    let resp = stranger
        .post(format!(
            "{}/api/orders/{}/cancel",
            storefront_url(),
            order["id"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(stock(&admin, &product).await, 1);
}
