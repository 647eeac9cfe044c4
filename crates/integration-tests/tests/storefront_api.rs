//! End-to-end tests against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database with the demo seed loaded
//! - The storefront server running (cargo run -p brandbazaar-storefront)
//!
//! Run with: cargo test -p brandbazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use brandbazaar_integration_tests::{
    body, register_customer, session_client, storefront_url, test_address,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::task::JoinSet;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = session_client()
        .get(format!("{}/health/ready", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_register_then_me() {
    let client = session_client();
    let user = register_customer(&client).await;
    assert_eq!(user["role"], "customer");
    assert_eq!(user["level"]["level"], "hobbyist");

    let resp = client
        .get(format!("{}/api/auth/me", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["id"], user["id"]);

    let resp = client
        .post(format!("{}/api/auth/logout", storefront_url()))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{}/api/auth/me", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seed data"]
async fn test_catalog_lists_only_public_products() {
    let client = session_client();
    let resp = client
        .get(format!("{}/api/products?perPage=100", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body(resp).await;
    let slugs: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["slug"].as_str())
        .collect();
    assert!(slugs.contains(&"boxy-pocket-tee"));
    // Hidden in the seed file.
    assert!(!slugs.contains(&"archive-varsity-jacket"));

    let resp = client
        .get(format!("{}/api/products/archive-varsity-jacket", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seed data"]
async fn test_cart_add_and_remove() {
    let client = session_client();
    let resp = client
        .get(format!("{}/api/products/six-panel-cap", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let product = body(resp).await;
    let variant_id = product["variants"][0]["id"].clone();

    let resp = client
        .post(format!("{}/api/cart/items", storefront_url()))
        .json(&json!({ "variantId": variant_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    let cart = body(resp).await;
    assert_eq!(cart["itemCount"], 2);

    let resp = client
        .delete(format!(
            "{}/api/cart/items/{}",
            storefront_url(),
            variant_id.as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(body(resp).await["itemCount"], 0);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_with_empty_cart_is_rejected() {
    let client = session_client();
    register_customer(&client).await;

    let resp = client
        .post(format!("{}/api/checkout", storefront_url()))
        .json(&json!({
            "shippingAddress": {
                "fullName": "Test Customer",
                "line1": "1 Main St",
                "city": "Springfield",
                "region": "IL",
                "postalCode": "12345",
                "country": "US"
            }
        }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

/// Fire the same create request several times at once and return the
/// resulting list.
async fn create_concurrently(client: &reqwest::Client, path: &str, payload: Value) -> Vec<Value> {
    let mut requests = JoinSet::new();
    for _ in 0..6 {
        let request = client
            .post(format!("{}{path}", storefront_url()))
            .json(&payload);
        requests.spawn(async move { request.send().await.unwrap().status() });
    }
    while let Some(status) = requests.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::CREATED);
    }

    let resp = client
        .get(format!("{}{path}", storefront_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body(resp).await.as_array().unwrap().clone()
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_concurrent_default_addresses_keep_one_default() {
    let client = session_client();
    register_customer(&client).await;

    let mut payload = test_address();
    payload["isDefault"] = json!(true);
    let addresses = create_concurrently(&client, "/api/account/addresses", payload).await;

    assert_eq!(addresses.len(), 6);
    let defaults = addresses.iter().filter(|a| a["isDefault"] == true).count();
    assert_eq!(defaults, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_concurrent_first_cards_keep_one_default() {
    let client = session_client();
    register_customer(&client).await;

    let payload = json!({
        "brand": "visa",
        "last4": "4242",
        "expMonth": 12,
        "expYear": 2035,
        "holderName": "Test Customer"
    });
    let methods = create_concurrently(&client, "/api/account/payment-methods", payload).await;

    assert_eq!(methods.len(), 6);
    let defaults = methods.iter().filter(|m| m["isDefault"] == true).count();
    assert_eq!(defaults, 1);
}
