//! End-to-end tests against a running back office.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The admin server running (cargo run -p brandbazaar-admin)
//! - An admin account (bb-cli admin create) whose credentials are in
//!   `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`
//!
//! Run with: cargo test -p brandbazaar-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use brandbazaar_integration_tests::{admin_client, admin_url, body, session_client};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_product(client: &reqwest::Client) -> Value {
    let tag = Uuid::new_v4().simple().to_string();
    let resp = client
        .post(format!("{}/api/admin/products", admin_url()))
        .json(&json!({
            "name": format!("Test Product {tag}"),
            "brand": "Test Brand",
            "category": "Tests",
            "basePrice": "19.99",
            "isPublic": false,
            "variants": [
                { "sku": format!("TEST-{tag}-M"), "size": "M", "color": "Black", "stock": 3 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body(resp).await
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_api_requires_admin_session() {
    let resp = session_client()
        .get(format!("{}/api/admin/dashboard", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login_rejects_wrong_password() {
    let email = std::env::var("TEST_ADMIN_EMAIL").unwrap();
    let resp = session_client()
        .post(format!("{}/api/admin/auth/login", admin_url()))
        .json(&json!({ "email": email, "password": "definitely not it" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_dashboard() {
    let client = admin_client().await;
    let resp = client
        .get(format!("{}/api/admin/dashboard", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body(resp).await;
    assert!(stats["userCount"].as_i64().unwrap() >= 1);
    assert!(stats["ordersByStatus"].is_array());
    assert!(stats["lowStockVariants"].is_array());
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_product_lifecycle() {
    let client = admin_client().await;
    let product = create_product(&client).await;
    let id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["isPublic"], false);
    assert_eq!(product["variants"].as_array().unwrap().len(), 1);

    let resp = client
        .post(format!("{}/api/admin/products/{id}/visibility", admin_url()))
        .json(&json!({ "isPublic": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["isPublic"], true);

    let resp = client
        .delete(format!("{}/api/admin/products/{id}", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(format!("{}/api/admin/products?visibility=deleted&q={id}", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{}/api/admin/products/{id}/restore", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body(resp).await["deletedAt"].is_null());
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_duplicate_sku_is_conflict() {
    let client = admin_client().await;
    let product = create_product(&client).await;
    let id = product["id"].as_str().unwrap();
    let sku = product["variants"][0]["sku"].clone();

    let resp = client
        .post(format!("{}/api/admin/products/{id}/variants", admin_url()))
        .json(&json!({ "sku": sku, "size": "L", "color": "Black", "stock": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_raffle_draft_cannot_be_drawn() {
    let client = admin_client().await;
    let product = create_product(&client).await;

    let resp = client
        .post(format!("{}/api/admin/raffles", admin_url()))
        .json(&json!({
            "title": "Test Raffle",
            "description": "Integration test raffle",
            "productId": product["id"],
            "entryPrice": "5.00",
            "xpReward": 10,
            "minLevel": "hobbyist",
            "startsAt": "2030-01-01T00:00:00Z",
            "endsAt": "2030-01-08T00:00:00Z",
            "purchaseWindowHours": 24
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let raffle = body(resp).await;
    assert_eq!(raffle["status"], "draft");
    let id = raffle["id"].as_str().unwrap();

    let resp = client
        .post(format!("{}/api/admin/raffles/{id}/draw", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(format!("{}/api/admin/raffles/{id}/cancel", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body(resp).await["status"], "cancelled");
}
