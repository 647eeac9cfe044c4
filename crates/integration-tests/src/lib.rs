//! Integration tests for BrandBazaar.
//!
//! # Running Tests
//!
//! The tests under `tests/` come in two kinds:
//!
//! - Rule tests (`raffle_lifecycle`, `checkout_pricing`) drive the shared
//!   rules in `brandbazaar-core` through whole flows. They always run.
//! - API tests (`storefront_api`, `admin_api`, `raffle_draw_api`,
//!   `checkout_api`) talk to running servers and are `#[ignore]`d by default:
//!
//! ```bash
//! bb-cli migrate
//! bb-cli seed --file crates/cli/seed/demo.yaml
//! bb-cli admin create -e admin@example.com -n Admin -p 'admin password'
//! cargo run -p brandbazaar-storefront &
//! cargo run -p brandbazaar-admin &
//! STOREFRONT_URL=http://localhost:3000 ADMIN_URL=http://localhost:3001 \
//! TEST_ADMIN_EMAIL=admin@example.com TEST_ADMIN_PASSWORD='admin password' \
//!     cargo test -p brandbazaar-integration-tests -- --ignored
//! ```

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API.
#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps cookies, so a login sticks for later requests.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A throwaway address that won't collide with earlier runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}+{}@test.brandbazaar.dev", uuid::Uuid::new_v4().simple())
}

/// Register a fresh customer on the storefront; the client is signed in
/// afterwards.
///
/// The auth endpoints are rate limited per IP, so a refused attempt waits for
/// the limiter to refill and tries again.
///
/// # Panics
///
/// Panics if the request fails or registration is refused.
#[allow(clippy::expect_used)]
pub async fn register_customer(client: &Client) -> Value {
    let payload = json!({
        "email": unique_email("customer"),
        "password": "correct horse battery",
        "displayName": "Test Customer",
    });
    for _ in 0..30 {
        let response = client
            .post(format!("{}/api/auth/register", storefront_url()))
            .json(&payload)
            .send()
            .await
            .expect("register request failed");
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tokio::time::sleep(Duration::from_secs(6)).await;
            continue;
        }
        assert_eq!(response.status(), StatusCode::CREATED);
        return response.json().await.expect("register response is JSON");
    }
    panic!("registration stayed rate limited");
}

/// Sign in to the admin API with `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics if the variables are missing or the login is refused.
#[allow(clippy::expect_used)]
pub async fn admin_client() -> Client {
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD not set");

    let client = session_client();
    let response = client
        .post(format!("{}/api/admin/auth/login", admin_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("admin login request failed");
    assert_eq!(response.status(), StatusCode::OK, "admin login refused");
    client
}

/// Read a JSON body, failing the test with the status if it isn't JSON.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn body(response: Response) -> Value {
    let status = response.status();
    response
        .json()
        .await
        .unwrap_or_else(|e| panic!("{status}: body is not JSON: {e}"))
}

/// A listed product with one variant holding `stock` units.
///
/// # Panics
///
/// Panics if the back office refuses the product.
pub async fn create_listed_product(admin: &Client, stock: i32) -> Value {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let response = admin
        .post(format!("{}/api/admin/products", admin_url()))
        .json(&json!({
            "name": format!("Test Product {tag}"),
            "brand": "Test Brand",
            "category": "Tests",
            "basePrice": "40.00",
            "isPublic": true,
            "variants": [
                { "sku": format!("TEST-{tag}-M"), "size": "M", "color": "Black", "stock": stock }
            ]
        }))
        .send()
        .await
        .unwrap_or_else(|e| panic!("create product request failed: {e}"));
    assert_eq!(response.status(), StatusCode::CREATED);
    body(response).await
}

/// An open raffle for `product` that is accepting entries right now.
///
/// # Panics
///
/// Panics if the back office refuses to create or open the raffle.
pub async fn create_open_raffle(admin: &Client, product: &Value, max_entries: Option<i32>) -> Value {
    let now = Utc::now();
    let response = admin
        .post(format!("{}/api/admin/raffles", admin_url()))
        .json(&json!({
            "title": "Integration Raffle",
            "productId": product["id"],
            "entryPrice": "25.00",
            "xpReward": 10,
            "minLevel": "hobbyist",
            "maxEntries": max_entries,
            "startsAt": now - chrono::Duration::hours(1),
            "endsAt": now + chrono::Duration::days(1),
            "purchaseWindowHours": 24
        }))
        .send()
        .await
        .unwrap_or_else(|e| panic!("create raffle request failed: {e}"));
    assert_eq!(response.status(), StatusCode::CREATED);
    let raffle = body(response).await;
    let id = raffle["id"].as_str().unwrap_or_default().to_string();

    let response = admin
        .post(format!("{}/api/admin/raffles/{id}/open", admin_url()))
        .send()
        .await
        .unwrap_or_else(|e| panic!("open raffle request failed: {e}"));
    assert_eq!(response.status(), StatusCode::OK);
    body(response).await
}

/// A shipping address that passes validation.
#[must_use]
pub fn test_address() -> Value {
    json!({
        "fullName": "Test Customer",
        "line1": "1 Test Street",
        "city": "Testville",
        "postalCode": "12345",
        "country": "US"
    })
}
