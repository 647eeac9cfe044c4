//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness
//! GET    /health/ready                        - Readiness (database)
//!
//! # Auth (stricter rate limit)
//! POST   /api/auth/register
//! POST   /api/auth/login
//! POST   /api/auth/logout
//! GET    /api/auth/me
//!
//! # Catalog
//! GET    /api/products
//! GET    /api/products/{slug}
//! GET    /api/products/{slug}/reviews
//! POST   /api/products/{slug}/reviews         - auth
//! GET    /api/recently-viewed
//!
//! # Cart (session)
//! GET    /api/cart
//! DELETE /api/cart
//! POST   /api/cart/items
//! PATCH  /api/cart/items/{variantId}
//! DELETE /api/cart/items/{variantId}
//!
//! # Wishlist (auth)
//! GET    /api/wishlist
//! PUT    /api/wishlist/{productId}
//! DELETE /api/wishlist/{productId}
//!
//! # Orders (auth)
//! POST   /api/checkout
//! GET    /api/orders
//! GET    /api/orders/{id}
//! POST   /api/orders/{id}/cancel
//!
//! # Raffles
//! GET    /api/raffles
//! GET    /api/raffles/{id}
//! POST   /api/raffles/{id}/enter              - auth
//! POST   /api/raffles/{id}/claim              - auth
//! POST   /api/raffles/{id}/decline            - auth
//!
//! # Account (auth)
//! GET    /api/account
//! PATCH  /api/account
//! GET    /api/account/addresses
//! POST   /api/account/addresses
//! PATCH  /api/account/addresses/{id}
//! DELETE /api/account/addresses/{id}
//! GET    /api/account/payment-methods
//! POST   /api/account/payment-methods
//! DELETE /api/account/payment-methods/{id}
//! POST   /api/account/payment-methods/{id}/default
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;
pub mod raffles;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
        .route(
            "/{slug}/reviews",
            get(products::reviews).post(products::create_review),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{variant_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the raffle routes router.
pub fn raffle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(raffles::index))
        .route("/{id}", get(raffles::show))
        .route("/{id}/enter", post(raffles::enter))
        .route("/{id}/claim", post(raffles::claim))
        .route("/{id}/decline", post(raffles::decline))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile).patch(account::update_profile))
        .route(
            "/addresses",
            get(account::addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            patch(account::update_address).delete(account::delete_address),
        )
        .route(
            "/payment-methods",
            get(account::payment_methods).post(account::create_payment_method),
        )
        .route(
            "/payment-methods/{id}",
            axum::routing::delete(account::delete_payment_method),
        )
        .route(
            "/payment-methods/{id}/default",
            post(account::set_default_payment_method),
        )
}

/// Everything under `/api` except auth.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/recently-viewed", get(products::recently_viewed))
        .nest("/cart", cart_routes())
        .route("/wishlist", get(wishlist::index))
        .route(
            "/wishlist/{product_id}",
            put(wishlist::add).delete(wishlist::remove),
        )
        .route("/checkout", post(checkout::place_order))
        .nest("/orders", order_routes())
        .nest("/raffles", raffle_routes())
        .nest("/account", account_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/api", api_routes().layer(api_rate_limiter()))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
