//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                   - Liveness
//! GET    /health/ready                             - Readiness (database)
//!
//! # Auth (rate limited; role admin only)
//! POST   /api/admin/auth/login
//! POST   /api/admin/auth/logout
//! GET    /api/admin/auth/me
//!
//! # Dashboard
//! GET    /api/admin/dashboard
//!
//! # Products
//! GET    /api/admin/products                       - ?visibility=all|public|hidden|deleted
//! POST   /api/admin/products
//! GET    /api/admin/products/{id}
//! PATCH  /api/admin/products/{id}
//! DELETE /api/admin/products/{id}                  - Soft delete
//! POST   /api/admin/products/{id}/restore
//! POST   /api/admin/products/{id}/visibility
//! POST   /api/admin/products/{id}/variants
//! PATCH  /api/admin/products/{id}/variants/{variantId}
//! DELETE /api/admin/products/{id}/variants/{variantId}
//!
//! # Orders
//! GET    /api/admin/orders                         - ?status=
//! GET    /api/admin/orders/{id}
//! POST   /api/admin/orders/{id}/status
//!
//! # Raffles
//! GET    /api/admin/raffles
//! POST   /api/admin/raffles
//! GET    /api/admin/raffles/{id}                   - With entries
//! PATCH  /api/admin/raffles/{id}                   - Draft/open only
//! GET    /api/admin/raffles/{id}/entries
//! POST   /api/admin/raffles/{id}/open
//! POST   /api/admin/raffles/{id}/close
//! POST   /api/admin/raffles/{id}/cancel
//! POST   /api/admin/raffles/{id}/draw              - Start winner selection
//! POST   /api/admin/raffles/{id}/advance           - Expire current winner now
//!
//! # Users
//! GET    /api/admin/users                          - ?role=&q=
//! GET    /api/admin/users/{id}
//! POST   /api/admin/users/{id}/role
//! POST   /api/admin/users/{id}/xp
//!
//! # Reviews
//! GET    /api/admin/reviews
//! DELETE /api/admin/reviews/{id}
//! ```

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod raffles;
pub mod reviews;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/{id}/restore", post(products::restore))
        .route("/{id}/visibility", post(products::set_visibility))
        .route("/{id}/variants", post(products::create_variant))
        .route(
            "/{id}/variants/{variant_id}",
            patch(products::update_variant).delete(products::delete_variant),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Create the raffle routes router.
pub fn raffle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(raffles::index).post(raffles::create))
        .route("/{id}", get(raffles::show).patch(raffles::update))
        .route("/{id}/entries", get(raffles::entries))
        .route("/{id}/open", post(raffles::open))
        .route("/{id}/close", post(raffles::close))
        .route("/{id}/cancel", post(raffles::cancel))
        .route("/{id}/draw", post(raffles::draw))
        .route("/{id}/advance", post(raffles::advance))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}", get(users::show))
        .route("/{id}/role", post(users::set_role))
        .route("/{id}/xp", post(users::adjust_xp))
}

/// Everything under `/api/admin` except auth.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::index))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/raffles", raffle_routes())
        .nest("/users", user_routes())
        .route("/reviews", get(reviews::index))
        .route("/reviews/{id}", delete(reviews::delete))
}

/// Create all routes for the back office.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/admin/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/api/admin", api_routes())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
