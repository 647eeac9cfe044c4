//! BrandBazaar Storefront - customer-facing JSON API.
//!
//! This binary serves the marketplace API on port 3000: catalog, cart,
//! wishlist, checkout, orders, raffles, and account management.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - `PostgreSQL` via sqlx for all data, including sessions
//! - moka for the product detail cache
//! - Sentry + tracing for errors and logs
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p brandbazaar-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use brandbazaar_storefront::config::StorefrontConfig;
use brandbazaar_storefront::state::AppState;
use brandbazaar_storefront::{app, db, middleware, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = telemetry::init_sentry(&config.sentry);
    telemetry::init_tracing("brandbazaar_storefront=info,tower_http=debug");
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    let session_layer = middleware::create_session_layer(&pool, &config)?;
    let addr = config.socket_addr();
    let state = AppState::new(config, pool);
    let router = app(state, session_layer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(telemetry::shutdown_signal())
    .await?;

    Ok(())
}
