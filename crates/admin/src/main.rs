//! BrandBazaar Admin - back-office JSON API.
//!
//! This binary serves the admin API on port 3001 and runs the raffle sweep
//! that moves winner selection along once a winner's purchase window lapses.
//!
//! # Security
//!
//! Bind to a private interface (the default is 127.0.0.1). Logins are limited
//! to accounts with the `admin` role.
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p brandbazaar-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use brandbazaar_admin::config::AdminConfig;
use brandbazaar_admin::state::AppState;
use brandbazaar_admin::{app, db, middleware, sweep};
use brandbazaar_storefront::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env()?;

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = telemetry::init_sentry(&config.sentry);
    telemetry::init_tracing("brandbazaar_admin=info,brandbazaar_storefront=info,tower_http=debug");
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    if let Some(period) = config.raffle_sweep_interval {
        sweep::spawn(pool.clone(), period);
    } else {
        tracing::warn!("Raffle sweep disabled; expired winners advance only on demand");
    }

    let session_layer = middleware::create_session_layer(&pool, &config)?;
    let addr = config.socket_addr();
    let state = AppState::new(config, pool);
    let router = app(state, session_layer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("admin listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(telemetry::shutdown_signal())
    .await?;

    Ok(())
}
