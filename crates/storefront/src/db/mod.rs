//! Database access for the shared BrandBazaar `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts, roles, and XP
//! - `product` / `product_variant` - Catalog
//! - `review` / `wishlist_item` - Customer product data
//! - `address` / `payment_method` - Account book-keeping
//! - `orders` / `order_item` - Orders with price snapshots
//! - `raffle` / `raffle_entry` - Limited releases and winner selection
//! - `tower_sessions.session` - Session storage
//!
//! Queries use runtime `query_as` with `FromRow` rows so the workspace builds
//! without a live database. Columns are camelCase and quoted.
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p brandbazaar-cli -- migrate
//! ```

pub mod addresses;
pub mod orders;
pub mod payment_methods;
pub mod products;
pub mod raffles;
pub mod reviews;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use orders::OrderRepository;
pub use payment_methods::PaymentMethodRepository;
pub use products::ProductRepository;
pub use raffles::RaffleRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to `Conflict` with `message`, everything else to `Database`.
    pub fn unique(message: &str) -> impl FnOnce(sqlx::Error) -> Self + '_ {
        move |e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Self::Conflict(message.to_owned());
            }
            Self::Database(e)
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
