//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod raffle;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Failure to reach the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect using `DATABASE_URL`, loading `.env` first.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(brandbazaar_storefront::db::create_pool(&database_url).await?)
}
