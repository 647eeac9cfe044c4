//! Database migrations.
//!
//! Migrations live in `migrations/` at the workspace root and are embedded
//! into the binary at compile time. Each one has a matching `.down.sql`.

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply every pending migration.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
