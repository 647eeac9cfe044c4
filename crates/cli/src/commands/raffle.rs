//! Raffle maintenance.
//!
//! The admin server runs the same sweep on a timer; this is for deployments
//! that disable it and drive the sweep from cron instead.

use chrono::Utc;

use brandbazaar_storefront::services::raffle::{RaffleError, RaffleService};

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Sweep failed: {0}")]
    Raffle(#[from] RaffleError),
}

/// One sweep pass. Returns how many raffles moved on to a new winner or
/// completed.
pub async fn sweep() -> Result<usize, SweepError> {
    let pool = connect().await?;
    let advanced = RaffleService::new(&pool).sweep(Utc::now()).await?;
    tracing::info!(advanced, "Raffle sweep complete");
    Ok(advanced)
}
