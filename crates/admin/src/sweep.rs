//! Background raffle sweep.
//!
//! Winners hold the purchase right until their deadline. Once it passes,
//! the raffle moves on to the next entrant even if nobody is looking at
//! it; this task does that on a fixed period.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use brandbazaar_storefront::services::raffle::RaffleService;

/// Spawn the sweep loop. It runs until the runtime shuts down.
pub fn spawn(pool: PgPool, period: Duration) -> JoinHandle<()> {
    tracing::info!(period_secs = period.as_secs(), "Spawning raffle sweep task");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            run_once(&pool).await;
        }
    })
}

/// One pass over raffles with an overdue winner.
async fn run_once(pool: &PgPool) {
    match RaffleService::new(pool).sweep(Utc::now()).await {
        Ok(0) => tracing::debug!("raffle sweep found nothing due"),
        Ok(advanced) => tracing::info!(advanced, "raffle sweep advanced expired winners"),
        Err(e) => tracing::error!(error = %e, "raffle sweep failed"),
    }
}
