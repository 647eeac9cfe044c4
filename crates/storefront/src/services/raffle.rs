//! Raffle entry and winner selection.
//!
//! Every operation locks the raffle row first. Entries, claims, declines,
//! admin actions, and sweeps all re-read the draw state under that lock, so a
//! sweep racing a claim (or another sweep) sees the committed outcome and
//! never advances twice.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::instrument;

use brandbazaar_core::dto::{ClaimRaffle, OrderView, RaffleEntered};
use brandbazaar_core::pricing::OrderTotals;
use brandbazaar_core::raffle::{
    Advance, ClaimDenied, EntryDenied, advance, can_enter, can_start_drawing, check_claim,
    is_deadline_passed,
};
use brandbazaar_core::{
    EntryStatus, LevelProgress, LevelTier, OrderStatus, RaffleId, RaffleStatus, UserId, Validate,
    ValidationErrors, VariantId,
};

use super::checkout::{CheckoutError, resolve_delivery};
use crate::db::orders::{self, NewOrder, NewOrderItem};
use crate::db::products::{adjust_stock, lock_variants};
use crate::db::raffles::{self, RaffleRepository};
use crate::db::users::{add_xp, lock_xp};
use crate::db::RepositoryError;
use crate::models::Raffle;

#[derive(Debug, Error)]
pub enum RaffleError {
    #[error("raffle not found")]
    NotFound,

    #[error("{0}")]
    Entry(#[from] EntryDenied),

    #[error("{0}")]
    Claim(#[from] ClaimDenied),

    #[error("raffle cannot start drawing until entries close")]
    CannotDraw,

    #[error("raffle is not drawing a winner")]
    NotDrawing,

    #[error("cannot move raffle from {from:?} to {to:?}")]
    InvalidTransition { from: RaffleStatus, to: RaffleStatus },

    #[error("a {0:?} raffle can no longer be edited")]
    NotEditable(RaffleStatus),

    #[error("raffle has no product to purchase")]
    NoProduct,

    #[error("variant does not belong to the raffle product")]
    VariantMismatch(VariantId),

    #[error("{sku} is out of stock")]
    OutOfStock { sku: String },

    #[error("user not found")]
    UserNotFound,

    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for RaffleError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(e.into())
    }
}

/// What a draw step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    /// `winner` holds the purchase right until `deadline`.
    Selected {
        winner: UserId,
        deadline: DateTime<Utc>,
    },
    /// Nobody left to draw; the raffle completed unclaimed.
    Exhausted,
}

pub struct RaffleService<'a> {
    pool: &'a PgPool,
}

impl<'a> RaffleService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Enter a raffle and collect its XP reward.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Entry` with the reason entry was refused.
    #[instrument(skip(self), fields(raffle_id = %raffle_id, user_id = %user_id))]
    pub async fn enter(
        &self,
        raffle_id: RaffleId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<RaffleEntered, RaffleError> {
        let mut tx = self.pool.begin().await?;

        let raffle = lock_listed(&mut tx, raffle_id).await?;
        let xp = lock_xp(&mut tx, user_id)
            .await?
            .ok_or(RaffleError::UserNotFound)?;
        let entry_count = raffles::entry_count(&mut tx, raffle_id).await?;
        let already_entered = raffles::entry_for(&mut tx, raffle_id, user_id)
            .await?
            .is_some();

        can_enter(
            &raffle.entry_window(entry_count),
            LevelTier::from_xp(i64::from(xp)),
            already_entered,
            now,
        )?;

        let entry = raffles::insert_entry(&mut tx, raffle_id, user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => RaffleError::Entry(EntryDenied::AlreadyEntered),
                other => other.into(),
            })?;
        let new_xp = add_xp(&mut tx, user_id, raffle.xp_reward).await?;

        tx.commit().await?;

        tracing::info!(entries = entry_count + 1, "raffle entered");
        Ok(RaffleEntered {
            entry: entry.into(),
            xp_awarded: raffle.xp_reward,
            level: LevelProgress::from_xp(i64::from(new_xp)),
        })
    }

    /// The current winner buys the raffle product at the entry price.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Claim` if the caller isn't the current winner or
    /// the deadline passed, `VariantMismatch`/`OutOfStock` for a bad variant.
    #[instrument(skip(self, input), fields(raffle_id = %raffle_id, user_id = %user_id))]
    pub async fn claim(
        &self,
        raffle_id: RaffleId,
        user_id: UserId,
        input: &ClaimRaffle,
        now: DateTime<Utc>,
    ) -> Result<OrderView, RaffleError> {
        input.validate()?;
        let delivery = resolve_delivery(self.pool, user_id, &input.delivery).await?;

        let mut tx = self.pool.begin().await?;
        let raffle = lock_listed(&mut tx, raffle_id).await?;
        check_claim(&raffle.winner_state(), user_id, now)?;
        let product_id = raffle.product_id.ok_or(RaffleError::NoProduct)?;

        let variant = lock_variants(&mut tx, &[input.variant_id])
            .await?
            .into_iter()
            .find(|v| v.variant.product_id == product_id)
            .ok_or(RaffleError::VariantMismatch(input.variant_id))?;
        if variant.variant.stock < 1 {
            return Err(RaffleError::OutOfStock {
                sku: variant.variant.sku,
            });
        }
        adjust_stock(&mut tx, variant.variant.id, -1).await?;

        let totals = OrderTotals::for_raffle(raffle.entry_price);
        let order = NewOrder {
            user_id,
            status: OrderStatus::Paid,
            shipping_address: delivery.address,
            payment_method_id: delivery.payment_method_id,
            totals,
            raffle_id: Some(raffle_id),
        };
        let line = NewOrderItem {
            variant_id: variant.variant.id,
            product_name: variant.product_name.clone(),
            variant_label: variant.variant.label(),
            quantity: 1,
            unit_price: raffle.entry_price,
        };
        let view = orders::insert(&mut tx, &order, &[line]).await?;
        add_xp(&mut tx, user_id, view.xp_earned).await?;

        raffles::resolve_selected(&mut tx, raffle_id, EntryStatus::Purchased, now).await?;
        raffles::set_winner(&mut tx, raffle_id, Some(user_id), None).await?;
        raffles::set_status(&mut tx, raffle_id, RaffleStatus::Completed, now).await?;

        tx.commit().await?;

        tracing::info!(order_id = %view.id, "raffle claimed");
        Ok(view)
    }

    /// The current winner passes; the draw moves on.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Claim` if the caller isn't the current winner.
    #[instrument(skip(self), fields(raffle_id = %raffle_id, user_id = %user_id))]
    pub async fn decline(
        &self,
        raffle_id: RaffleId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<DrawOutcome, RaffleError> {
        let mut tx = self.pool.begin().await?;
        let raffle = lock_listed(&mut tx, raffle_id).await?;
        check_claim(&raffle.winner_state(), user_id, now)?;

        raffles::resolve_selected(&mut tx, raffle_id, EntryStatus::Declined, now).await?;
        let outcome = advance_draw(&mut tx, &raffle, now).await?;

        tx.commit().await?;
        log_outcome("winner declined", raffle_id, outcome);
        Ok(outcome)
    }

    /// Close entries and draw the first winner.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::CannotDraw` unless the raffle is closed, or open
    /// with its entry period over.
    #[instrument(skip(self), fields(raffle_id = %raffle_id))]
    pub async fn start_drawing(
        &self,
        raffle_id: RaffleId,
        now: DateTime<Utc>,
    ) -> Result<DrawOutcome, RaffleError> {
        let mut tx = self.pool.begin().await?;
        let raffle = raffles::lock(&mut tx, raffle_id)
            .await?
            .ok_or(RaffleError::NotFound)?;
        if !can_start_drawing(raffle.status, raffle.ends_at, now) {
            return Err(RaffleError::CannotDraw);
        }

        raffles::set_status(&mut tx, raffle_id, RaffleStatus::Drawing, now).await?;
        let outcome = advance_draw(&mut tx, &raffle, now).await?;

        tx.commit().await?;
        log_outcome("winner selection started", raffle_id, outcome);
        Ok(outcome)
    }

    /// Expire the current winner immediately and draw the next one.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::NotDrawing` unless the raffle is drawing.
    #[instrument(skip(self), fields(raffle_id = %raffle_id))]
    pub async fn force_advance(
        &self,
        raffle_id: RaffleId,
        now: DateTime<Utc>,
    ) -> Result<DrawOutcome, RaffleError> {
        let mut tx = self.pool.begin().await?;
        let raffle = raffles::lock(&mut tx, raffle_id)
            .await?
            .ok_or(RaffleError::NotFound)?;
        if raffle.status != RaffleStatus::Drawing {
            return Err(RaffleError::NotDrawing);
        }

        raffles::resolve_selected(&mut tx, raffle_id, EntryStatus::Expired, now).await?;
        let outcome = advance_draw(&mut tx, &raffle, now).await?;

        tx.commit().await?;
        log_outcome("winner force-expired", raffle_id, outcome);
        Ok(outcome)
    }

    /// Expire overdue winners across all drawing raffles.
    ///
    /// Returns how many raffles advanced. A failure on one raffle is logged
    /// and the sweep moves on to the next.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::Repository` if the overdue lookup fails.
    #[instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, RaffleError> {
        let due = RaffleRepository::new(self.pool).overdue(now).await?;
        let mut advanced = 0;
        for raffle_id in due {
            match self.sweep_one(raffle_id, now).await {
                Ok(true) => advanced += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(raffle_id = %raffle_id, error = %e, "raffle sweep failed"),
            }
        }
        if advanced > 0 {
            tracing::info!(advanced, "raffle sweep complete");
        }
        Ok(advanced)
    }

    /// Advance one raffle if its deadline is still passed under the lock.
    async fn sweep_one(&self, raffle_id: RaffleId, now: DateTime<Utc>) -> Result<bool, RaffleError> {
        let mut tx = self.pool.begin().await?;
        let Some(raffle) = raffles::lock(&mut tx, raffle_id).await? else {
            return Ok(false);
        };
        if raffle.status != RaffleStatus::Drawing
            || !is_deadline_passed(raffle.winner_purchase_deadline, now)
        {
            return Ok(false);
        }

        raffles::resolve_selected(&mut tx, raffle_id, EntryStatus::Expired, now).await?;
        let outcome = advance_draw(&mut tx, &raffle, now).await?;

        tx.commit().await?;
        log_outcome("winner expired", raffle_id, outcome);
        Ok(true)
    }

    /// Back-office lifecycle move: open, close, or cancel.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::InvalidTransition` if the move isn't allowed from
    /// the current status.
    pub async fn transition(
        &self,
        raffle_id: RaffleId,
        next: RaffleStatus,
        now: DateTime<Utc>,
    ) -> Result<(), RaffleError> {
        let mut tx = self.pool.begin().await?;
        let raffle = raffles::lock(&mut tx, raffle_id)
            .await?
            .ok_or(RaffleError::NotFound)?;
        if !raffle.status.can_transition_to(next) || next == RaffleStatus::Drawing {
            return Err(RaffleError::InvalidTransition {
                from: raffle.status,
                to: next,
            });
        }
        raffles::set_status(&mut tx, raffle_id, next, now).await?;
        tx.commit().await?;

        tracing::info!(raffle_id = %raffle_id, from = ?raffle.status, to = ?next, "raffle status changed");
        Ok(())
    }
}

/// Lock a raffle customers can see.
async fn lock_listed(conn: &mut PgConnection, id: RaffleId) -> Result<Raffle, RaffleError> {
    raffles::lock(conn, id)
        .await?
        .filter(|r| r.status.is_listed())
        .ok_or(RaffleError::NotFound)
}

/// Draw the next winner from the remaining pool, or complete the raffle.
async fn advance_draw(
    conn: &mut PgConnection,
    raffle: &Raffle,
    now: DateTime<Utc>,
) -> Result<DrawOutcome, RepositoryError> {
    let pool = raffles::draw_pool(conn, raffle.id).await?;
    let step = {
        let mut rng = rand::rng();
        advance(&pool, raffle.purchase_window_hours, now, &mut rng)
    };

    match step {
        Advance::Selected {
            entry: (entry_id, winner),
            deadline,
        } => {
            raffles::mark_selected(conn, entry_id).await?;
            raffles::set_winner(conn, raffle.id, Some(winner), Some(deadline)).await?;
            Ok(DrawOutcome::Selected { winner, deadline })
        }
        Advance::Exhausted => {
            raffles::set_winner(conn, raffle.id, None, None).await?;
            raffles::set_status(conn, raffle.id, RaffleStatus::Completed, now).await?;
            Ok(DrawOutcome::Exhausted)
        }
    }
}

fn log_outcome(event: &str, raffle_id: RaffleId, outcome: DrawOutcome) {
    match outcome {
        DrawOutcome::Selected { winner, deadline } => {
            tracing::info!(raffle_id = %raffle_id, winner = %winner, %deadline, "{event}: next winner drawn");
        }
        DrawOutcome::Exhausted => {
            tracing::info!(raffle_id = %raffle_id, "{event}: no entrants left, raffle completed");
        }
    }
}
