//! Raffle setup: creating drafts and editing definitions.
//!
//! Status changes and winner selection go through the storefront's
//! `RaffleService`, which owns the row-lock protocol.

use sqlx::PgPool;

use brandbazaar_core::dto::{CreateRaffle, UpdateRaffle};
use brandbazaar_core::{RaffleId, RaffleStatus};
use brandbazaar_storefront::db::raffles;
use brandbazaar_storefront::services::raffle::RaffleError;

use super::{RepositoryError, constraint_error};

pub struct RaffleAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RaffleAdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a raffle in `draft`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product doesn't exist.
    pub async fn create(&self, input: &CreateRaffle) -> Result<RaffleId, RepositoryError> {
        let id = RaffleId::generate();
        sqlx::query(
            r#"
            INSERT INTO raffle
                (id, title, description, "productId", "entryPrice", "xpReward", "minLevel",
                 "maxEntries", "startsAt", "endsAt", status, "purchaseWindowHours")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.product_id)
        .bind(input.entry_price)
        .bind(input.xp_reward)
        .bind(input.min_level)
        .bind(input.max_entries)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(RaffleStatus::Draft)
        .bind(input.purchase_window_hours)
        .execute(self.pool)
        .await
        .map_err(constraint_error)?;

        tracing::info!(raffle_id = %id, title = %input.title, "raffle created");
        Ok(id)
    }

    /// Edit a draft or open raffle. The merged schedule is re-checked under
    /// the row lock.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::NotEditable` once the raffle has closed and
    /// `RaffleError::Validation` if the merged schedule is invalid.
    pub async fn update(&self, id: RaffleId, input: &UpdateRaffle) -> Result<(), RaffleError> {
        let mut tx = self.pool.begin().await?;
        let raffle = raffles::lock(&mut tx, id)
            .await?
            .ok_or(RaffleError::NotFound)?;
        if !raffle.status.is_editable() {
            return Err(RaffleError::NotEditable(raffle.status));
        }
        input.validate_schedule(raffle.starts_at, raffle.ends_at)?;

        sqlx::query(
            r#"
            UPDATE raffle SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                "productId" = CASE WHEN $4 THEN $5 ELSE "productId" END,
                "entryPrice" = COALESCE($6, "entryPrice"),
                "xpReward" = COALESCE($7, "xpReward"),
                "minLevel" = COALESCE($8, "minLevel"),
                "maxEntries" = CASE WHEN $9 THEN $10 ELSE "maxEntries" END,
                "startsAt" = COALESCE($11, "startsAt"),
                "endsAt" = COALESCE($12, "endsAt"),
                "purchaseWindowHours" = COALESCE($13, "purchaseWindowHours"),
                "updatedAt" = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(input.description.as_deref().map(str::trim))
        .bind(input.product_id.is_some())
        .bind(input.product_id.flatten())
        .bind(input.entry_price)
        .bind(input.xp_reward)
        .bind(input.min_level)
        .bind(input.max_entries.is_some())
        .bind(input.max_entries.flatten())
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.purchase_window_hours)
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;

        tx.commit().await?;
        tracing::info!(raffle_id = %id, "raffle updated");
        Ok(())
    }
}
