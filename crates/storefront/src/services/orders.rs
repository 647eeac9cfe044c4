//! Order status changes.
//!
//! Cancelling restocks every line and takes back the XP the order awarded,
//! floored at zero. Customers and the back office share this path; customers
//! are restricted to their own orders.

use sqlx::PgPool;
use thiserror::Error;

use brandbazaar_core::dto::OrderView;
use brandbazaar_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::db::orders;
use crate::db::products::{adjust_stock, lock_variants};
use crate::db::users::add_xp;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,

    #[error("cannot change order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(e.into())
    }
}

pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Move an order to `next`, restricted to `owner` when given.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order doesn't exist (or isn't the owner's) and
    /// `InvalidTransition` if the status change isn't allowed.
    pub async fn change_status(
        &self,
        id: OrderId,
        owner: Option<UserId>,
        next: OrderStatus,
    ) -> Result<OrderView, OrderError> {
        let mut tx = self.pool.begin().await?;

        let order = orders::lock(&mut tx, id, owner)
            .await?
            .ok_or(OrderError::NotFound)?;
        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let lines = orders::lines(&mut tx, id).await?;
        if next == OrderStatus::Cancelled {
            let variant_ids: Vec<_> = lines.iter().map(|l| l.variant_id).collect();
            lock_variants(&mut tx, &variant_ids).await?;
            for line in &lines {
                adjust_stock(&mut tx, line.variant_id, line.quantity).await?;
            }
            if order.xp_earned > 0 {
                add_xp(&mut tx, order.user_id, -order.xp_earned).await?;
            }
        }

        let updated = orders::set_status(&mut tx, id, next).await?;
        tx.commit().await?;

        tracing::info!(order_id = %id, from = ?order.status, to = ?next, "order status changed");
        Ok(updated.view(&lines))
    }

    /// Customer cancellation of their own order.
    ///
    /// # Errors
    ///
    /// See [`Self::change_status`].
    pub async fn cancel(&self, id: OrderId, owner: UserId) -> Result<OrderView, OrderError> {
        self.change_status(id, Some(owner), OrderStatus::Cancelled)
            .await
    }
}
