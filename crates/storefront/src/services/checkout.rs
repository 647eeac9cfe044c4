//! Checkout: session cart to paid order in one transaction.
//!
//! Variants are locked `FOR UPDATE` in ID order, stock is verified and
//! decremented, the order is written with price snapshots, and XP is awarded.
//! Payment is simulated, so orders are created already `paid`.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use brandbazaar_core::dto::{Cart, Checkout, OrderView, ShippingAddress};
use brandbazaar_core::pricing::OrderTotals;
use brandbazaar_core::{OrderStatus, PaymentMethodId, UserId, Validate, ValidationErrors, VariantId};

use crate::db::orders::{self, NewOrder, NewOrderItem};
use crate::db::products::{adjust_stock, lock_variants};
use crate::db::users::add_xp;
use crate::db::{AddressRepository, PaymentMethodRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("cart is empty")]
    EmptyCart,

    #[error("an item in your cart is no longer available")]
    Unavailable(VariantId),

    #[error("not enough stock for {sku}: {available} left")]
    InsufficientStock { sku: String, available: i32 },

    #[error("address not found")]
    AddressNotFound,

    #[error("payment method not found")]
    PaymentMethodNotFound,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(e.into())
    }
}

/// Where an order ships and how it was paid for.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub address: ShippingAddress,
    pub payment_method_id: Option<PaymentMethodId>,
}

/// Resolve a checkout body into a concrete address and payment method.
///
/// A saved address is snapshotted. Without an explicit payment method the
/// user's default is used, if any.
///
/// # Errors
///
/// Returns `AddressNotFound`/`PaymentMethodNotFound` when a referenced record
/// isn't the user's.
pub async fn resolve_delivery(
    pool: &PgPool,
    user_id: UserId,
    input: &Checkout,
) -> Result<Delivery, CheckoutError> {
    let address = match (input.address_id, &input.shipping_address) {
        (Some(id), _) => AddressRepository::new(pool)
            .get(user_id, id)
            .await?
            .ok_or(CheckoutError::AddressNotFound)?
            .shipping(),
        (None, Some(address)) => address.clone(),
        (None, None) => {
            let mut errors = ValidationErrors::new();
            errors.add("addressId", "an address is required");
            return Err(errors.into());
        }
    };

    let methods = PaymentMethodRepository::new(pool);
    let payment_method_id = match input.payment_method_id {
        Some(id) => Some(
            methods
                .get(user_id, id)
                .await?
                .ok_or(CheckoutError::PaymentMethodNotFound)?
                .id,
        ),
        None => methods
            .list(user_id)
            .await?
            .into_iter()
            .find(|m| m.is_default)
            .map(|m| m.id),
    };

    Ok(Delivery {
        address,
        payment_method_id,
    })
}

pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for everything in `cart`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` for an empty cart, `InsufficientStock` naming the
    /// first short SKU, or `Unavailable` for variants that were removed or
    /// unlisted since they were added.
    #[instrument(skip(self, cart, input), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        cart: &Cart,
        input: &Checkout,
    ) -> Result<OrderView, CheckoutError> {
        input.validate()?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let delivery = resolve_delivery(self.pool, user_id, input).await?;

        let mut tx = self.pool.begin().await?;
        let locked = lock_variants(&mut tx, &cart.variant_ids()).await?;

        let mut lines = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let row = locked
                .iter()
                .find(|v| v.variant.id == line.variant_id && v.is_listed)
                .ok_or(CheckoutError::Unavailable(line.variant_id))?;
            let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
            if row.variant.stock < quantity {
                return Err(CheckoutError::InsufficientStock {
                    sku: row.variant.sku.clone(),
                    available: row.variant.stock,
                });
            }
            adjust_stock(&mut tx, row.variant.id, -quantity).await?;
            lines.push(NewOrderItem {
                variant_id: row.variant.id,
                product_name: row.product_name.clone(),
                variant_label: row.variant.label(),
                quantity,
                unit_price: row.unit_price(),
            });
        }

        let totals = OrderTotals::for_lines(
            lines
                .iter()
                .map(|l| (l.unit_price, u32::try_from(l.quantity).unwrap_or(0))),
        );
        let order = NewOrder {
            user_id,
            status: OrderStatus::Paid,
            shipping_address: delivery.address,
            payment_method_id: delivery.payment_method_id,
            totals,
            raffle_id: None,
        };
        let view = orders::insert(&mut tx, &order, &lines).await?;
        add_xp(&mut tx, user_id, view.xp_earned).await?;

        tx.commit().await?;

        tracing::info!(order_id = %view.id, total = %view.total, xp = view.xp_earned, "order placed");
        Ok(view)
    }
}
