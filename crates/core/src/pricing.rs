//! Checkout pricing rules: shipping, totals, XP awards.

use rust_decimal::Decimal;

use crate::types::Money;

/// Order subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_cents_const(15_000);

/// Flat shipping charge below the threshold.
pub const FLAT_SHIPPING: Money = Money::from_cents_const(995);

/// Most units of one variant a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 10;

/// Shipping cost for a subtotal. Empty orders ship free.
#[must_use]
pub fn shipping_cost(subtotal: Money) -> Money {
    if subtotal.is_zero() || subtotal >= FREE_SHIPPING_THRESHOLD {
        Money::ZERO
    } else {
        FLAT_SHIPPING
    }
}

/// Unit price of a variant: base price plus modifier, never negative.
#[must_use]
pub fn unit_price(base_price: Money, price_modifier: Decimal) -> Money {
    base_price.adjusted_by(price_modifier)
}

/// Totals for a set of `(unit_price, quantity)` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub xp_earned: i64,
}

impl OrderTotals {
    /// Price a regular checkout.
    pub fn for_lines(lines: impl IntoIterator<Item = (Money, u32)>) -> Self {
        let subtotal: Money = lines.into_iter().map(|(price, qty)| price.times(qty)).sum();
        let shipping_cost = shipping_cost(subtotal);
        let total = subtotal + shipping_cost;
        Self {
            subtotal,
            shipping_cost,
            total,
            xp_earned: xp_for_total(total),
        }
    }

    /// Price a raffle purchase: one unit at the entry price, shipping included.
    #[must_use]
    pub fn for_raffle(entry_price: Money) -> Self {
        Self {
            subtotal: entry_price,
            shipping_cost: Money::ZERO,
            total: entry_price,
            xp_earned: xp_for_total(entry_price),
        }
    }
}

/// XP awarded for an order: one point per whole currency unit.
#[must_use]
pub fn xp_for_total(total: Money) -> i64 {
    total.whole_units()
}
