//! Cart to order to XP, through the shared rules.
//!
//! Mirrors what checkout does with a session cart: price each line against
//! the catalog, total the order, award XP, and read the new level.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;

use rust_decimal::Decimal;

use brandbazaar_core::dto::{AddCartItem, Cart, UpdateCartItem};
use brandbazaar_core::pricing::{
    FLAT_SHIPPING, MAX_LINE_QUANTITY, OrderTotals, shipping_cost, unit_price,
};
use brandbazaar_core::{LevelProgress, LevelTier, Money, OrderStatus, Validate, VariantId};

struct CatalogVariant {
    base_price: Money,
    price_modifier: Decimal,
    stock: u32,
}

fn money(cents: i64) -> Money {
    Money::from_cents(cents)
}

/// Price the cart the way checkout does: current prices, not cached ones.
fn price(cart: &Cart, catalog: &HashMap<VariantId, CatalogVariant>) -> OrderTotals {
    OrderTotals::for_lines(cart.lines().iter().map(|line| {
        let variant = &catalog[&line.variant_id];
        (
            unit_price(variant.base_price, variant.price_modifier),
            line.quantity,
        )
    }))
}

#[test]
fn test_cart_checkout_awards_xp_and_levels_up() {
    let hoodie = VariantId::generate();
    let tee = VariantId::generate();
    let catalog = HashMap::from([
        (
            hoodie,
            CatalogVariant {
                base_price: money(8_900),
                price_modifier: Decimal::new(500, 2),
                stock: 3,
            },
        ),
        (
            tee,
            CatalogVariant {
                base_price: money(3_400),
                price_modifier: Decimal::ZERO,
                stock: 50,
            },
        ),
    ]);

    let mut cart = Cart::default();
    // Only three hoodies in stock.
    assert_eq!(cart.add(hoodie, 5, catalog[&hoodie].stock), 3);
    assert_eq!(cart.add(tee, 2, catalog[&tee].stock), 2);
    assert_eq!(cart.item_count(), 5);

    let totals = price(&cart, &catalog);
    assert_eq!(totals.subtotal, money(3 * 9_400 + 2 * 3_400));
    assert_eq!(totals.shipping_cost, Money::ZERO);
    assert_eq!(totals.total, money(35_000));
    assert_eq!(totals.xp_earned, 350);

    // Enough orders of that size cross the Enthusiast threshold.
    let mut xp = 0;
    let mut orders = 0;
    while LevelTier::from_xp(xp) == LevelTier::Hobbyist {
        xp += totals.xp_earned;
        orders += 1;
    }
    assert_eq!(orders, 3);
    let progress = LevelProgress::from_xp(xp);
    assert_eq!(progress.level, LevelTier::Enthusiast);
    assert_eq!(progress.next_level, Some(LevelTier::Sneakerhead));
    assert_eq!(progress.xp_to_next_level, Some(LevelTier::SNEAKERHEAD_XP - 1_050));
}

#[test]
fn test_small_order_pays_flat_shipping() {
    let cap = VariantId::generate();
    let catalog = HashMap::from([(
        cap,
        CatalogVariant {
            base_price: money(2_850),
            price_modifier: Decimal::ZERO,
            stock: 60,
        },
    )]);
    let mut cart = Cart::default();
    cart.add(cap, 1, 60);

    let totals = price(&cart, &catalog);
    assert_eq!(totals.shipping_cost, FLAT_SHIPPING);
    assert_eq!(totals.total, money(2_850) + FLAT_SHIPPING);
    assert_eq!(shipping_cost(Money::ZERO), Money::ZERO);
}

#[test]
fn test_cart_edits_respect_line_limits() {
    let variant = VariantId::generate();
    let mut cart = Cart::default();
    assert_eq!(cart.add(variant, 4, 100), 4);
    assert_eq!(cart.add(variant, 20, 100), MAX_LINE_QUANTITY);

    assert!(cart.set(variant, 2));
    assert_eq!(cart.item_count(), 2);
    assert!(cart.set(variant, 0));
    assert!(cart.is_empty());
    assert!(!cart.remove(variant));

    assert!(AddCartItem { variant_id: variant, quantity: 0 }.validate().is_err());
    assert!(AddCartItem { variant_id: variant, quantity: MAX_LINE_QUANTITY + 1 }.validate().is_err());
    assert!(UpdateCartItem { quantity: 0 }.validate().is_ok());
}

#[test]
fn test_removed_variants_drop_out_of_the_cart() {
    let kept = VariantId::generate();
    let gone = VariantId::generate();
    let mut cart = Cart::default();
    cart.add(kept, 1, 10);
    cart.add(gone, 1, 10);

    cart.retain_known(&[kept]);
    assert_eq!(cart.variant_ids(), vec![kept]);
}

#[test]
fn test_order_fulfilment_path() {
    let path = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];
    for pair in path.windows(2) {
        assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
    }
    assert!(OrderStatus::Delivered.is_terminal());
    assert!(path.iter().skip(1).all(|s| s.is_revenue()));

    // Cancelling is possible until the order ships.
    assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    assert!(!OrderStatus::Cancelled.is_revenue());
}
