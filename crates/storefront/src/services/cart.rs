//! Session cart storage and pricing.
//!
//! The session holds only variant IDs and quantities. Every render re-reads
//! variants so prices and stock flags are always current.

use tower_sessions::Session;

use brandbazaar_core::dto::{Cart, CartLineView, CartView};
use brandbazaar_core::pricing::OrderTotals;

use crate::models::{VariantWithProduct, session_keys};

/// The session cart, empty if none is stored.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<Cart>(session_keys::CART).await.map(|_| ())
}

/// Drop lines whose variants are gone or unlisted. Returns whether any were.
pub fn prune(cart: &mut Cart, variants: &[VariantWithProduct]) -> bool {
    let known: Vec<_> = variants
        .iter()
        .filter(|v| v.is_listed)
        .map(|v| v.variant.id)
        .collect();
    let before = cart.lines().len();
    cart.retain_known(&known);
    cart.lines().len() != before
}

/// Price `cart` against current variant rows, in cart order.
///
/// Lines without a matching row are skipped; call [`prune`] first to drop
/// them from the stored cart as well.
#[must_use]
pub fn price(cart: &Cart, variants: &[VariantWithProduct]) -> CartView {
    let lines: Vec<CartLineView> = cart
        .lines()
        .iter()
        .filter_map(|line| {
            let row = variants.iter().find(|v| v.variant.id == line.variant_id)?;
            let unit_price = row.unit_price();
            let requested = i64::from(line.quantity);
            Some(CartLineView {
                variant_id: row.variant.id,
                product_id: row.variant.product_id,
                product_slug: row.product_slug.clone(),
                product_name: row.product_name.clone(),
                variant_label: row.variant.label(),
                sku: row.variant.sku.clone(),
                image_url: row.image_url.clone(),
                unit_price,
                quantity: line.quantity,
                line_total: unit_price.times(line.quantity),
                available_stock: row.variant.stock,
                in_stock: i64::from(row.variant.stock) >= requested,
            })
        })
        .collect();

    let totals = OrderTotals::for_lines(lines.iter().map(|l| (l.unit_price, l.quantity)));
    CartView {
        item_count: lines.iter().map(|l| l.quantity).sum(),
        lines,
        subtotal: totals.subtotal,
        shipping_cost: totals.shipping_cost,
        total: totals.total,
    }
}

#[cfg(test)]
mod tests {
    use brandbazaar_core::pricing::FLAT_SHIPPING;
    use brandbazaar_core::{Money, ProductId, VariantId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::Variant;

    fn row(stock: i32, cents: i64, listed: bool) -> VariantWithProduct {
        VariantWithProduct {
            variant: Variant {
                id: VariantId::generate(),
                product_id: ProductId::generate(),
                sku: format!("SKU-{stock}-{cents}"),
                size: "10".to_string(),
                color: "Black".to_string(),
                stock,
                price_modifier: Decimal::ZERO,
            },
            product_name: "Court Low".to_string(),
            product_slug: "court-low".to_string(),
            image_url: None,
            base_price: Money::from_cents(cents),
            is_listed: listed,
        }
    }

    #[test]
    fn test_price_applies_shipping_and_stock_flags() {
        let a = row(5, 2_500, true);
        let b = row(1, 1_000, true);
        let mut cart = Cart::default();
        cart.add(a.variant.id, 2, 10);
        cart.add(b.variant.id, 3, 10);

        let view = price(&cart, &[b.clone(), a.clone()]);
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].variant_id, a.variant.id);
        assert!(view.lines[0].in_stock);
        assert!(!view.lines[1].in_stock);
        assert_eq!(view.item_count, 5);
        assert_eq!(view.subtotal, Money::from_cents(8_000));
        assert_eq!(view.shipping_cost, FLAT_SHIPPING);
        assert_eq!(view.total, Money::from_cents(8_995));
    }

    #[test]
    fn test_free_shipping_over_threshold() {
        let a = row(10, 5_000, true);
        let mut cart = Cart::default();
        cart.add(a.variant.id, 3, 10);
        let view = price(&cart, &[a]);
        assert_eq!(view.shipping_cost, Money::ZERO);
        assert_eq!(view.total, Money::from_cents(15_000));
    }

    #[test]
    fn test_prune_drops_unlisted_and_missing() {
        let kept = row(3, 1_000, true);
        let hidden = row(3, 1_000, false);
        let mut cart = Cart::default();
        cart.add(kept.variant.id, 1, 10);
        cart.add(hidden.variant.id, 1, 10);
        cart.add(VariantId::generate(), 1, 10);

        assert!(prune(&mut cart, &[kept.clone(), hidden]));
        assert_eq!(cart.variant_ids(), vec![kept.variant.id]);
        assert!(!prune(&mut cart, &[kept]));
    }
}
