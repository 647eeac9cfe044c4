//! Shopping cart payloads and the session-stored cart itself.

use serde::{Deserialize, Serialize};

use crate::pricing::MAX_LINE_QUANTITY;
use crate::types::{Money, ProductId, VariantId};
use crate::validation::{Validate, ValidationErrors};

/// `POST /api/cart/items`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub variant_id: VariantId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl Validate for AddCartItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.range("quantity", self.quantity, 1, MAX_LINE_QUANTITY);
        errors.into_result()
    }
}

/// `PATCH /api/cart/items/{variantId}`. Zero removes the line.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItem {
    pub quantity: u32,
}

impl Validate for UpdateCartItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.range("quantity", self.quantity, 0, MAX_LINE_QUANTITY);
        errors.into_result()
    }
}

/// One line of the stored cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// The cart as kept in the session: variant IDs and quantities only.
///
/// Prices and stock are looked up fresh whenever the cart is rendered or
/// checked out, so a stale session never fixes a price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn variant_ids(&self) -> Vec<VariantId> {
        self.lines.iter().map(|l| l.variant_id).collect()
    }

    /// Add units, merging with an existing line. The line is capped at
    /// `limit` (itself capped at [`MAX_LINE_QUANTITY`]). Returns the new
    /// line quantity; zero means nothing could be added.
    pub fn add(&mut self, variant_id: VariantId, quantity: u32, limit: u32) -> u32 {
        let cap = limit.min(MAX_LINE_QUANTITY);
        if let Some(line) = self.lines.iter_mut().find(|l| l.variant_id == variant_id) {
            line.quantity = line.quantity.saturating_add(quantity).min(cap);
            return line.quantity;
        }
        let quantity = quantity.min(cap);
        if quantity > 0 {
            self.lines.push(CartLine {
                variant_id,
                quantity,
            });
        }
        quantity
    }

    /// Set a line's quantity; zero removes it. Returns `false` if the
    /// variant is not in the cart.
    pub fn set(&mut self, variant_id: VariantId, quantity: u32) -> bool {
        let Some(pos) = self.lines.iter().position(|l| l.variant_id == variant_id) else {
            return false;
        };
        if quantity == 0 {
            self.lines.remove(pos);
        } else if let Some(line) = self.lines.get_mut(pos) {
            line.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
        true
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove(&mut self, variant_id: VariantId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.variant_id != variant_id);
        self.lines.len() != before
    }

    /// Drop lines whose variants no longer exist.
    pub fn retain_known(&mut self, known: &[VariantId]) {
        self.lines.retain(|l| known.contains(&l.variant_id));
    }
}

/// A cart line priced against current catalog data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_slug: String,
    pub product_name: String,
    pub variant_label: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
    pub available_stock: i32,
    /// Whether current stock covers the requested quantity.
    pub in_stock: bool,
}

/// `GET /api/cart`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_and_caps() {
        let mut cart = Cart::default();
        let v = VariantId::generate();
        assert_eq!(cart.add(v, 4, 100), 4);
        assert_eq!(cart.add(v, 4, 100), 8);
        assert_eq!(cart.add(v, 4, 100), MAX_LINE_QUANTITY);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_caps_at_stock() {
        let mut cart = Cart::default();
        let v = VariantId::generate();
        assert_eq!(cart.add(v, 5, 3), 3);
        assert_eq!(cart.add(VariantId::generate(), 2, 0), 0);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_set_zero_removes() {
        let mut cart = Cart::default();
        let v = VariantId::generate();
        cart.add(v, 2, 10);
        assert!(cart.set(v, 5));
        assert_eq!(cart.item_count(), 5);
        assert!(cart.set(v, 0));
        assert!(cart.is_empty());
        assert!(!cart.set(v, 1));
    }

    #[test]
    fn test_retain_known() {
        let mut cart = Cart::default();
        let keep = VariantId::generate();
        let gone = VariantId::generate();
        cart.add(keep, 1, 10);
        cart.add(gone, 1, 10);
        cart.retain_known(&[keep]);
        assert_eq!(cart.variant_ids(), vec![keep]);
        assert!(!cart.remove(gone));
    }

    #[test]
    fn test_quantity_validation() {
        let v = VariantId::generate();
        let add = AddCartItem {
            variant_id: v,
            quantity: 11,
        };
        assert!(add.validate().is_err());
        assert!(UpdateCartItem { quantity: 0 }.validate().is_ok());
    }
}
