//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use brandbazaar_core::dto::{
    AdminProductView, ProductDetail, ProductSummary, RatingSummary, VariantView,
};
use brandbazaar_core::pricing::unit_price;
use brandbazaar_core::{Money, ProductId, UserId, VariantId};

/// A catalog product row.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: Option<UserId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub base_price: Money,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether customers may see and buy this product.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.is_public && self.deleted_at.is_none()
    }

    #[must_use]
    pub fn summary(&self, in_stock: bool) -> ProductSummary {
        ProductSummary {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
            category: self.category.clone(),
            base_price: self.base_price,
            image_url: self.image_url.clone(),
            in_stock,
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn detail(&self, variants: &[Variant], rating: RatingSummary) -> ProductDetail {
        ProductDetail {
            summary: self.summary(variants.iter().any(|v| v.stock > 0)),
            description: self.description.clone(),
            seller_id: self.seller_id,
            variants: variants.iter().map(|v| v.view(self.base_price)).collect(),
            rating,
        }
    }

    #[must_use]
    pub fn admin_view(&self, variants: &[Variant], rating: RatingSummary) -> AdminProductView {
        AdminProductView {
            detail: self.detail(variants, rating),
            is_public: self.is_public,
            deleted_at: self.deleted_at,
            updated_at: self.updated_at,
        }
    }
}

/// A product row with its aggregate stock flag, for list views.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ProductListing {
    #[sqlx(flatten)]
    pub product: Product,
    pub in_stock: bool,
}

impl ProductListing {
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        self.product.summary(self.in_stock)
    }
}

/// A purchasable size/color combination.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub size: String,
    pub color: String,
    pub stock: i32,
    pub price_modifier: Decimal,
}

impl Variant {
    #[must_use]
    pub fn unit_price(&self, base_price: Money) -> Money {
        unit_price(base_price, self.price_modifier)
    }

    /// Human-readable label stored on order lines, e.g. `"42 / White"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} / {}", self.size, self.color)
    }

    #[must_use]
    pub fn view(&self, base_price: Money) -> VariantView {
        VariantView {
            id: self.id,
            sku: self.sku.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
            stock: self.stock,
            price_modifier: self.price_modifier,
            price: self.unit_price(base_price),
            in_stock: self.stock > 0,
        }
    }
}

/// A variant joined with the product fields carts and checkout need.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct VariantWithProduct {
    #[sqlx(flatten)]
    pub variant: Variant,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub base_price: Money,
    pub is_listed: bool,
}

impl VariantWithProduct {
    #[must_use]
    pub fn unit_price(&self) -> Money {
        self.variant.unit_price(self.base_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(stock: i32, modifier: Decimal) -> Variant {
        Variant {
            id: VariantId::generate(),
            product_id: ProductId::generate(),
            sku: "AM90-42-WHT".to_string(),
            size: "42".to_string(),
            color: "White".to_string(),
            stock,
            price_modifier: modifier,
        }
    }

    #[test]
    fn test_variant_view_prices() {
        let view = variant(3, Decimal::new(1_000, 2)).view(Money::from_cents(12_999));
        assert_eq!(view.price, Money::from_cents(13_999));
        assert!(view.in_stock);
    }

    #[test]
    fn test_variant_label() {
        assert_eq!(variant(0, Decimal::ZERO).label(), "42 / White");
    }
}
