//! Checkout and order payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::PageRequest;
use crate::types::{
    AddressId, Money, OrderId, OrderItemId, OrderStatus, PaymentMethodId, RaffleId, UserId,
    VariantId,
};
use crate::validation::{Validate, ValidationErrors, is_country_code};

/// Address snapshot stored on an order (`orders.shippingAddress` jsonb).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl Validate for ShippingAddress {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("fullName", &self.full_name, 1, 120);
        errors.length("line1", &self.line1, 1, 200);
        errors.optional_length("line2", self.line2.as_deref(), 0, 200);
        errors.length("city", &self.city, 1, 100);
        errors.length("region", &self.region, 0, 100);
        errors.length("postalCode", &self.postal_code, 1, 20);
        errors.check(
            is_country_code(&self.country),
            "country",
            "must be a two-letter uppercase country code",
        );
        errors.optional_length("phone", self.phone.as_deref(), 0, 32);
        errors.into_result()
    }
}

/// `POST /api/checkout`
///
/// Ship either to a saved address (`addressId`) or to an inline one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub address_id: Option<AddressId>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method_id: Option<PaymentMethodId>,
}

impl Validate for Checkout {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match (&self.address_id, &self.shipping_address) {
            (None, None) => errors.add("shippingAddress", "is required"),
            (Some(_), Some(_)) => {
                errors.add("addressId", "cannot be combined with shippingAddress");
            }
            (None, Some(address)) => {
                if let Err(nested) = address.validate() {
                    errors.nested("shippingAddress", nested);
                }
            }
            (Some(_), None) => {}
        }
        errors.into_result()
    }
}

/// `POST /api/admin/orders/{id}/status`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

/// Order list query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl OrderFilter {
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_label: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method_id: Option<PaymentMethodId>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub xp_earned: i32,
    pub raffle_id: Option<RaffleId>,
    pub items: Vec<OrderItemView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Kim Lee".to_string(),
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Portland".to_string(),
            region: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_checkout_requires_an_address() {
        let err = Checkout::default().validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "shippingAddress");
    }

    #[test]
    fn test_checkout_rejects_both_addresses() {
        let checkout = Checkout {
            address_id: Some(AddressId::generate()),
            shipping_address: Some(address()),
            payment_method_id: None,
        };
        assert!(checkout.validate().is_err());
    }

    #[test]
    fn test_checkout_validates_inline_address() {
        let mut inline = address();
        inline.country = "usa".to_string();
        let checkout = Checkout {
            shipping_address: Some(inline),
            ..Checkout::default()
        };
        let err = checkout.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "shippingAddress.country");
    }

    #[test]
    fn test_status_update_parses() {
        let update: UpdateOrderStatus = serde_json::from_str(r#"{"status":"shipped"}"#).unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
    }
}
