//! Address book and saved payment method types.

use chrono::{DateTime, Utc};

use brandbazaar_core::dto::{AddressView, CardBrand, PaymentMethodView, ShippingAddress};
use brandbazaar_core::{AddressId, PaymentMethodId, UserId};

#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub full_name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// The snapshot copied onto orders shipped here.
    #[must_use]
    pub fn shipping(&self) -> ShippingAddress {
        ShippingAddress {
            full_name: self.full_name.clone(),
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.trim().to_owned(),
            phone: self.phone.clone(),
        }
    }

    #[must_use]
    pub fn view(&self) -> AddressView {
        AddressView {
            id: self.id,
            label: self.label.clone(),
            address: self.shipping(),
            is_default: self.is_default,
        }
    }
}

/// Tokenized card metadata.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub user_id: UserId,
    pub brand: String,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub holder_name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    #[must_use]
    pub fn view(&self) -> PaymentMethodView {
        PaymentMethodView {
            id: self.id,
            brand: self.brand.parse().unwrap_or(CardBrand::Other),
            last4: self.last4.clone(),
            exp_month: self.exp_month,
            exp_year: self.exp_year,
            holder_name: self.holder_name.clone(),
            is_default: self.is_default,
        }
    }
}
