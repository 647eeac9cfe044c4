//! Address book and saved payment methods.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::order::ShippingAddress;
use crate::types::{AddressId, PaymentMethodId};
use crate::validation::{Validate, ValidationErrors};

/// `POST /api/account/addresses`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddress {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub address: ShippingAddress,
    #[serde(default)]
    pub is_default: bool,
}

impl Validate for CreateAddress {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("label", &self.label, 0, 50);
        if let Err(nested) = self.address.validate() {
            for e in nested.errors() {
                errors.add(&e.field, e.message.clone());
            }
        }
        errors.into_result()
    }
}

/// `PATCH /api/account/addresses/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddress {
    pub label: Option<String>,
    pub full_name: Option<String>,
    pub line1: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::product::double_option")]
    pub line2: Option<Option<String>>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::product::double_option")]
    pub phone: Option<Option<String>>,
    pub is_default: Option<bool>,
}

impl UpdateAddress {
    /// Apply the changes to a stored address.
    pub fn apply(&self, label: &mut String, address: &mut ShippingAddress) {
        if let Some(v) = &self.label {
            v.trim().clone_into(label);
        }
        if let Some(v) = &self.full_name {
            v.trim().clone_into(&mut address.full_name);
        }
        if let Some(v) = &self.line1 {
            v.trim().clone_into(&mut address.line1);
        }
        if let Some(v) = &self.line2 {
            address.line2.clone_from(v);
        }
        if let Some(v) = &self.city {
            v.trim().clone_into(&mut address.city);
        }
        if let Some(v) = &self.region {
            v.trim().clone_into(&mut address.region);
        }
        if let Some(v) = &self.postal_code {
            v.trim().clone_into(&mut address.postal_code);
        }
        if let Some(v) = &self.country {
            v.trim().clone_into(&mut address.country);
        }
        if let Some(v) = &self.phone {
            address.phone.clone_from(v);
        }
    }
}

impl Validate for UpdateAddress {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_length("label", self.label.as_deref(), 0, 50);
        errors.optional_length("fullName", self.full_name.as_deref(), 1, 120);
        errors.optional_length("line1", self.line1.as_deref(), 1, 200);
        errors.optional_length("city", self.city.as_deref(), 1, 100);
        errors.optional_length("postalCode", self.postal_code.as_deref(), 1, 20);
        if let Some(country) = &self.country {
            errors.check(
                crate::validation::is_country_code(country),
                "country",
                "must be a two-letter uppercase country code",
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
    pub id: AddressId,
    pub label: String,
    #[serde(flatten)]
    pub address: ShippingAddress,
    pub is_default: bool,
}

/// Card brands accepted for saved payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Other,
}

impl CardBrand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for CardBrand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "amex" => Ok(Self::Amex),
            "discover" => Ok(Self::Discover),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid card brand: {s}")),
        }
    }
}

/// `POST /api/account/payment-methods`
///
/// Only tokenized card metadata is accepted; full card numbers never reach
/// the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentMethod {
    pub brand: CardBrand,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: i32,
    pub holder_name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CreatePaymentMethod {
    /// Validate against an explicit clock.
    ///
    /// # Errors
    ///
    /// Returns every field failure found.
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            self.last4.len() == 4 && self.last4.bytes().all(|b| b.is_ascii_digit()),
            "last4",
            "must be exactly four digits",
        );
        errors.range("expMonth", self.exp_month, 1, 12);
        errors.range("expYear", self.exp_year, 2000, 2100);
        let expired = (self.exp_year, self.exp_month) < (now.year(), now.month());
        errors.check(!expired, "expYear", "card has expired");
        errors.length("holderName", &self.holder_name, 1, 120);
        errors.into_result()
    }
}

impl Validate for CreatePaymentMethod {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.validate_at(Utc::now())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodView {
    pub id: PaymentMethodId,
    pub brand: CardBrand,
    pub last4: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub holder_name: String,
    pub is_default: bool,
}
