//! Request validation.
//!
//! Every request DTO implements [`Validate`], which collects *all* field
//! failures instead of stopping at the first one so clients can highlight
//! every bad input in a form at once.

use core::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

/// Largest amount a `NUMERIC(12, 2)` money column can hold.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// camelCase field name as it appears in the JSON payload.
    pub field: String,
    pub message: String,
}

/// All field failures for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Start an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a failure.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    /// Record a failure unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Check that a trimmed string has between `min` and `max` characters.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min {
            if min == 1 {
                self.add(field, "is required");
            } else {
                self.add(field, format!("must be at least {min} characters"));
            }
        } else if len > max {
            self.add(field, format!("must be at most {max} characters"));
        }
    }

    /// Check an optional string's length when present.
    pub fn optional_length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(value) = value {
            self.length(field, value, min, max);
        }
    }

    /// Check that a decimal is a valid non-negative price.
    pub fn price(&mut self, field: &str, value: Decimal) {
        if value.is_sign_negative() && !value.is_zero() {
            self.add(field, "cannot be negative");
        } else {
            self.price_modifier(field, value);
        }
    }

    /// Check a signed price adjustment: two decimals, within column range.
    pub fn price_modifier(&mut self, field: &str, value: Decimal) {
        if value.normalize().scale() > 2 {
            self.add(field, "must have at most 2 decimal places");
        } else if value.abs() > MAX_PRICE {
            self.add(field, format!("must be at most {MAX_PRICE}"));
        }
    }

    /// Check that an integer lies within `min..=max`.
    pub fn range<T>(&mut self, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if value < min || value > max {
            self.add(field, format!("must be between {min} and {max}"));
        }
    }

    /// Merge failures from a nested object, prefixing field names.
    pub fn nested(&mut self, prefix: &str, other: Self) {
        for error in other.0 {
            self.0.push(FieldError {
                field: format!("{prefix}.{}", error.field),
                message: error.message,
            });
        }
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every request payload.
pub trait Validate {
    /// Check all fields.
    ///
    /// # Errors
    ///
    /// Returns every field failure found.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Whether `s` is a URL slug: lowercase ASCII letters, digits, and single
/// hyphens, not starting or ending with a hyphen.
#[must_use]
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Turn arbitrary text into a slug (`"Air Max 90!"` → `"air-max-90"`).
#[must_use]
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_hyphen = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Whether `s` is an uppercase ISO 3166-1 alpha-2 shaped code.
#[must_use]
pub fn is_country_code(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_failures() {
        let mut errors = ValidationErrors::new();
        errors.length("name", "", 1, 10);
        errors.range("quantity", 0, 1, 10);
        errors.check(false, "slug", "is invalid");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.errors().len(), 3);
        assert_eq!(err.errors()[0].message, "is required");
        assert_eq!(err.errors()[1].message, "must be between 1 and 10");
    }

    #[test]
    fn test_length_counts_chars_after_trim() {
        let mut errors = ValidationErrors::new();
        errors.length("name", "  ab  ", 3, 10);
        errors.length("title", "ééé", 1, 3);
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].field, "name");
    }

    #[test]
    fn test_price() {
        let mut errors = ValidationErrors::new();
        errors.price("a", Decimal::new(-1, 0));
        errors.price("b", Decimal::new(1_999, 3));
        errors.price("c", Decimal::new(1_990, 3));
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_price_upper_bound() {
        let mut errors = ValidationErrors::new();
        errors.price("max", MAX_PRICE);
        assert!(errors.is_empty());

        errors.price("over", Decimal::new(12_345_678_901_200, 2));
        errors.price_modifier("under", -Decimal::new(10_000_000_000_000, 2));
        errors.price_modifier("discount", Decimal::new(-500, 2));
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["over", "under"]);
        assert_eq!(errors.errors()[0].message, "must be at most 9999999999.99");
    }

    #[test]
    fn test_nested_prefixes_fields() {
        let mut inner = ValidationErrors::new();
        inner.add("city", "is required");
        let mut outer = ValidationErrors::new();
        outer.nested("shippingAddress", inner);
        assert_eq!(outer.errors()[0].field, "shippingAddress.city");
    }

    #[test]
    fn test_is_slug() {
        assert!(is_slug("air-max-90"));
        assert!(!is_slug("Air-Max"));
        assert!(!is_slug("-leading"));
        assert!(!is_slug("double--hyphen"));
        assert!(!is_slug(""));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Air Max 90!"), "air-max-90");
        assert_eq!(slugify("  --Jordan  1 Retro-- "), "jordan-1-retro");
        assert!(is_slug(&slugify("Yeezy Boost 350 V2 'Zebra'")));
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "is invalid");
        errors.add("password", "is too short");
        assert_eq!(errors.to_string(), "email is invalid; password is too short");
    }
}
