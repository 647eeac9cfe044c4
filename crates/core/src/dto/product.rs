//! Catalog payloads: products, variants, and list filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::pagination::PageRequest;
use crate::types::{Money, ProductId, UserId, VariantId};
use crate::validation::{Validate, ValidationErrors, is_slug, slugify};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_SLUG_LENGTH: usize = 120;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_SKU_LENGTH: usize = 64;

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn check_image_url(errors: &mut ValidationErrors, url: Option<&str>) {
    if let Some(url) = url {
        errors.check(
            url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/'),
            "imageUrl",
            "must be an http(s) URL or an absolute path",
        );
        errors.length("imageUrl", url, 1, 2_048);
    }
}

fn check_slug(errors: &mut ValidationErrors, slug: &str) {
    errors.length("slug", slug, 1, MAX_SLUG_LENGTH);
    errors.check(
        slug.is_empty() || is_slug(slug),
        "slug",
        "must contain only lowercase letters, digits, and hyphens",
    );
}

/// `POST /api/admin/products/{id}/variants`, also nested in [`CreateProduct`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariant {
    pub sku: String,
    pub size: String,
    pub color: String,
    pub stock: i32,
    #[serde(default)]
    pub price_modifier: Decimal,
}

impl Validate for CreateVariant {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("sku", &self.sku, 1, MAX_SKU_LENGTH);
        errors.length("size", &self.size, 1, 32);
        errors.length("color", &self.color, 1, 64);
        errors.check(self.stock >= 0, "stock", "cannot be negative");
        errors.price_modifier("priceModifier", self.price_modifier);
        errors.into_result()
    }
}

/// `PATCH /api/admin/variants/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVariant {
    pub sku: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub stock: Option<i32>,
    pub price_modifier: Option<Decimal>,
}

impl Validate for UpdateVariant {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_length("sku", self.sku.as_deref(), 1, MAX_SKU_LENGTH);
        errors.optional_length("size", self.size.as_deref(), 1, 32);
        errors.optional_length("color", self.color.as_deref(), 1, 64);
        if let Some(stock) = self.stock {
            errors.check(stock >= 0, "stock", "cannot be negative");
        }
        if let Some(modifier) = self.price_modifier {
            errors.price_modifier("priceModifier", modifier);
        }
        errors.into_result()
    }
}

/// `POST /api/admin/products`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub brand: String,
    pub category: String,
    pub base_price: Decimal,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    pub seller_id: Option<UserId>,
    #[serde(default)]
    pub variants: Vec<CreateVariant>,
}

const fn default_true() -> bool {
    true
}

impl CreateProduct {
    /// The slug to store: the explicit one, or one derived from the name.
    #[must_use]
    pub fn resolved_slug(&self) -> String {
        self.slug
            .as_deref()
            .map_or_else(|| slugify(&self.name), |s| s.trim().to_owned())
    }
}

impl Validate for CreateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("name", &self.name, 1, MAX_NAME_LENGTH);
        check_slug(&mut errors, &self.resolved_slug());
        errors.length("description", &self.description, 0, MAX_DESCRIPTION_LENGTH);
        errors.length("brand", &self.brand, 1, 100);
        errors.length("category", &self.category, 1, 100);
        errors.price("basePrice", self.base_price);
        check_image_url(&mut errors, self.image_url.as_deref());

        let mut skus = std::collections::HashSet::new();
        for (i, variant) in self.variants.iter().enumerate() {
            if let Err(nested) = variant.validate() {
                errors.nested(&format!("variants[{i}]"), nested);
            }
            if !skus.insert(variant.sku.trim()) {
                errors.add(&format!("variants[{i}].sku"), "is duplicated");
            }
        }
        errors.into_result()
    }
}

/// `PATCH /api/admin/products/{id}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub base_price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    /// `Some(None)` unassigns the seller.
    #[serde(default, deserialize_with = "double_option")]
    pub seller_id: Option<Option<UserId>>,
}

impl Validate for UpdateProduct {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_length("name", self.name.as_deref(), 1, MAX_NAME_LENGTH);
        if let Some(slug) = &self.slug {
            check_slug(&mut errors, slug);
        }
        errors.optional_length(
            "description",
            self.description.as_deref(),
            0,
            MAX_DESCRIPTION_LENGTH,
        );
        errors.optional_length("brand", self.brand.as_deref(), 1, 100);
        errors.optional_length("category", self.category.as_deref(), 1, 100);
        if let Some(price) = self.base_price {
            errors.price("basePrice", price);
        }
        check_image_url(&mut errors, self.image_url.as_ref().and_then(Option::as_deref));
        errors.into_result()
    }
}

/// `POST /api/admin/products/{id}/visibility`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibility {
    pub is_public: bool,
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ProductSort {
    /// SQL `ORDER BY` clause. Only fixed strings, never user input.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Newest => r#"p."createdAt" DESC, p.id"#,
            Self::PriceAsc => r#"p."basePrice" ASC, p.id"#,
            Self::PriceDesc => r#"p."basePrice" DESC, p.id"#,
            Self::Name => "p.name ASC, p.id",
        }
    }
}

/// `GET /api/products` query string.
///
/// Page fields are inline rather than a flattened [`PageRequest`] because
/// query-string deserialization cannot parse numbers through `flatten`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub q: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: ProductSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProductFilter {
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// `q` wrapped for `ILIKE`, with wildcards in the input escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(like_pattern)
    }
}

/// Wrap `term` as a `%term%` `ILIKE` pattern, escaping `%`, `_`, and `\`.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Validate for ProductFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(min) = self.min_price {
            errors.check(!min.is_sign_negative(), "minPrice", "cannot be negative");
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            errors.check(min <= max, "maxPrice", "must be at least minPrice");
        }
        errors.optional_length("q", self.q.as_deref(), 0, 200);
        errors.into_result()
    }
}

/// Back-office product visibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductVisibility {
    #[default]
    All,
    Public,
    Hidden,
    Deleted,
}

/// `GET /api/admin/products` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub visibility: ProductVisibility,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AdminProductFilter {
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
pub struct VariantView {
    pub id: VariantId,
    pub sku: String,
    pub size: String,
    pub color: String,
    pub stock: i32,
    pub price_modifier: Decimal,
    pub price: Money,
    pub in_stock: bool,
}

/// Aggregate of a product's reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal, `None` without reviews.
    pub average: Option<f64>,
    pub count: i64,
}

/// Catalog list row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub base_price: Money,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

/// Product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub description: String,
    pub seller_id: Option<UserId>,
    pub variants: Vec<VariantView>,
    pub rating: RatingSummary,
}

/// Back-office product view, including hidden and deleted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductView {
    #[serde(flatten)]
    pub detail: ProductDetail,
    pub is_public: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> CreateProduct {
        serde_json::from_value(serde_json::json!({
            "name": "Air Max 90",
            "brand": "Nike",
            "category": "sneakers",
            "basePrice": "129.99",
            "variants": [
                {"sku": "AM90-42-WHT", "size": "42", "color": "white", "stock": 5}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_create_product_defaults() {
        let p = product();
        assert!(p.is_public);
        assert_eq!(p.resolved_slug(), "air-max-90");
        assert_eq!(p.variants[0].price_modifier, Decimal::ZERO);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_create_product_nested_variant_errors() {
        let mut p = product();
        p.slug = Some("Bad Slug".to_string());
        p.variants.push(CreateVariant {
            sku: "AM90-42-WHT".to_string(),
            size: String::new(),
            color: "white".to_string(),
            stock: -1,
            price_modifier: Decimal::ZERO,
        });
        let err = p.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["slug", "variants[1].size", "variants[1].stock", "variants[1].sku"]
        );
    }

    #[test]
    fn test_create_product_rejects_prices_beyond_column_range() {
        let mut p = product();
        p.base_price = Decimal::new(12_345_678_901_200, 2);
        p.variants[0].price_modifier = Decimal::new(-10_000_000_000_000, 2);
        let err = p.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["basePrice", "variants[0].priceModifier"]);
    }

    #[test]
    fn test_update_product_distinguishes_null_from_absent() {
        let absent: UpdateProduct = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.seller_id, None);

        let cleared: UpdateProduct = serde_json::from_str(r#"{"sellerId":null}"#).unwrap();
        assert_eq!(cleared.seller_id, Some(None));
    }

    #[test]
    fn test_filter_price_range() {
        let filter = ProductFilter {
            min_price: Some(Decimal::new(100, 0)),
            max_price: Some(Decimal::new(50, 0)),
            ..ProductFilter::default()
        };
        let err = filter.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "maxPrice");
    }

    #[test]
    fn test_sort_parses_snake_case() {
        let sort: ProductSort = serde_json::from_str(r#""price_desc""#).unwrap();
        assert_eq!(sort, ProductSort::PriceDesc);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        let filter = ProductFilter {
            q: Some("  ".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.search_pattern(), None);
    }
}
