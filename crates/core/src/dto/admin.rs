//! Back-office payloads: user management and dashboard stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::auth::UserView;
use crate::pagination::PageRequest;
use crate::types::{Money, OrderStatus, ProductId, UserRole, VariantId};
use crate::validation::{Validate, ValidationErrors};

/// Variants with fewer units than this show up on the dashboard.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Largest single XP adjustment, either way.
pub const MAX_XP_ADJUSTMENT: i32 = 100_000;

/// `GET /api/admin/users` query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Matches email or display name.
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl UserFilter {
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }

    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(crate::dto::product::like_pattern)
    }
}

/// `POST /api/admin/users/{id}/role`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRole {
    pub role: UserRole,
}

/// `POST /api/admin/users/{id}/xp`. The result is floored at zero.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustXp {
    pub delta: i32,
}

impl Validate for AdjustXp {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.delta != 0, "delta", "must not be zero");
        errors.range("delta", self.delta, -MAX_XP_ADJUSTMENT, MAX_XP_ADJUSTMENT);
        errors.into_result()
    }
}

/// A user as the back office sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    #[serde(flatten)]
    pub user: UserView,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockVariant {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub stock: i32,
}

/// `GET /api/admin/dashboard`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_count: i64,
    pub public_product_count: i64,
    pub orders_by_status: Vec<OrderStatusCount>,
    /// Paid, shipped, and delivered orders.
    pub revenue: Money,
    pub open_raffle_count: i64,
    pub low_stock_variants: Vec<LowStockVariant>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_xp_bounds() {
        assert!(AdjustXp { delta: -250 }.validate().is_ok());
        assert!(AdjustXp { delta: 0 }.validate().is_err());
        assert!(AdjustXp {
            delta: MAX_XP_ADJUSTMENT + 1
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_user_filter_from_query() {
        let filter: UserFilter = serde_json::from_value(serde_json::json!({
            "role": "seller",
            "q": "  kim ",
        }))
        .unwrap();
        assert_eq!(filter.role, Some(UserRole::Seller));
        assert_eq!(filter.search_pattern().as_deref(), Some("%kim%"));
    }
}
