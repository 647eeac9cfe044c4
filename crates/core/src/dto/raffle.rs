//! Raffle payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dto::order::Checkout;
use crate::dto::product::double_option;
use crate::pagination::PageRequest;
use crate::types::{
    EntryStatus, LevelProgress, LevelTier, Money, ProductId, RaffleEntryId, RaffleId,
    RaffleStatus, UserId, VariantId,
};
use crate::validation::{Validate, ValidationErrors};

pub const DEFAULT_PURCHASE_WINDOW_HOURS: i32 = 48;
pub const MAX_PURCHASE_WINDOW_HOURS: i32 = 720;

const fn default_window() -> i32 {
    DEFAULT_PURCHASE_WINDOW_HOURS
}

fn check_schedule(errors: &mut ValidationErrors, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) {
    errors.check(ends_at > starts_at, "endsAt", "must be after startsAt");
}

/// `POST /api/admin/raffles`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRaffle {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub product_id: Option<ProductId>,
    pub entry_price: Decimal,
    #[serde(default)]
    pub xp_reward: i32,
    #[serde(default)]
    pub min_level: LevelTier,
    pub max_entries: Option<i32>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default = "default_window")]
    pub purchase_window_hours: i32,
}

impl Validate for CreateRaffle {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("title", &self.title, 1, 200);
        errors.length("description", &self.description, 0, 10_000);
        errors.price("entryPrice", self.entry_price);
        errors.range("xpReward", self.xp_reward, 0, 100_000);
        if let Some(max) = self.max_entries {
            errors.check(max > 0, "maxEntries", "must be positive");
        }
        check_schedule(&mut errors, self.starts_at, self.ends_at);
        errors.range(
            "purchaseWindowHours",
            self.purchase_window_hours,
            1,
            MAX_PURCHASE_WINDOW_HOURS,
        );
        errors.into_result()
    }
}

/// `PATCH /api/admin/raffles/{id}`. Only draft and open raffles are editable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRaffle {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub product_id: Option<Option<ProductId>>,
    pub entry_price: Option<Decimal>,
    pub xp_reward: Option<i32>,
    pub min_level: Option<LevelTier>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_entries: Option<Option<i32>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub purchase_window_hours: Option<i32>,
}

impl UpdateRaffle {
    /// Check the schedule after merging with the stored values.
    ///
    /// # Errors
    ///
    /// Returns a field failure when the merged `endsAt` is not after `startsAt`.
    pub fn validate_schedule(
        &self,
        current_starts_at: DateTime<Utc>,
        current_ends_at: DateTime<Utc>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_schedule(
            &mut errors,
            self.starts_at.unwrap_or(current_starts_at),
            self.ends_at.unwrap_or(current_ends_at),
        );
        errors.into_result()
    }
}

impl Validate for UpdateRaffle {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_length("title", self.title.as_deref(), 1, 200);
        errors.optional_length("description", self.description.as_deref(), 0, 10_000);
        if let Some(price) = self.entry_price {
            errors.price("entryPrice", price);
        }
        if let Some(xp) = self.xp_reward {
            errors.range("xpReward", xp, 0, 100_000);
        }
        if let Some(Some(max)) = self.max_entries {
            errors.check(max > 0, "maxEntries", "must be positive");
        }
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
            check_schedule(&mut errors, starts_at, ends_at);
        }
        if let Some(hours) = self.purchase_window_hours {
            errors.range("purchaseWindowHours", hours, 1, MAX_PURCHASE_WINDOW_HOURS);
        }
        errors.into_result()
    }
}

/// `POST /api/raffles/{id}/claim`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRaffle {
    pub variant_id: VariantId,
    #[serde(flatten)]
    pub delivery: Checkout,
}

impl Validate for ClaimRaffle {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.delivery.validate()
    }
}

/// Raffle list query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleFilter {
    pub status: Option<RaffleStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl RaffleFilter {
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Customer-facing raffle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleView {
    pub id: RaffleId,
    pub title: String,
    pub description: String,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub product_slug: Option<String>,
    pub entry_price: Money,
    pub xp_reward: i32,
    pub min_level: LevelTier,
    pub max_entries: Option<i32>,
    pub entry_count: i64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: RaffleStatus,
    pub purchase_window_hours: i32,
    pub winner_selection_started_at: Option<DateTime<Utc>>,
    pub winner_purchase_deadline: Option<DateTime<Utc>>,
    /// The caller's entry status, when signed in and entered.
    pub my_entry_status: Option<EntryStatus>,
    /// Whether the caller currently holds the purchase right.
    pub is_current_winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleEntryView {
    pub id: RaffleEntryId,
    pub raffle_id: RaffleId,
    pub user_id: UserId,
    pub user_email: Option<String>,
    pub display_name: Option<String>,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Back-office raffle view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRaffleView {
    #[serde(flatten)]
    pub raffle: RaffleView,
    pub current_winner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response to `POST /api/raffles/{id}/enter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaffleEntered {
    pub entry: RaffleEntryView,
    pub xp_awarded: i32,
    pub level: LevelProgress,
}
