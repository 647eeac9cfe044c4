//! Raffle domain types.

use chrono::{DateTime, Utc};

use brandbazaar_core::dto::{AdminRaffleView, RaffleView};
use brandbazaar_core::raffle::{EntryWindow, WinnerState};
use brandbazaar_core::{
    EntryStatus, LevelTier, Money, ProductId, RaffleEntryId, RaffleId, RaffleStatus, UserId,
};

#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Raffle {
    pub id: RaffleId,
    pub title: String,
    pub description: String,
    pub product_id: Option<ProductId>,
    pub entry_price: Money,
    pub xp_reward: i32,
    pub min_level: LevelTier,
    pub max_entries: Option<i32>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: RaffleStatus,
    pub purchase_window_hours: i32,
    pub winner_selection_started_at: Option<DateTime<Utc>>,
    pub current_winner_id: Option<UserId>,
    pub winner_purchase_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Raffle {
    #[must_use]
    pub const fn entry_window(&self, entry_count: i64) -> EntryWindow {
        EntryWindow {
            status: self.status,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            min_level: self.min_level,
            max_entries: self.max_entries,
            entry_count,
        }
    }

    #[must_use]
    pub const fn winner_state(&self) -> WinnerState {
        WinnerState {
            status: self.status,
            current_winner: self.current_winner_id,
            deadline: self.winner_purchase_deadline,
        }
    }
}

/// A raffle row joined with what list views display alongside it.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct RaffleListing {
    #[sqlx(flatten)]
    pub raffle: Raffle,
    pub product_name: Option<String>,
    pub product_slug: Option<String>,
    pub entry_count: i64,
    /// The viewer's entry status; always `None` for anonymous listings.
    pub my_entry_status: Option<EntryStatus>,
}

impl RaffleListing {
    /// Customer view for `viewer`.
    #[must_use]
    pub fn view(&self, viewer: Option<UserId>) -> RaffleView {
        let r = &self.raffle;
        RaffleView {
            id: r.id,
            title: r.title.clone(),
            description: r.description.clone(),
            product_id: r.product_id,
            product_name: self.product_name.clone(),
            product_slug: self.product_slug.clone(),
            entry_price: r.entry_price,
            xp_reward: r.xp_reward,
            min_level: r.min_level,
            max_entries: r.max_entries,
            entry_count: self.entry_count,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            status: r.status,
            purchase_window_hours: r.purchase_window_hours,
            winner_selection_started_at: r.winner_selection_started_at,
            winner_purchase_deadline: r.winner_purchase_deadline,
            my_entry_status: self.my_entry_status,
            is_current_winner: viewer.is_some() && r.current_winner_id == viewer,
        }
    }

    #[must_use]
    pub fn admin_view(&self) -> AdminRaffleView {
        AdminRaffleView {
            raffle: self.view(None),
            current_winner_id: self.raffle.current_winner_id,
            created_at: self.raffle.created_at,
            updated_at: self.raffle.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct RaffleEntry {
    pub id: RaffleEntryId,
    pub raffle_id: RaffleId,
    pub user_id: UserId,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
