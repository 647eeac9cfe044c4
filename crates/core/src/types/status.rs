//! Status enums for various entities.
//!
//! Each enum maps to a `PostgreSQL` enum type of the same snake_case name
//! (with the `postgres` feature) and serializes as snake_case JSON.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Marketplace seller who can own products.
    Seller,
    /// Back-office operator.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Seller => write!(f, "seller"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Order lifecycle status.
///
/// ```text
/// pending -> paid -> shipped -> delivered
///    |        |
///    +--------+--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether the order may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether a customer may still cancel the order.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the order counts towards revenue.
    #[must_use]
    pub const fn is_revenue(self) -> bool {
        matches!(self, Self::Paid | Self::Shipped | Self::Delivered)
    }
}

/// Raffle lifecycle status.
///
/// ```text
/// draft -> open -> closed -> drawing -> completed
///   |        |        |
///   +--------+--------+--> cancelled
/// ```
///
/// An `open` raffle whose entry window has ended may go straight to `drawing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "raffle_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    #[default]
    Draft,
    Open,
    Closed,
    Drawing,
    Completed,
    Cancelled,
}

impl RaffleStatus {
    /// Whether the raffle may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Open | Self::Cancelled)
                | (Self::Open, Self::Closed | Self::Drawing | Self::Cancelled)
                | (Self::Closed, Self::Drawing | Self::Cancelled)
                | (Self::Drawing, Self::Completed)
        )
    }

    /// Whether the raffle definition (title, dates, price) may still be edited.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Open)
    }

    /// Whether customers can see the raffle.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        !matches!(self, Self::Draft)
    }
}

/// Status of a single raffle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "entry_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Waiting in the draw pool.
    #[default]
    Entered,
    /// Currently holds the purchase right.
    Selected,
    /// Claimed and bought the item.
    Purchased,
    /// Gave up the purchase right.
    Declined,
    /// Missed the purchase deadline.
    Expired,
}

impl EntryStatus {
    /// Whether the entry may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Entered, Self::Selected)
                | (Self::Selected, Self::Purchased | Self::Declined | Self::Expired)
        )
    }

    /// Whether the entry can still be drawn.
    #[must_use]
    pub const fn is_in_pool(self) -> bool {
        matches!(self, Self::Entered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Paid));
    }

    #[test]
    fn test_order_terminal_states_have_no_exits() {
        let all = [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ];
        for from in all.into_iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_raffle_transitions() {
        assert!(RaffleStatus::Draft.can_transition_to(RaffleStatus::Open));
        assert!(RaffleStatus::Open.can_transition_to(RaffleStatus::Drawing));
        assert!(RaffleStatus::Closed.can_transition_to(RaffleStatus::Drawing));
        assert!(RaffleStatus::Drawing.can_transition_to(RaffleStatus::Completed));
        assert!(!RaffleStatus::Drawing.can_transition_to(RaffleStatus::Cancelled));
        assert!(!RaffleStatus::Completed.can_transition_to(RaffleStatus::Open));
        assert!(!RaffleStatus::Draft.can_transition_to(RaffleStatus::Drawing));
    }

    #[test]
    fn test_entry_transitions() {
        assert!(EntryStatus::Entered.can_transition_to(EntryStatus::Selected));
        assert!(EntryStatus::Selected.can_transition_to(EntryStatus::Expired));
        assert!(!EntryStatus::Entered.can_transition_to(EntryStatus::Purchased));
        assert!(!EntryStatus::Declined.can_transition_to(EntryStatus::Selected));
    }

    #[test]
    fn test_user_role_round_trip_str() {
        for role in [UserRole::Customer, UserRole::Seller, UserRole::Admin] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
        assert!("root".parse::<UserRole>().is_err());
    }
}
