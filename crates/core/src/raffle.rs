//! Raffle eligibility and winner-selection rules.
//!
//! These are the pure decisions behind the raffle flow. Persistence and
//! locking live in the storefront/admin repositories; they load a snapshot,
//! ask this module what to do, and write the outcome in the same transaction.
//!
//! # Winner selection
//!
//! 1. Drawing starts once entries close. `winnerSelectionStartedAt` is set.
//! 2. One entrant still in the pool is picked uniformly at random and holds
//!    the purchase right until `winnerPurchaseDeadline`.
//! 3. If they claim in time the raffle completes. If they decline, or the
//!    deadline passes, their entry leaves the pool and step 2 repeats.
//! 4. When the pool is empty the raffle completes without a winner.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::types::{LevelTier, RaffleStatus, UserId};

/// Why a user may not enter a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryDenied {
    #[error("raffle is not open for entries")]
    NotOpen,
    #[error("raffle has not started yet")]
    NotStarted,
    #[error("raffle entry period has ended")]
    Ended,
    #[error("raffle requires level {required}, you are {actual}")]
    LevelTooLow {
        required: LevelTier,
        actual: LevelTier,
    },
    #[error("you have already entered this raffle")]
    AlreadyEntered,
    #[error("raffle is full")]
    Full,
}

/// Why a user may not claim (or decline) a raffle purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClaimDenied {
    #[error("raffle is not drawing a winner")]
    NotDrawing,
    #[error("you are not the current winner")]
    NotWinner,
    #[error("purchase deadline has passed")]
    DeadlinePassed,
}

/// The raffle fields that entry eligibility depends on.
#[derive(Debug, Clone, Copy)]
pub struct EntryWindow {
    pub status: RaffleStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub min_level: LevelTier,
    pub max_entries: Option<i32>,
    pub entry_count: i64,
}

/// Decide whether a user may enter.
///
/// Checks run in a fixed order so the reported reason is stable: status,
/// window, duplicate entry, level, capacity.
///
/// # Errors
///
/// Returns the first [`EntryDenied`] reason that applies.
pub fn can_enter(
    window: &EntryWindow,
    user_level: LevelTier,
    already_entered: bool,
    now: DateTime<Utc>,
) -> Result<(), EntryDenied> {
    if window.status != RaffleStatus::Open {
        return Err(EntryDenied::NotOpen);
    }
    if now < window.starts_at {
        return Err(EntryDenied::NotStarted);
    }
    if now >= window.ends_at {
        return Err(EntryDenied::Ended);
    }
    if already_entered {
        return Err(EntryDenied::AlreadyEntered);
    }
    if user_level < window.min_level {
        return Err(EntryDenied::LevelTooLow {
            required: window.min_level,
            actual: user_level,
        });
    }
    if let Some(max) = window.max_entries
        && window.entry_count >= i64::from(max)
    {
        return Err(EntryDenied::Full);
    }
    Ok(())
}

/// Whether a raffle in `status` with entries closing at `ends_at` may begin drawing.
#[must_use]
pub fn can_start_drawing(status: RaffleStatus, ends_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match status {
        RaffleStatus::Closed => true,
        RaffleStatus::Open => now >= ends_at,
        _ => false,
    }
}

/// Pick one candidate uniformly at random.
pub fn pick_winner<T: Copy, R: Rng + ?Sized>(candidates: &[T], rng: &mut R) -> Option<T> {
    candidates.choose(rng).copied()
}

/// Deadline for a winner selected at `now`.
#[must_use]
pub fn purchase_deadline(now: DateTime<Utc>, window_hours: i32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(window_hours.max(1)))
}

/// Whether the purchase right selected with `deadline` has lapsed.
#[must_use]
pub fn is_deadline_passed(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_some_and(|d| now >= d)
}

/// The winner-selection columns of a raffle row.
#[derive(Debug, Clone, Copy)]
pub struct WinnerState {
    pub status: RaffleStatus,
    pub current_winner: Option<UserId>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Decide whether `user` may act on the purchase right (claim or decline).
///
/// # Errors
///
/// Returns [`ClaimDenied`] when the raffle is not drawing, `user` is not the
/// current winner, or the deadline has passed.
pub fn check_claim(state: &WinnerState, user: UserId, now: DateTime<Utc>) -> Result<(), ClaimDenied> {
    if state.status != RaffleStatus::Drawing {
        return Err(ClaimDenied::NotDrawing);
    }
    if state.current_winner != Some(user) {
        return Err(ClaimDenied::NotWinner);
    }
    if is_deadline_passed(state.deadline, now) {
        return Err(ClaimDenied::DeadlinePassed);
    }
    Ok(())
}

/// What advancing the draw produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance<T> {
    /// A new entrant holds the purchase right until `deadline`.
    Selected { entry: T, deadline: DateTime<Utc> },
    /// The pool is empty; the raffle completes without a winner.
    Exhausted,
}

/// Advance the draw: pick the next entrant from `pool` or report exhaustion.
pub fn advance<T: Copy, R: Rng + ?Sized>(
    pool: &[T],
    window_hours: i32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Advance<T> {
    pick_winner(pool, rng).map_or(Advance::Exhausted, |entry| Advance::Selected {
        entry,
        deadline: purchase_deadline(now, window_hours),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn window(now: DateTime<Utc>) -> EntryWindow {
        EntryWindow {
            status: RaffleStatus::Open,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(1),
            min_level: LevelTier::Hobbyist,
            max_entries: None,
            entry_count: 0,
        }
    }

    #[test]
    fn test_entry_allowed() {
        let now = Utc::now();
        assert_eq!(can_enter(&window(now), LevelTier::Hobbyist, false, now), Ok(()));
    }

    #[test]
    fn test_entry_denied_reasons() {
        let now = Utc::now();

        let mut w = window(now);
        w.status = RaffleStatus::Draft;
        assert_eq!(can_enter(&w, LevelTier::Hobbyist, false, now), Err(EntryDenied::NotOpen));

        let w = window(now);
        assert_eq!(
            can_enter(&w, LevelTier::Hobbyist, false, w.starts_at - Duration::seconds(1)),
            Err(EntryDenied::NotStarted)
        );
        assert_eq!(
            can_enter(&w, LevelTier::Hobbyist, false, w.ends_at),
            Err(EntryDenied::Ended)
        );
        assert_eq!(
            can_enter(&w, LevelTier::Hobbyist, true, now),
            Err(EntryDenied::AlreadyEntered)
        );

        let mut w = window(now);
        w.min_level = LevelTier::Sneakerhead;
        assert_eq!(
            can_enter(&w, LevelTier::Enthusiast, false, now),
            Err(EntryDenied::LevelTooLow {
                required: LevelTier::Sneakerhead,
                actual: LevelTier::Enthusiast,
            })
        );

        let mut w = window(now);
        w.max_entries = Some(2);
        w.entry_count = 2;
        assert_eq!(can_enter(&w, LevelTier::Hobbyist, false, now), Err(EntryDenied::Full));
    }

    #[test]
    fn test_can_start_drawing() {
        let now = Utc::now();
        assert!(can_start_drawing(RaffleStatus::Closed, now + Duration::days(1), now));
        assert!(can_start_drawing(RaffleStatus::Open, now - Duration::seconds(1), now));
        assert!(!can_start_drawing(RaffleStatus::Open, now + Duration::seconds(1), now));
        assert!(!can_start_drawing(RaffleStatus::Drawing, now, now));
        assert!(!can_start_drawing(RaffleStatus::Draft, now, now));
    }

    #[test]
    fn test_pick_winner_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_winner::<u8, _>(&[], &mut rng), None);
    }

    #[test]
    fn test_pick_winner_reaches_every_candidate() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = [1, 2, 3, 4];
        let seen: HashSet<_> = (0..200).filter_map(|_| pick_winner(&pool, &mut rng)).collect();
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_advance() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        match advance(&[10_u8], 48, now, &mut rng) {
            Advance::Selected { entry, deadline } => {
                assert_eq!(entry, 10);
                assert_eq!(deadline, now + Duration::hours(48));
            }
            Advance::Exhausted => panic!("expected a selection"),
        }
        assert_eq!(advance::<u8, _>(&[], 48, now, &mut rng), Advance::Exhausted);
    }

    #[test]
    fn test_purchase_deadline_minimum_one_hour() {
        let now = Utc::now();
        assert_eq!(purchase_deadline(now, 0), now + Duration::hours(1));
    }

    #[test]
    fn test_check_claim() {
        let now = Utc::now();
        let winner = UserId::generate();
        let state = WinnerState {
            status: RaffleStatus::Drawing,
            current_winner: Some(winner),
            deadline: Some(now + Duration::hours(1)),
        };
        assert_eq!(check_claim(&state, winner, now), Ok(()));
        assert_eq!(
            check_claim(&state, UserId::generate(), now),
            Err(ClaimDenied::NotWinner)
        );
        assert_eq!(
            check_claim(&state, winner, now + Duration::hours(2)),
            Err(ClaimDenied::DeadlinePassed)
        );

        let completed = WinnerState {
            status: RaffleStatus::Completed,
            ..state
        };
        assert_eq!(check_claim(&completed, winner, now), Err(ClaimDenied::NotDrawing));
    }

    #[test]
    fn test_is_deadline_passed() {
        let now = Utc::now();
        assert!(!is_deadline_passed(None, now));
        assert!(is_deadline_passed(Some(now), now));
        assert!(!is_deadline_passed(Some(now + Duration::minutes(1)), now));
    }
}
