//! Whole raffle flows driven through the shared rules.
//!
//! A small in-memory raffle stands in for the database rows; each step asks
//! `brandbazaar_core::raffle` what may happen and applies the answer the way
//! the raffle service does inside its transaction.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use brandbazaar_core::raffle::{
    Advance, ClaimDenied, EntryDenied, EntryWindow, WinnerState, advance, can_enter,
    can_start_drawing, check_claim, is_deadline_passed,
};
use brandbazaar_core::{EntryStatus, LevelTier, RaffleStatus, UserId};

struct Entry {
    user: UserId,
    status: EntryStatus,
}

struct Raffle {
    status: RaffleStatus,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    min_level: LevelTier,
    max_entries: Option<i32>,
    window_hours: i32,
    entries: Vec<Entry>,
    winner: Option<UserId>,
    deadline: Option<DateTime<Utc>>,
}

impl Raffle {
    fn open(now: DateTime<Utc>) -> Self {
        Self {
            status: RaffleStatus::Open,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::days(2),
            min_level: LevelTier::Hobbyist,
            max_entries: None,
            window_hours: 24,
            entries: Vec::new(),
            winner: None,
            deadline: None,
        }
    }

    fn window(&self) -> EntryWindow {
        EntryWindow {
            status: self.status,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            min_level: self.min_level,
            max_entries: self.max_entries,
            entry_count: i64::try_from(self.entries.len()).unwrap(),
        }
    }

    fn enter(&mut self, user: UserId, level: LevelTier, now: DateTime<Utc>) -> Result<(), EntryDenied> {
        let already = self.entries.iter().any(|e| e.user == user);
        can_enter(&self.window(), level, already, now)?;
        self.entries.push(Entry {
            user,
            status: EntryStatus::Entered,
        });
        Ok(())
    }

    fn set_status(&mut self, next: RaffleStatus) {
        assert!(
            self.status.can_transition_to(next),
            "{:?} -> {next:?}",
            self.status
        );
        self.status = next;
    }

    fn entry_mut(&mut self, user: UserId) -> &mut Entry {
        self.entries.iter_mut().find(|e| e.user == user).unwrap()
    }

    fn move_entry(&mut self, user: UserId, next: EntryStatus) {
        let entry = self.entry_mut(user);
        assert!(entry.status.can_transition_to(next));
        entry.status = next;
    }

    /// Pick the next winner, or complete when nobody is left.
    fn draw(&mut self, now: DateTime<Utc>, rng: &mut StdRng) {
        let pool: Vec<UserId> = self
            .entries
            .iter()
            .filter(|e| e.status.is_in_pool())
            .map(|e| e.user)
            .collect();
        match advance(&pool, self.window_hours, now, rng) {
            Advance::Selected { entry, deadline } => {
                self.move_entry(entry, EntryStatus::Selected);
                self.winner = Some(entry);
                self.deadline = Some(deadline);
            }
            Advance::Exhausted => {
                self.winner = None;
                self.deadline = None;
                self.set_status(RaffleStatus::Completed);
            }
        }
    }

    fn start_drawing(&mut self, now: DateTime<Utc>, rng: &mut StdRng) {
        assert!(can_start_drawing(self.status, self.ends_at, now));
        self.set_status(RaffleStatus::Drawing);
        self.draw(now, rng);
    }

    fn winner_state(&self) -> WinnerState {
        WinnerState {
            status: self.status,
            current_winner: self.winner,
            deadline: self.deadline,
        }
    }

    fn claim(&mut self, user: UserId, now: DateTime<Utc>) -> Result<(), ClaimDenied> {
        check_claim(&self.winner_state(), user, now)?;
        self.move_entry(user, EntryStatus::Purchased);
        self.set_status(RaffleStatus::Completed);
        Ok(())
    }

    fn decline(&mut self, user: UserId, now: DateTime<Utc>, rng: &mut StdRng) -> Result<(), ClaimDenied> {
        check_claim(&self.winner_state(), user, now)?;
        self.move_entry(user, EntryStatus::Declined);
        self.draw(now, rng);
        Ok(())
    }

    /// What the background sweep does for this raffle.
    fn sweep(&mut self, now: DateTime<Utc>, rng: &mut StdRng) -> bool {
        if self.status != RaffleStatus::Drawing || !is_deadline_passed(self.deadline, now) {
            return false;
        }
        if let Some(winner) = self.winner {
            self.move_entry(winner, EntryStatus::Expired);
        }
        self.draw(now, rng);
        true
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn users(n: usize) -> Vec<UserId> {
    (0..n).map(|_| UserId::generate()).collect()
}

#[test]
fn test_first_winner_claims() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = now();
    let mut raffle = Raffle::open(t);
    let entrants = users(5);
    for user in &entrants {
        raffle.enter(*user, LevelTier::Hobbyist, t).unwrap();
    }

    raffle.set_status(RaffleStatus::Closed);
    raffle.start_drawing(t + Duration::days(3), &mut rng);

    let winner = raffle.winner.unwrap();
    assert!(entrants.contains(&winner));
    assert_eq!(raffle.deadline, Some(t + Duration::days(3) + Duration::hours(24)));

    raffle.claim(winner, t + Duration::days(3) + Duration::hours(2)).unwrap();
    assert_eq!(raffle.status, RaffleStatus::Completed);
    assert_eq!(raffle.entry_mut(winner).status, EntryStatus::Purchased);
}

#[test]
fn test_only_the_current_winner_may_claim() {
    let mut rng = StdRng::seed_from_u64(1);
    let t = now();
    let mut raffle = Raffle::open(t);
    let entrants = users(3);
    for user in &entrants {
        raffle.enter(*user, LevelTier::Hobbyist, t).unwrap();
    }
    raffle.start_drawing(raffle.ends_at, &mut rng);

    let winner = raffle.winner.unwrap();
    let loser = *entrants.iter().find(|u| **u != winner).unwrap();
    assert_eq!(raffle.claim(loser, raffle.ends_at), Err(ClaimDenied::NotWinner));
}

#[test]
fn test_lapsed_winners_are_replaced_until_the_pool_is_empty() {
    let mut rng = StdRng::seed_from_u64(42);
    let t = now();
    let mut raffle = Raffle::open(t);
    let entrants = users(3);
    for user in &entrants {
        raffle.enter(*user, LevelTier::Hobbyist, t).unwrap();
    }

    let mut clock = raffle.ends_at;
    raffle.start_drawing(clock, &mut rng);

    let mut seen = Vec::new();
    while raffle.status == RaffleStatus::Drawing {
        let winner = raffle.winner.unwrap();
        assert!(!seen.contains(&winner), "an expired entrant was drawn again");
        seen.push(winner);

        // Nothing happens before the deadline.
        assert!(!raffle.sweep(clock + Duration::hours(23), &mut rng));

        clock += Duration::hours(24);
        assert_eq!(raffle.claim(winner, clock), Err(ClaimDenied::DeadlinePassed));
        assert!(raffle.sweep(clock, &mut rng));
    }

    assert_eq!(seen.len(), entrants.len());
    assert_eq!(raffle.status, RaffleStatus::Completed);
    assert!(raffle.winner.is_none());
    assert!(raffle.entries.iter().all(|e| e.status == EntryStatus::Expired));
}

#[test]
fn test_decline_passes_the_right_on() {
    let mut rng = StdRng::seed_from_u64(3);
    let t = now();
    let mut raffle = Raffle::open(t);
    for user in users(2) {
        raffle.enter(user, LevelTier::Hobbyist, t).unwrap();
    }
    raffle.start_drawing(raffle.ends_at, &mut rng);

    let first = raffle.winner.unwrap();
    raffle.decline(first, raffle.ends_at, &mut rng).unwrap();
    let second = raffle.winner.unwrap();
    assert_ne!(first, second);
    assert_eq!(raffle.entry_mut(first).status, EntryStatus::Declined);

    raffle.decline(second, raffle.ends_at, &mut rng).unwrap();
    assert_eq!(raffle.status, RaffleStatus::Completed);
    assert!(raffle.winner.is_none());
}

#[test]
fn test_raffle_without_entries_completes_immediately() {
    let mut rng = StdRng::seed_from_u64(0);
    let t = now();
    let mut raffle = Raffle::open(t);
    raffle.start_drawing(raffle.ends_at, &mut rng);
    assert_eq!(raffle.status, RaffleStatus::Completed);
}

#[test]
fn test_entry_rules() {
    let t = now();
    let mut raffle = Raffle::open(t);
    raffle.min_level = LevelTier::Enthusiast;
    raffle.max_entries = Some(1);
    let [a, b] = [UserId::generate(), UserId::generate()];

    assert!(matches!(
        raffle.enter(a, LevelTier::Hobbyist, t),
        Err(EntryDenied::LevelTooLow { .. })
    ));
    raffle.enter(a, LevelTier::Enthusiast, t).unwrap();
    assert_eq!(raffle.enter(a, LevelTier::Enthusiast, t), Err(EntryDenied::AlreadyEntered));
    assert_eq!(raffle.enter(b, LevelTier::Sneakerhead, t), Err(EntryDenied::Full));
    assert_eq!(
        raffle.enter(b, LevelTier::Sneakerhead, raffle.ends_at),
        Err(EntryDenied::Ended)
    );

    raffle.set_status(RaffleStatus::Closed);
    assert_eq!(raffle.enter(b, LevelTier::Sneakerhead, t), Err(EntryDenied::NotOpen));
}

#[test]
fn test_cannot_draw_while_entries_are_open() {
    let t = now();
    let raffle = Raffle::open(t);
    assert!(!can_start_drawing(raffle.status, raffle.ends_at, t));
    assert!(!can_start_drawing(RaffleStatus::Draft, raffle.ends_at, raffle.ends_at));
    assert!(!RaffleStatus::Completed.can_transition_to(RaffleStatus::Drawing));
}
