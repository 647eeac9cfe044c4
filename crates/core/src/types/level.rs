//! XP levels and perk tiers.

use serde::{Deserialize, Serialize};

/// Gamification tier derived from a user's XP.
///
/// Tiers are ordered, so `user_tier >= raffle.min_level` is the perk check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "level_tier", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    #[default]
    Hobbyist,
    Enthusiast,
    Sneakerhead,
}

impl LevelTier {
    /// XP needed to reach Enthusiast.
    pub const ENTHUSIAST_XP: i64 = 1_000;
    /// XP needed to reach Sneakerhead.
    pub const SNEAKERHEAD_XP: i64 = 5_000;

    /// Tier for a given XP total. Negative XP counts as zero.
    #[must_use]
    pub const fn from_xp(xp: i64) -> Self {
        if xp >= Self::SNEAKERHEAD_XP {
            Self::Sneakerhead
        } else if xp >= Self::ENTHUSIAST_XP {
            Self::Enthusiast
        } else {
            Self::Hobbyist
        }
    }

    /// Minimum XP for this tier.
    #[must_use]
    pub const fn threshold(self) -> i64 {
        match self {
            Self::Hobbyist => 0,
            Self::Enthusiast => Self::ENTHUSIAST_XP,
            Self::Sneakerhead => Self::SNEAKERHEAD_XP,
        }
    }

    /// The tier above this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Hobbyist => Some(Self::Enthusiast),
            Self::Enthusiast => Some(Self::Sneakerhead),
            Self::Sneakerhead => None,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hobbyist => "Hobbyist",
            Self::Enthusiast => "Enthusiast",
            Self::Sneakerhead => "Sneakerhead",
        }
    }
}

impl std::fmt::Display for LevelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A user's position on the XP ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub xp: i64,
    pub level: LevelTier,
    pub next_level: Option<LevelTier>,
    /// XP still needed for the next tier; `None` at the top tier.
    pub xp_to_next_level: Option<i64>,
}

impl LevelProgress {
    /// Compute progress for an XP total.
    #[must_use]
    pub fn from_xp(xp: i64) -> Self {
        let xp = xp.max(0);
        let level = LevelTier::from_xp(xp);
        let next_level = level.next();
        Self {
            xp,
            level,
            next_level,
            xp_to_next_level: next_level.map(|next| next.threshold() - xp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(LevelTier::from_xp(-5), LevelTier::Hobbyist);
        assert_eq!(LevelTier::from_xp(0), LevelTier::Hobbyist);
        assert_eq!(LevelTier::from_xp(999), LevelTier::Hobbyist);
        assert_eq!(LevelTier::from_xp(1_000), LevelTier::Enthusiast);
        assert_eq!(LevelTier::from_xp(4_999), LevelTier::Enthusiast);
        assert_eq!(LevelTier::from_xp(5_000), LevelTier::Sneakerhead);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(LevelTier::Sneakerhead > LevelTier::Enthusiast);
        assert!(LevelTier::Enthusiast > LevelTier::Hobbyist);
    }

    #[test]
    fn test_progress() {
        let progress = LevelProgress::from_xp(1_250);
        assert_eq!(progress.level, LevelTier::Enthusiast);
        assert_eq!(progress.next_level, Some(LevelTier::Sneakerhead));
        assert_eq!(progress.xp_to_next_level, Some(3_750));

        let top = LevelProgress::from_xp(9_000);
        assert_eq!(top.next_level, None);
        assert_eq!(top.xp_to_next_level, None);
    }
}
