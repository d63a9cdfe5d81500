//! Rank tiers per skill track.
//!
//! Each table is ordered by ascending threshold and starts at zero, so every
//! experience value matches at least the first tier. A tier's position in
//! its table is the experience bonus it grants to yields.

use nationstate_types::SkillTrack;

/// A rank: the experience needed to hold it and its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    /// Minimum experience for this rank.
    pub threshold: u64,
    /// Rank title.
    pub title: &'static str,
}

const fn tier(threshold: u64, title: &'static str) -> Tier {
    Tier { threshold, title }
}

/// Military track ranks.
pub const MILITARY_TIERS: &[Tier] = &[
    tier(0, "Private I"),
    tier(100, "Private II"),
    tier(250, "Private III"),
    tier(500, "Private IV"),
    tier(1000, "Sergeant I"),
    tier(2000, "Sergeant II"),
];

/// Economist track ranks.
pub const ECONOMIST_TIERS: &[Tier] = &[
    tier(0, "Farmer I"),
    tier(100, "Farmer II"),
    tier(250, "Merchant I"),
    tier(500, "Treasurer I"),
    tier(1000, "Baron"),
    tier(2000, "Chancellor"),
];

/// Scout track ranks.
pub const SCOUT_TIERS: &[Tier] = &[
    tier(0, "Explorer I"),
    tier(100, "Explorer II"),
    tier(250, "Ranger I"),
    tier(500, "Cartographer"),
];

/// Diplomat track ranks.
pub const DIPLOMAT_TIERS: &[Tier] = &[
    tier(0, "Envoy I"),
    tier(100, "Envoy II"),
    tier(250, "Ambassador I"),
    tier(500, "Spymaster"),
];

/// The tier table for a skill track.
pub const fn tier_table(track: SkillTrack) -> &'static [Tier] {
    match track {
        SkillTrack::Military => MILITARY_TIERS,
        SkillTrack::Economist => ECONOMIST_TIERS,
        SkillTrack::Scout => SCOUT_TIERS,
        SkillTrack::Diplomat => DIPLOMAT_TIERS,
    }
}

/// Zero-based index of the highest tier whose threshold is at most `exp`.
pub fn tier_index(exp: u64, tiers: &[Tier]) -> u64 {
    let matched = tiers.iter().filter(|t| t.threshold <= exp).count();
    u64::try_from(matched.saturating_sub(1)).unwrap_or(0)
}

/// Title of the highest tier whose threshold is at most `exp`.
pub fn tier_title(exp: u64, tiers: &[Tier]) -> &'static str {
    tiers
        .iter()
        .rev()
        .find(|t| t.threshold <= exp)
        .map_or("", |t| t.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exp_is_first_tier() {
        assert_eq!(tier_index(0, MILITARY_TIERS), 0);
        assert_eq!(tier_title(0, MILITARY_TIERS), "Private I");
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(tier_index(99, ECONOMIST_TIERS), 0);
        assert_eq!(tier_index(100, ECONOMIST_TIERS), 1);
        assert_eq!(tier_title(250, ECONOMIST_TIERS), "Merchant I");
    }

    #[test]
    fn exp_beyond_last_tier_stays_at_top() {
        assert_eq!(tier_index(1_000_000, SCOUT_TIERS), 3);
        assert_eq!(tier_title(1_000_000, DIPLOMAT_TIERS), "Spymaster");
    }

    #[test]
    fn tables_ascend_from_zero() {
        for track in SkillTrack::ALL {
            let table = tier_table(track);
            assert_eq!(table.first().map(|t| t.threshold), Some(0));
            let thresholds: Vec<u64> = table.iter().map(|t| t.threshold).collect();
            let mut sorted = thresholds.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(thresholds, sorted);
        }
    }
}
