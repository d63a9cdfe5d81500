//! Token launches: a gold gamble unlocked by research.

use rand::Rng;
use tracing::info;

use nationstate_types::{Nation, ResearchKind, Resource};

use crate::construction::ensure_available;
use crate::error::EconomyError;

/// Gold spent on every launch.
pub const LAUNCH_COST_GOLD: u64 = 30;

/// Gold paid out when a launch takes off.
pub const LAUNCH_PAYOUT_GOLD: u64 = 10_000;

/// Chance a launch takes off, in basis points.
pub const LAUNCH_SUCCESS_BPS: u32 = 1000;

/// The result of a token launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLaunch {
    /// Gold spent.
    pub cost: u64,
    /// Gold received, zero on a flop.
    pub payout: u64,
}

/// Launch a nation token. Requires `ShitCoins` research and the launch cost.
pub fn launch_token(nation: &mut Nation, rng: &mut impl Rng) -> Result<TokenLaunch, EconomyError> {
    if !nation.has_research(ResearchKind::ShitCoins) {
        return Err(EconomyError::ResearchRequired {
            research: ResearchKind::ShitCoins,
        });
    }
    ensure_available(nation, Resource::Gold, LAUNCH_COST_GOLD)?;

    let payout = if rng.random_range(0..10_000) < LAUNCH_SUCCESS_BPS {
        LAUNCH_PAYOUT_GOLD
    } else {
        0
    };
    nation.resources.gold = nation
        .resources
        .gold
        .saturating_sub(LAUNCH_COST_GOLD)
        .saturating_add(payout);
    info!(nation = %nation.id, payout, "token launched");

    Ok(TokenLaunch {
        cost: LAUNCH_COST_GOLD,
        payout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use nationstate_types::NationId;

    use super::*;

    fn make_nation(gold: u64) -> Nation {
        let mut nation = Nation::new(NationId::new("g1"), "Freedonia", None, Utc::now());
        nation.research.insert(ResearchKind::ShitCoins);
        nation.resources.gold = gold;
        nation
    }

    #[test]
    fn needs_research() {
        let mut nation = make_nation(100);
        nation.research.clear();
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(matches!(
            launch_token(&mut nation, &mut rng),
            Err(EconomyError::ResearchRequired { .. })
        ));
    }

    #[test]
    fn needs_cost_in_gold() {
        let mut nation = make_nation(29);
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(matches!(
            launch_token(&mut nation, &mut rng),
            Err(EconomyError::InsufficientResources { needed: 30, .. })
        ));
        assert_eq!(nation.resources.gold, 29);
    }

    #[test]
    fn every_launch_costs_and_some_pay_out() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut paid = 0_u32;
        for _ in 0..1_000 {
            let mut nation = make_nation(30);
            let launch = launch_token(&mut nation, &mut rng).unwrap();
            assert_eq!(nation.resources.gold, launch.payout);
            if launch.payout > 0 {
                paid = paid.saturating_add(1);
            }
        }
        assert!((50..=150).contains(&paid), "paid = {paid}");
    }
}
