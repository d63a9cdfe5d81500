//! Founding trait bonuses.
//!
//! Yield bonuses are fractional multipliers applied after the additive
//! yield. Chances are expressed in basis points (1/100th of a percent).

use rust_decimal::Decimal;

use nationstate_types::{NationTrait, Resource};

/// Modifiers a trait applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitBonus {
    /// A resource whose yield is multiplied by `1 + bonus`.
    pub yield_bonus: Option<(Resource, Decimal)>,
    /// Extra spy success chance, in basis points.
    pub spy_chance_bps: u32,
    /// Extra failed spy attempts tolerated before the target is alerted.
    pub spy_alert_bonus: u32,
    /// Chance of exploring a second tile, in basis points.
    pub extra_tile_chance_bps: u32,
}

impl TraitBonus {
    /// A trait with no effect.
    pub const NONE: Self = Self {
        yield_bonus: None,
        spy_chance_bps: 0,
        spy_alert_bonus: 0,
        extra_tile_chance_bps: 0,
    };
}

/// Production traits grant +15%.
fn production_bonus() -> Decimal {
    Decimal::new(15, 2)
}

/// Bonus table lookup. `None` yields [`TraitBonus::NONE`].
pub fn trait_bonus(nation_trait: Option<NationTrait>) -> TraitBonus {
    let Some(nation_trait) = nation_trait else {
        return TraitBonus::NONE;
    };
    match nation_trait {
        NationTrait::Agricultural => TraitBonus {
            yield_bonus: Some((Resource::Food, production_bonus())),
            ..TraitBonus::NONE
        },
        NationTrait::Industrial => TraitBonus {
            yield_bonus: Some((Resource::Steel, production_bonus())),
            ..TraitBonus::NONE
        },
        NationTrait::Mercantile => TraitBonus {
            yield_bonus: Some((Resource::Gold, production_bonus())),
            ..TraitBonus::NONE
        },
        NationTrait::Stealthy => TraitBonus {
            spy_chance_bps: 1000,
            spy_alert_bonus: 1,
            ..TraitBonus::NONE
        },
        NationTrait::Nomadic => TraitBonus {
            extra_tile_chance_bps: 2500,
            ..TraitBonus::NONE
        },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn agricultural_boosts_food() {
        let bonus = trait_bonus(Some(NationTrait::Agricultural));
        assert_eq!(bonus.yield_bonus, Some((Resource::Food, dec!(0.15))));
        assert_eq!(bonus.spy_chance_bps, 0);
    }

    #[test]
    fn stealthy_improves_spying_only() {
        let bonus = trait_bonus(Some(NationTrait::Stealthy));
        assert_eq!(bonus.yield_bonus, None);
        assert_eq!(bonus.spy_chance_bps, 1000);
        assert_eq!(bonus.spy_alert_bonus, 1);
    }

    #[test]
    fn no_trait_means_no_bonus() {
        assert_eq!(trait_bonus(None), TraitBonus::NONE);
    }
}
