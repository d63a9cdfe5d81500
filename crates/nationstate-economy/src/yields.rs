//! Resource yield calculator.
//!
//! A yield is additive first, multiplicative second:
//!
//! 1. `base_rate + land_bonus + experience_bonus + building_bonus`
//! 2. trait multiplier, `floor(yield * (1 + bonus))`
//! 3. active boost multiplier
//!
//! Step 1 is [`compute_yield`]; steps 2 and 3 are [`apply_multipliers`].
//! Military unit keys take step 1 only and never receive a land bonus.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use nationstate_types::{BuildingKind, Commodity, Nation, Resource, Tile};

use crate::boosts::boost_multiplier;
use crate::tables::building_def;
use crate::tiers::{Tier, tier_index};
use crate::traits::trait_bonus;

// ---------------------------------------------------------------------------
// Additive yield
// ---------------------------------------------------------------------------

/// Additive yield of `key` for a nation.
///
/// Never less than `base_rate`: every bonus is non-negative.
pub fn compute_yield(
    exp: u64,
    tiers: &[Tier],
    nation: &Nation,
    key: Commodity,
    owned_tiles: &[Tile],
    base_rate: u64,
    now: DateTime<Utc>,
) -> u64 {
    base_rate
        .saturating_add(land_bonus(nation, key, owned_tiles))
        .saturating_add(tier_index(exp, tiers))
        .saturating_add(building_bonus(nation, key, now))
}

/// Sum of the tile bonuses for a natural resource over the nation's cities.
///
/// Tiles not owned by the nation are skipped. Unit keys have no land bonus.
pub fn land_bonus(nation: &Nation, key: Commodity, owned_tiles: &[Tile]) -> u64 {
    let Some(resource) = key.as_resource() else {
        return 0;
    };
    owned_tiles
        .iter()
        .filter(|t| t.is_owned_by(&nation.id))
        .fold(0_u64, |acc, t| acc.saturating_add(t.resources.bonus(resource)))
}

/// Sum of `bonus * count` over buildings that improve `key`.
///
/// Banks contribute nothing while a hack has them disabled.
pub fn building_bonus(nation: &Nation, key: Commodity, now: DateTime<Utc>) -> u64 {
    BuildingKind::ALL
        .iter()
        .filter(|kind| building_def(**kind).boosts == Some(key))
        .filter(|kind| !(**kind == BuildingKind::Bank && bank_disabled(nation, now)))
        .fold(0_u64, |acc, kind| {
            let def = building_def(*kind);
            acc.saturating_add(def.bonus.saturating_mul(nation.building_count(*kind)))
        })
}

/// Whether a hack currently suppresses the nation's bank bonus.
pub fn bank_disabled(nation: &Nation, now: DateTime<Utc>) -> bool {
    nation.hacks.bank_disabled_until.is_some_and(|until| until > now)
}

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Apply the trait multiplier, then the boost multiplier.
pub fn apply_multipliers(
    amount: u64,
    nation: &Nation,
    resource: Resource,
    now: DateTime<Utc>,
) -> u64 {
    let after_trait = apply_trait_multiplier(amount, nation, resource);
    after_trait.saturating_mul(u64::from(boost_multiplier(nation, resource, now)))
}

/// `floor(amount * (1 + bonus))` when the nation's trait favours `resource`.
pub fn apply_trait_multiplier(amount: u64, nation: &Nation, resource: Resource) -> u64 {
    let Some((favoured, bonus)) = trait_bonus(nation.nation_trait).yield_bonus else {
        return amount;
    };
    if favoured != resource {
        return amount;
    }
    Decimal::from(amount)
        .checked_mul(Decimal::ONE.saturating_add(bonus))
        .and_then(|v| v.floor().to_u64())
        .unwrap_or(amount)
}
