//! Attack resolution between two nations over one city.
//!
//! ## Flow
//!
//! 1. Preconditions: valid target, no active truce, attack cooldown
//!    elapsed, attacker power at or above its city-scaled floor
//! 2. Refresh the defender's peak population (the morale baseline)
//! 3. Roll the outcome: 45% success, 10% neutral, 45% fail, regardless of
//!    relative power
//! 4. Loss pool = `floor(factor * 0.045 * (attacker + defender power))`
//!    with `factor` in 1..=3, split 30/70 on success, 70/30 on fail and
//!    50/50 when neutral
//! 5. Success only: collateral population and food damage
//! 6. City-fall check, which ignores the outcome label
//! 7. Morale, power and defense percentages for display
//!
//! Steps 3 to 5 draw from the RNG; [`roll_attack`] draws them and
//! [`resolve_with_rolls`] applies fixed rolls, which is how the scenario
//! tests pin results down.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use nationstate_diplomacy::TruceBook;
use nationstate_diplomacy::cooldown::{as_millis, check_nation, mark_nation};
use nationstate_types::{BuildingKind, Intel, Military, Nation, NationAction, Tile, TileId};

use crate::config::CombatConfig;
use crate::error::ConflictError;
use crate::losses::allocate_losses;
use crate::targeting::validate_target;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rolls below this are a success.
pub const SUCCESS_BELOW_BPS: u32 = 4500;

/// Rolls below this (and not a success) are neutral.
pub const NEUTRAL_BELOW_BPS: u32 = 5500;

/// Share of combined power that one pool factor puts at stake.
fn pool_rate() -> Decimal {
    Decimal::new(45, 3)
}

/// Share of per-city population lost per collateral factor.
fn collateral_rate() -> Decimal {
    Decimal::new(25, 3)
}

/// A city falls once population drops this many cities' worth below full.
fn fall_margin() -> Decimal {
    Decimal::new(7, 1)
}

// ---------------------------------------------------------------------------
// Outcome and rolls
// ---------------------------------------------------------------------------

/// The label of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatOutcome {
    /// Attacker takes the lighter share and inflicts collateral damage.
    Success,
    /// Losses split evenly.
    Neutral,
    /// Attacker takes the heavier share.
    Fail,
}

impl CombatOutcome {
    /// Map a roll in `0..10_000` to an outcome.
    pub const fn from_roll(roll_bps: u32) -> Self {
        if roll_bps < SUCCESS_BELOW_BPS {
            Self::Success
        } else if roll_bps < NEUTRAL_BELOW_BPS {
            Self::Neutral
        } else {
            Self::Fail
        }
    }

    /// Attacker and defender shares of the loss pool, in that order.
    fn shares(self) -> (Decimal, Decimal) {
        match self {
            Self::Success => (Decimal::new(3, 1), Decimal::new(7, 1)),
            Self::Fail => (Decimal::new(7, 1), Decimal::new(3, 1)),
            Self::Neutral => (Decimal::new(5, 1), Decimal::new(5, 1)),
        }
    }
}

/// The random draws of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRolls {
    /// Outcome label.
    pub outcome: CombatOutcome,
    /// Loss pool factor, 1..=3.
    pub pool_factor: u64,
    /// Collateral factor, 1..=3. Ignored unless the outcome is a success.
    pub collateral_factor: u64,
}

/// Draw the outcome and both factors.
pub fn roll_attack(rng: &mut impl Rng) -> AttackRolls {
    let outcome = CombatOutcome::from_roll(rng.random_range(0..10_000));
    let pool_factor = rng.random_range(1..=3);
    let collateral_factor = rng.random_range(1..=3);
    AttackRolls {
        outcome,
        pool_factor,
        collateral_factor,
    }
}

/// `floor(amount * rate)`.
fn floor_mul(amount: u64, rate: Decimal, context: &str) -> Result<u64, ConflictError> {
    Decimal::from(amount)
        .checked_mul(rate)
        .and_then(|v| v.floor().to_u64())
        .ok_or_else(|| ConflictError::overflow(context))
}

/// Power at stake: `floor(factor * 0.045 * (attacker + defender))`.
pub fn loss_pool(factor: u64, attacker_power: u64, defender_power: u64) -> Result<u64, ConflictError> {
    let combined = attacker_power
        .checked_add(defender_power)
        .ok_or_else(|| ConflictError::overflow("combined power"))?;
    let rate = pool_rate()
        .checked_mul(Decimal::from(factor))
        .ok_or_else(|| ConflictError::overflow("loss pool rate"))?;
    floor_mul(combined, rate, "loss pool")
}

/// Attacker and defender loss power for an outcome.
pub fn split_losses(outcome: CombatOutcome, pool: u64) -> Result<(u64, u64), ConflictError> {
    let (attacker_share, defender_share) = outcome.shares();
    Ok((
        floor_mul(pool, attacker_share, "attacker losses")?,
        floor_mul(pool, defender_share, "defender losses")?,
    ))
}

// ---------------------------------------------------------------------------
// Battlefield and report
// ---------------------------------------------------------------------------

/// Everything an attack reads or writes.
#[derive(Debug)]
pub struct Battlefield<'a> {
    /// The attacking nation.
    pub attacker: &'a mut Nation,
    /// The nation owning the target city.
    pub defender: &'a mut Nation,
    /// The tile holding the target city.
    pub tile: &'a mut Tile,
    /// Truce records, consulted for the pair.
    pub truces: &'a TruceBook,
    /// Every intel record whose target is the defender.
    pub defender_intel: &'a mut [Intel],
}

/// A city lost in an attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallenCity {
    /// Where it stood.
    pub tile: TileId,
    /// Its name.
    pub name: String,
    /// Gold moved from defender to attacker.
    pub gold_looted: u64,
    /// Defender city count before the fall.
    pub cities_before: u64,
}

/// The full result of an attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    /// The rolls that decided it.
    pub rolls: AttackRolls,
    /// Attacker power going in.
    pub attacker_power: u64,
    /// Defender power going in.
    pub defender_power: u64,
    /// Total power at stake.
    pub loss_pool: u64,
    /// Units the attacker lost.
    pub attacker_losses: Military,
    /// Units the defender lost.
    pub defender_losses: Military,
    /// Collateral population loss.
    pub population_lost: u64,
    /// Collateral food loss.
    pub food_lost: u64,
    /// Set when the target city fell.
    pub fallen: Option<FallenCity>,
    /// Defender population against its peak, 0..=100.
    pub morale_percent: u64,
    /// Defender power against its full-strength reference, 0..=100.
    pub power_percent: u64,
    /// The weaker of morale and power.
    pub defense_percent: u64,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Check preconditions, roll, and apply an attack.
pub fn resolve_attack(
    field: Battlefield<'_>,
    config: &CombatConfig,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<AttackReport, ConflictError> {
    check_preconditions(&field, config, now)?;
    let rolls = roll_attack(rng);
    resolve_with_rolls(field, config, rolls, now)
}

/// Fail unless the attack may go ahead. Touches nothing.
pub fn check_preconditions(
    field: &Battlefield<'_>,
    config: &CombatConfig,
    now: DateTime<Utc>,
) -> Result<(), ConflictError> {
    validate_target(field.attacker, field.defender, field.tile)?;

    if let Some(truce) = field.truces.active_between(&field.attacker.id, &field.defender.id, now) {
        let left = truce
            .end_time
            .map_or(Duration::zero(), |end| end.signed_duration_since(now));
        return Err(ConflictError::TruceActive {
            remaining_ms: as_millis(left),
        });
    }

    check_nation(field.attacker, NationAction::Attack, &config.cooldowns, now)?;

    let power = field.attacker.military.power();
    let required = field
        .attacker
        .cities_or_one()
        .saturating_mul(config.min_military_power_per_city);
    if power == 0 || power < required {
        return Err(ConflictError::MilitaryTooWeak { power, required });
    }
    Ok(())
}

/// Apply an attack with fixed rolls. Assumes preconditions hold.
pub fn resolve_with_rolls(
    field: Battlefield<'_>,
    config: &CombatConfig,
    rolls: AttackRolls,
    now: DateTime<Utc>,
) -> Result<AttackReport, ConflictError> {
    let Battlefield {
        attacker,
        defender,
        tile,
        defender_intel,
        ..
    } = field;

    if defender.peak_population.is_none_or(|peak| defender.population > peak) {
        defender.peak_population = Some(defender.population);
    }

    let attacker_power = attacker.military.power();
    let defender_power = defender.military.power();
    let pool = loss_pool(rolls.pool_factor, attacker_power, defender_power)?;
    let (attacker_loss, defender_loss) = split_losses(rolls.outcome, pool)?;
    let attacker_losses = allocate_losses(&mut attacker.military, attacker_loss);
    let defender_losses = allocate_losses(&mut defender.military, defender_loss);

    let (population_lost, food_lost) = if rolls.outcome == CombatOutcome::Success {
        apply_collateral(defender, rolls.collateral_factor)?
    } else {
        (0, 0)
    };

    let fallen = if city_falls(defender, config)? {
        Some(fall_city(attacker, defender, tile, defender_intel, now))
    } else {
        None
    };

    let morale_percent = morale_percent(defender);
    let power_percent = power_percent(defender, config);
    let report = AttackReport {
        rolls,
        attacker_power,
        defender_power,
        loss_pool: pool,
        attacker_losses,
        defender_losses,
        population_lost,
        food_lost,
        fallen,
        morale_percent,
        power_percent,
        defense_percent: morale_percent.min(power_percent),
    };

    info!(
        attacker = %attacker.id,
        defender = %defender.id,
        tile = %tile.id,
        outcome = ?rolls.outcome,
        loss_pool = pool,
        attacker_loss,
        defender_loss,
        city_fallen = report.fallen.is_some(),
        defense_percent = report.defense_percent,
        "attack resolved"
    );
    Ok(report)
}

/// Remove `floor(factor * 0.025 * per_city_population)` population and food.
fn apply_collateral(defender: &mut Nation, factor: u64) -> Result<(u64, u64), ConflictError> {
    let per_city = defender
        .population
        .checked_div(defender.cities_or_one())
        .unwrap_or(0);
    let rate = collateral_rate()
        .checked_mul(Decimal::from(factor))
        .ok_or_else(|| ConflictError::overflow("collateral rate"))?;
    let damage = floor_mul(per_city, rate, "collateral damage")?;

    let population_lost = damage.min(defender.population);
    let food_lost = damage.min(defender.resources.food);
    defender.population = defender.population.saturating_sub(damage);
    defender.resources.food = defender.resources.food.saturating_sub(damage);
    debug!(defender = %defender.id, damage, "collateral damage");
    Ok((population_lost, food_lost))
}

/// Whether the defender's population or power has crossed the fall line.
///
/// Population falls short once it is at or below
/// `ppc * cities - ppc * 0.7`.
pub fn city_falls(defender: &Nation, config: &CombatConfig) -> Result<bool, ConflictError> {
    if defender.military.power() == 0 {
        return Ok(true);
    }
    let ppc = Decimal::from(config.population_per_city);
    let baseline = ppc
        .checked_mul(Decimal::from(defender.cities_or_one()))
        .and_then(|full| full.checked_sub(ppc.checked_mul(fall_margin())?))
        .ok_or_else(|| ConflictError::overflow("city fall baseline"))?;
    Ok(Decimal::from(defender.population) <= baseline)
}

/// Clear the city, loot gold, shrink the defender and prune intel.
fn fall_city(
    attacker: &mut Nation,
    defender: &mut Nation,
    tile: &mut Tile,
    defender_intel: &mut [Intel],
    now: DateTime<Utc>,
) -> FallenCity {
    let name = tile.city.take().map(|c| c.name).unwrap_or_default();
    let cities_before = defender.cities_or_one();

    let gold_looted = defender
        .resources
        .gold
        .checked_div(cities_before)
        .unwrap_or(0);
    defender.resources.gold = defender.resources.gold.saturating_sub(gold_looted);
    attacker.resources.gold = attacker.resources.gold.saturating_add(gold_looted);

    defender
        .buildings
        .insert(BuildingKind::City, cities_before.saturating_sub(1));
    defender.peak_population = Some(defender.population);
    mark_nation(attacker, NationAction::Attack, now);

    for intel in defender_intel.iter_mut().filter(|i| i.target == defender.id) {
        intel.known_cities.retain(|c| c.tile != tile.id);
    }

    info!(
        attacker = %attacker.id,
        defender = %defender.id,
        tile = %tile.id,
        city = %name,
        gold_looted,
        cities_left = defender.city_count(),
        "city fallen"
    );

    FallenCity {
        tile: tile.id,
        name,
        gold_looted,
        cities_before,
    }
}

/// `floor(population / peak * 100)`, clamped to 0..=100. Zero without a peak.
pub fn morale_percent(nation: &Nation) -> u64 {
    match nation.peak_population {
        Some(peak) if peak > 0 => nation
            .population
            .saturating_mul(100)
            .checked_div(peak)
            .unwrap_or(0)
            .min(100),
        _ => 0,
    }
}

/// Power against `cities * min_military_power_per_city`, clamped to 0..=100.
pub fn power_percent(nation: &Nation, config: &CombatConfig) -> u64 {
    let threshold = nation
        .cities_or_one()
        .saturating_mul(config.min_military_power_per_city)
        .max(1);
    nation
        .military
        .power()
        .saturating_mul(100)
        .checked_div(threshold)
        .unwrap_or(0)
        .min(100)
}
