//! Military unit deployment.
//!
//! The number of units a deployment produces is the yield calculator's
//! result for the unit kind, driven by the player's military experience.
//! Troops also draw on population: every full city's worth of citizens adds
//! two troops, and troops may never outnumber the population.
//!
//! Deployment is all-or-nothing. If any component of the price is short,
//! no unit is added and no resource is deducted.

use chrono::{DateTime, Utc};
use tracing::debug;

use nationstate_types::{Nation, Resource, ResourceStock, Unit};

use crate::config::EconomyConfig;
use crate::construction::ensure_available;
use crate::error::EconomyError;
use crate::tables::{deploy_cost, unit_building, unit_research};
use crate::tiers::MILITARY_TIERS;
use crate::yields::compute_yield;

/// Troops added per full city's worth of population.
pub const TROOPS_PER_POPULATION_BLOCK: u64 = 2;

/// A completed deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Unit kind deployed.
    pub unit: Unit,
    /// Units added.
    pub deployed: u64,
    /// Resources consumed.
    pub cost: ResourceStock,
}

/// Deploy units of `unit` for a player with `military_exp` experience.
pub fn deploy(
    nation: &mut Nation,
    military_exp: u64,
    unit: Unit,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<Deployment, EconomyError> {
    if let Some(research) = unit_research(unit) {
        if !nation.has_research(research) {
            return Err(EconomyError::ResearchRequired { research });
        }
    }
    if let Some(building) = unit_building(unit) {
        if nation.building_count(building) == 0 {
            return Err(EconomyError::BuildingRequired { building });
        }
    }

    let base = compute_yield(military_exp, MILITARY_TIERS, nation, unit.into(), &[], 1, now);
    let deployed = if unit == Unit::Troops {
        troop_count(nation, base, config)?
    } else {
        base
    };

    let cost = scaled_deploy_cost(unit, deployed)?;
    for resource in Resource::ALL {
        ensure_available(nation, resource, cost.get(resource))?;
    }
    for resource in Resource::ALL {
        let stock = nation.resources.get_mut(resource);
        *stock = stock.saturating_sub(cost.get(resource));
    }

    let count = nation.military.get_mut(unit);
    *count = count
        .checked_add(deployed)
        .ok_or_else(|| EconomyError::overflow("military count"))?;
    debug!(nation = %nation.id, unit = %unit, deployed, "units deployed");

    Ok(Deployment {
        unit,
        deployed,
        cost,
    })
}

/// Troops deployable from `base`, plus the population bonus, clamped to
/// the population headroom.
fn troop_count(nation: &Nation, base: u64, config: &EconomyConfig) -> Result<u64, EconomyError> {
    let blocks = nation
        .population
        .checked_div(config.population_per_city)
        .unwrap_or(0);
    let requested = base.saturating_add(blocks.saturating_mul(TROOPS_PER_POPULATION_BLOCK));
    let headroom = nation.population.saturating_sub(nation.military.troops);
    let deployable = requested.min(headroom);
    if deployable == 0 {
        return Err(EconomyError::PopulationCapReached {
            population: nation.population,
            troops: nation.military.troops,
        });
    }
    Ok(deployable)
}

/// Per-unit cost times the deployed count.
fn scaled_deploy_cost(unit: Unit, count: u64) -> Result<ResourceStock, EconomyError> {
    let per_unit = deploy_cost(unit);
    let scale = |v: u64| {
        v.checked_mul(count)
            .ok_or_else(|| EconomyError::overflow("deploy cost"))
    };
    Ok(ResourceStock {
        food: scale(per_unit.food)?,
        steel: scale(per_unit.steel)?,
        oil: scale(per_unit.oil)?,
        gold: scale(per_unit.gold)?,
    })
}
