//! Building construction and research purchases.
//!
//! Building prices escalate with the number already owned:
//! `cost = base * (count + 0.5)`, floored per resource. Research is a flat
//! one-time price.
//!
//! Checks run in order (research, price, cap) and nothing is deducted
//! unless every check passes.

use tracing::debug;

use nationstate_types::{BuildingKind, Nation, ResearchKind, Resource};

use crate::error::EconomyError;
use crate::tables::{Cost, building_def, research_cost};

/// A completed construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildReceipt {
    /// What was built.
    pub building: BuildingKind,
    /// What it cost.
    pub cost: Cost,
    /// Count after building.
    pub new_count: u64,
}

/// Price of the next building when `current` are already owned.
pub fn scaled_cost(base: Cost, current: u64) -> Result<Cost, EconomyError> {
    let factor = current
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or_else(|| EconomyError::overflow("building cost factor"))?;
    let scale = |amount: u64| {
        amount
            .checked_mul(factor)
            .map(|v| v / 2)
            .ok_or_else(|| EconomyError::overflow("building cost"))
    };
    Ok(Cost {
        gold: scale(base.gold)?,
        steel: scale(base.steel)?,
    })
}

/// Build one `kind` for the nation.
///
/// Cities are founded by settling and cannot be built here.
pub fn attempt_build(nation: &mut Nation, kind: BuildingKind) -> Result<BuildReceipt, EconomyError> {
    if kind == BuildingKind::City {
        return Err(EconomyError::NotConstructible(kind));
    }
    let def = building_def(kind);

    if let Some(research) = def.requires {
        if !nation.has_research(research) {
            return Err(EconomyError::ResearchRequired { research });
        }
    }

    let count = nation.building_count(kind);
    let cost = scaled_cost(def.cost, count)?;
    ensure_affordable(nation, cost)?;

    if let Some(max) = def.max_per_city {
        let cap = nation.city_count().saturating_mul(max);
        if count >= cap {
            return Err(EconomyError::CapExceeded {
                building: kind,
                count,
                cap,
            });
        }
    }

    pay(nation, cost)?;

    let new_count = count
        .checked_add(1)
        .ok_or_else(|| EconomyError::overflow("building count"))?;
    nation.buildings.insert(kind, new_count);
    debug!(nation = %nation.id, building = ?kind, new_count, "building constructed");

    Ok(BuildReceipt {
        building: kind,
        cost,
        new_count,
    })
}

/// Complete a research project for its flat price.
pub fn purchase_research(nation: &mut Nation, kind: ResearchKind) -> Result<Cost, EconomyError> {
    if nation.has_research(kind) {
        return Err(EconomyError::AlreadyResearched(kind));
    }
    let cost = research_cost(kind);
    pay(nation, cost)?;
    nation.research.insert(kind);
    debug!(nation = %nation.id, research = ?kind, "research completed");
    Ok(cost)
}

/// Verify both components of `cost` before deducting either.
pub(crate) fn pay(nation: &mut Nation, cost: Cost) -> Result<(), EconomyError> {
    ensure_affordable(nation, cost)?;
    nation.resources.gold = nation.resources.gold.saturating_sub(cost.gold);
    nation.resources.steel = nation.resources.steel.saturating_sub(cost.steel);
    Ok(())
}

/// Gold first, then steel.
fn ensure_affordable(nation: &Nation, cost: Cost) -> Result<(), EconomyError> {
    ensure_available(nation, Resource::Gold, cost.gold)?;
    ensure_available(nation, Resource::Steel, cost.steel)
}

/// Fail with [`EconomyError::InsufficientResources`] if `needed` exceeds stock.
pub(crate) fn ensure_available(
    nation: &Nation,
    resource: Resource,
    needed: u64,
) -> Result<(), EconomyError> {
    let available = nation.resources.get(resource);
    if available < needed {
        return Err(EconomyError::InsufficientResources {
            resource,
            needed,
            available,
        });
    }
    Ok(())
}
