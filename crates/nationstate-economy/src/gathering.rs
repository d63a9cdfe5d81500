//! Gathering commands: farming, mining and drilling.
//!
//! Each command computes the full yield (additive bonuses, then trait and
//! boost multipliers) for its resources using the economist track and adds
//! the result to the stockpile. Farming also grows the population by the
//! food harvested.

use chrono::{DateTime, Utc};
use tracing::debug;

use nationstate_types::{Nation, Resource, ResourceStock, Tile};

use crate::error::EconomyError;
use crate::tiers::ECONOMIST_TIERS;
use crate::yields::{apply_multipliers, compute_yield};

/// What a gathering command produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Harvest {
    /// Resources added to the stockpile.
    pub produced: ResourceStock,
    /// Citizens added.
    pub population_gain: u64,
}

/// Farm food. Population grows by the same amount.
pub fn farm(
    nation: &mut Nation,
    economist_exp: u64,
    owned_tiles: &[Tile],
    now: DateTime<Utc>,
) -> Result<Harvest, EconomyError> {
    let mut harvest = gather(nation, economist_exp, &[Resource::Food], owned_tiles, now)?;
    nation.population = nation
        .population
        .checked_add(harvest.produced.food)
        .ok_or_else(|| EconomyError::overflow("population after farming"))?;
    harvest.population_gain = harvest.produced.food;
    Ok(harvest)
}

/// Mine steel and gold.
pub fn mine(
    nation: &mut Nation,
    economist_exp: u64,
    owned_tiles: &[Tile],
    now: DateTime<Utc>,
) -> Result<Harvest, EconomyError> {
    gather(
        nation,
        economist_exp,
        &[Resource::Steel, Resource::Gold],
        owned_tiles,
        now,
    )
}

/// Drill oil.
pub fn drill(
    nation: &mut Nation,
    economist_exp: u64,
    owned_tiles: &[Tile],
    now: DateTime<Utc>,
) -> Result<Harvest, EconomyError> {
    gather(nation, economist_exp, &[Resource::Oil], owned_tiles, now)
}

fn gather(
    nation: &mut Nation,
    economist_exp: u64,
    resources: &[Resource],
    owned_tiles: &[Tile],
    now: DateTime<Utc>,
) -> Result<Harvest, EconomyError> {
    let mut produced = ResourceStock::default();
    for &resource in resources {
        let base = compute_yield(
            economist_exp,
            ECONOMIST_TIERS,
            nation,
            resource.into(),
            owned_tiles,
            1,
            now,
        );
        *produced.get_mut(resource) = apply_multipliers(base, nation, resource, now);
    }

    let mut updated = nation.resources;
    for &resource in resources {
        let slot = updated.get_mut(resource);
        *slot = slot
            .checked_add(produced.get(resource))
            .ok_or_else(|| EconomyError::overflow("stockpile after gathering"))?;
    }
    nation.resources = updated;
    debug!(nation = %nation.id, ?produced, "resources gathered");

    Ok(Harvest {
        produced,
        population_gain: 0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nationstate_types::{BuildingKind, City, NationId, NationTrait, TileId, TileResources};

    use super::*;

    fn make_nation() -> Nation {
        Nation::new(NationId::new("g1"), "Freedonia", None, Utc::now())
    }

    fn capital(resources: TileResources) -> Tile {
        let mut tile = Tile::new(TileId(1), resources);
        tile.city = Some(City {
            name: String::from("Capital"),
            owner: NationId::new("g1"),
            owner_name: String::from("Freedonia"),
            founded_at: Utc::now(),
        });
        tile
    }

    #[test]
    fn farming_uses_fertility_and_grows_population() {
        let mut nation = make_nation();
        let tiles = vec![capital(TileResources {
            fertility: 2,
            ..TileResources::default()
        })];
        let harvest = farm(&mut nation, 0, &tiles, Utc::now()).unwrap();
        assert_eq!(harvest.produced.food, 3);
        assert_eq!(harvest.population_gain, 3);
        assert_eq!(nation.population, 4);
        assert_eq!(nation.resources.food, 3);
    }

    #[test]
    fn agricultural_farming_gets_trait_bonus() {
        let mut nation = make_nation();
        nation.nation_trait = Some(NationTrait::Agricultural);
        nation.buildings.insert(BuildingKind::MickDonalds, 10);
        // 1 + 20 = 21, floor(21 * 1.15) = 24
        let harvest = farm(&mut nation, 0, &[], Utc::now()).unwrap();
        assert_eq!(harvest.produced.food, 24);
    }

    #[test]
    fn mining_yields_steel_and_gold() {
        let mut nation = make_nation();
        nation.buildings.insert(BuildingKind::Factory, 1);
        let tiles = vec![capital(TileResources {
            gold: 1,
            steel: 3,
            ..TileResources::default()
        })];
        let harvest = mine(&mut nation, 100, &tiles, Utc::now()).unwrap();
        // steel: 1 + 3 + 1 + 2, gold: 1 + 1 + 1
        assert_eq!(harvest.produced.steel, 7);
        assert_eq!(harvest.produced.gold, 3);
        assert_eq!(harvest.produced.oil, 0);
        assert_eq!(nation.resources.steel, 7);
        assert_eq!(nation.population, 1);
    }

    #[test]
    fn drilling_yields_oil_only() {
        let mut nation = make_nation();
        let harvest = drill(&mut nation, 0, &[], Utc::now()).unwrap();
        assert_eq!(harvest.produced.oil, 1);
        assert_eq!(nation.resources.food, 0);
    }
}
