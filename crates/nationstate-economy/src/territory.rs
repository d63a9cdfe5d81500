//! Territory: founding capitals, surveying land, settling cities and
//! exploring for treasure and rival cities.
//!
//! Exploring raises `tiles_discovered`, which is the budget for surveying:
//! a nation may hold as many surveyed tiles as it has discovered. Surveyed
//! land can then be settled once the population supports another city.
//!
//! All rolls use basis points out of 10 000.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use nationstate_types::{
    BuildingKind, City, DiscoveredCity, Nation, NationId, Tile, TileId, TileResources,
};

use crate::config::EconomyConfig;
use crate::construction::pay;
use crate::error::EconomyError;
use crate::tables::building_def;
use crate::traits::trait_bonus;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Chance per explored tile of finding treasure.
pub const TREASURE_CHANCE_BPS: u32 = 1000;

/// Smallest treasure, in gold.
pub const TREASURE_MIN_GOLD: u64 = 10;

/// Largest treasure, in gold.
pub const TREASURE_MAX_GOLD: u64 = 59;

/// Chance a surveyed tile is barren (zero base fertility).
const BARREN_CHANCE_BPS: u32 = 2500;

/// Chance a surveyed tile carries extra deposits.
const DEPOSIT_CHANCE_BPS: u32 = 2000;

const BPS_SCALE: u32 = 10_000;

// ---------------------------------------------------------------------------
// Founding
// ---------------------------------------------------------------------------

/// Lowest tile id not yet in use.
pub fn first_free_tile(used: &BTreeSet<TileId>, world_tiles: u32) -> Result<TileId, EconomyError> {
    (1..=world_tiles)
        .map(TileId)
        .find(|id| !used.contains(id))
        .ok_or(EconomyError::WorldFull)
}

/// Build the capital tile for a newly founded nation.
///
/// The capital is surveyed by its founder and always carries some steel
/// and oil.
pub fn found_capital(
    nation: &Nation,
    tile_id: TileId,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Tile {
    let resources = TileResources {
        gold: 0,
        steel: rng.random_range(2..12),
        oil: rng.random_range(2..12),
        fertility: rng.random_range(0..3),
    };
    let mut tile = Tile::new(tile_id, resources);
    tile.surveyed_by.insert(nation.id.clone());
    tile.city = Some(City {
        name: format!("{} Capital", nation.name),
        owner: nation.id.clone(),
        owner_name: nation.name.clone(),
        founded_at: now,
    });
    tile
}

// ---------------------------------------------------------------------------
// Survey
// ---------------------------------------------------------------------------

/// Survey a fresh tile for the nation.
///
/// `surveyed` is the number of tiles the nation has already surveyed and
/// `used` every tile id already present in the world.
pub fn survey(
    nation: &Nation,
    surveyed: u64,
    used: &BTreeSet<TileId>,
    world_tiles: u32,
    rng: &mut impl Rng,
) -> Result<Tile, EconomyError> {
    if nation.tiles_discovered <= surveyed {
        return Err(EconomyError::NothingToSurvey {
            discovered: nation.tiles_discovered,
            surveyed,
        });
    }

    let available: Vec<TileId> = (1..=world_tiles)
        .map(TileId)
        .filter(|id| !used.contains(id))
        .collect();
    if available.is_empty() {
        return Err(EconomyError::WorldFull);
    }
    let tile_id = available
        .get(rng.random_range(0..available.len()))
        .copied()
        .ok_or(EconomyError::WorldFull)?;

    let mut tile = Tile::new(tile_id, roll_survey_resources(rng));
    tile.surveyed_by.insert(nation.id.clone());
    debug!(nation = %nation.id, tile = %tile_id, resources = ?tile.resources, "tile surveyed");
    Ok(tile)
}

fn roll_survey_resources(rng: &mut impl Rng) -> TileResources {
    let base_fertility = u64::from(rng.random_range(0..BPS_SCALE) >= BARREN_CHANCE_BPS);
    if rng.random_range(0..BPS_SCALE) >= DEPOSIT_CHANCE_BPS {
        return TileResources {
            fertility: base_fertility,
            ..TileResources::default()
        };
    }
    TileResources {
        fertility: base_fertility.saturating_add(rng.random_range(0..4)),
        steel: rng.random_range(0..5),
        gold: rng.random_range(0..5),
        oil: rng.random_range(0..5),
    }
}

// ---------------------------------------------------------------------------
// Settle
// ---------------------------------------------------------------------------

/// A city founded by settling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Where the city was founded.
    pub tile: TileId,
    /// City name.
    pub city_name: String,
    /// Other nations that had surveyed the tile.
    pub observers: Vec<NationId>,
}

/// Found a city on a surveyed, empty tile.
///
/// Requires a population of `(cities + 1) * population_per_city` and the
/// city's gold and steel price.
pub fn settle(
    nation: &mut Nation,
    tile: &mut Tile,
    city_name: &str,
    config: &EconomyConfig,
    now: DateTime<Utc>,
) -> Result<Settlement, EconomyError> {
    if !tile.is_surveyed_by(&nation.id) {
        return Err(EconomyError::TileNotSurveyed(tile.id));
    }
    if tile.city.is_some() {
        return Err(EconomyError::TileOccupied(tile.id));
    }

    let cities = nation.city_count();
    let required = cities
        .checked_add(1)
        .and_then(|c| c.checked_mul(config.population_per_city))
        .ok_or_else(|| EconomyError::overflow("settlement population"))?;
    if nation.population < required {
        return Err(EconomyError::PopulationTooLow {
            required,
            population: nation.population,
        });
    }

    pay(nation, building_def(BuildingKind::City).cost)?;
    nation
        .buildings
        .insert(BuildingKind::City, cities.saturating_add(1));
    tile.city = Some(City {
        name: city_name.to_owned(),
        owner: nation.id.clone(),
        owner_name: nation.name.clone(),
        founded_at: now,
    });
    debug!(nation = %nation.id, tile = %tile.id, city = city_name, "city settled");

    Ok(Settlement {
        tile: tile.id,
        city_name: city_name.to_owned(),
        observers: tile
            .surveyed_by
            .iter()
            .filter(|id| **id != nation.id)
            .cloned()
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Explore
// ---------------------------------------------------------------------------

/// A rival city that exploring could reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityCandidate {
    /// Where the city stands.
    pub tile: TileId,
    /// City name.
    pub city_name: String,
    /// Owning nation.
    pub owner: NationId,
    /// Owning nation's name.
    pub owner_name: String,
    /// Selection weight of the owner: population plus players.
    pub owner_weight: u64,
}

/// What an exploration turned up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExploreReport {
    /// Tiles added to `tiles_discovered`.
    pub tiles_found: u64,
    /// Gold found.
    pub treasure_gold: u64,
    /// Rival cities revealed, to be surveyed and recorded in intel.
    pub discoveries: Vec<CityCandidate>,
}

/// Explore one tile (two with luck and the nomadic trait).
///
/// Each explored tile may hold treasure or reveal a rival city. The chance
/// of a reveal is the number of still-undiscovered rival cities over the
/// number of unexplored tiles, so it rises as the map fills.
pub fn explore(
    nation: &mut Nation,
    candidates: &[CityCandidate],
    world_tiles: u32,
    rng: &mut impl Rng,
) -> ExploreReport {
    let extra_chance = trait_bonus(nation.nation_trait).extra_tile_chance_bps;
    let tiles_found: u64 = if rng.random_range(0..BPS_SCALE) < extra_chance {
        2
    } else {
        1
    };
    let explored_before = nation.tiles_discovered;
    nation.tiles_discovered = explored_before.saturating_add(tiles_found);

    let mut pool: Vec<&CityCandidate> = candidates
        .iter()
        .filter(|c| c.owner != nation.id)
        .filter(|c| !nation.discovered_cities.iter().any(|d| d.tile == c.tile))
        .collect();

    let mut report = ExploreReport {
        tiles_found,
        ..ExploreReport::default()
    };

    for i in 1..=tiles_found {
        let explored = explored_before.saturating_add(i);
        let remaining_tiles = u64::from(world_tiles).saturating_sub(explored);
        let reveal_bps = reveal_chance_bps(pool.len(), remaining_tiles);
        let roll = rng.random_range(0..BPS_SCALE);

        if roll < TREASURE_CHANCE_BPS {
            let gold = rng.random_range(TREASURE_MIN_GOLD..=TREASURE_MAX_GOLD);
            nation.resources.gold = nation.resources.gold.saturating_add(gold);
            report.treasure_gold = report.treasure_gold.saturating_add(gold);
        } else if roll < TREASURE_CHANCE_BPS.saturating_add(reveal_bps) {
            let Some(index) = pick_candidate(&pool, rng) else {
                continue;
            };
            let found = pool.remove(index);
            nation.discovered_cities.push(DiscoveredCity {
                nation: found.owner.clone(),
                nation_name: found.owner_name.clone(),
                city_name: found.city_name.clone(),
                tile: found.tile,
            });
            report.discoveries.push(found.clone());
        }
    }

    debug!(
        nation = %nation.id,
        tiles_found,
        treasure = report.treasure_gold,
        discoveries = report.discoveries.len(),
        "exploration resolved"
    );
    report
}

/// Reveal chance: undiscovered cities over unexplored tiles, capped at 100%.
fn reveal_chance_bps(undiscovered: usize, remaining_tiles: u64) -> u32 {
    if undiscovered == 0 {
        return 0;
    }
    if remaining_tiles == 0 {
        return BPS_SCALE;
    }
    let undiscovered = u64::try_from(undiscovered).unwrap_or(u64::MAX);
    let bps = undiscovered
        .saturating_mul(u64::from(BPS_SCALE))
        .checked_div(remaining_tiles)
        .unwrap_or(0)
        .min(u64::from(BPS_SCALE));
    u32::try_from(bps).unwrap_or(BPS_SCALE)
}

/// Choose an owner weighted by size, then one of its cities uniformly.
fn pick_candidate(pool: &[&CityCandidate], rng: &mut impl Rng) -> Option<usize> {
    let mut owners: Vec<(&NationId, u64)> = Vec::new();
    for c in pool {
        if !owners.iter().any(|(o, _)| *o == &c.owner) {
            owners.push((&c.owner, c.owner_weight.max(1)));
        }
    }
    let total = owners.iter().fold(0_u64, |acc, (_, w)| acc.saturating_add(*w));
    if total == 0 {
        return None;
    }

    let mut ticket = rng.random_range(0..total);
    let mut chosen = None;
    for (owner, weight) in owners {
        if ticket < weight {
            chosen = Some(owner);
            break;
        }
        ticket = ticket.saturating_sub(weight);
    }
    let chosen = chosen?;

    let cities: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, c)| &c.owner == chosen)
        .map(|(i, _)| i)
        .collect();
    if cities.is_empty() {
        return None;
    }
    cities.get(rng.random_range(0..cities.len())).copied()
}
