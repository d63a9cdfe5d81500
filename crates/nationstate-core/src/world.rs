//! The in-memory world store.
//!
//! [`GameWorld`] holds every persisted document: nations, players, tiles,
//! intel records, exile entries and both agreement books. The engine reads documents out
//! of it by clone, resolves a command against the copies, and writes the
//! copies back only when the command succeeds.

use std::collections::{BTreeMap, BTreeSet};

use nationstate_diplomacy::{TradeBook, TruceBook};
use nationstate_economy::territory::CityCandidate;
use nationstate_types::{Intel, Nation, NationId, Player, PlayerId, Tile, TileId};

use crate::error::EngineError;

/// Every document the engine manages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameWorld {
    /// Nations by id.
    pub nations: BTreeMap<NationId, Nation>,
    /// Players by id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Tiles that have been founded on or surveyed.
    pub tiles: BTreeMap<TileId, Tile>,
    /// Intel records keyed by (spying nation, target nation).
    pub intel: BTreeMap<(NationId, NationId), Intel>,
    /// Truce records.
    pub truces: TruceBook,
    /// Trade records.
    pub trades: TradeBook,
    /// Players barred from rejoining a nation.
    pub exiled: BTreeSet<(NationId, PlayerId)>,
}

impl GameWorld {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a nation.
    pub fn nation(&self, id: &NationId) -> Result<&Nation, EngineError> {
        self.nations
            .get(id)
            .ok_or_else(|| EngineError::NationNotFound(id.clone()))
    }

    /// Look up a player.
    pub fn player(&self, id: &PlayerId) -> Result<&Player, EngineError> {
        self.players
            .get(id)
            .ok_or_else(|| EngineError::PlayerNotFound(id.clone()))
    }

    /// Look up a tile.
    pub fn tile(&self, id: TileId) -> Result<&Tile, EngineError> {
        self.tiles.get(&id).ok_or(EngineError::TileNotFound(id))
    }

    /// Clone a player and the nation they act for.
    pub fn actor(&self, player: &PlayerId) -> Result<(Player, Nation), EngineError> {
        let player = self.player(player)?.clone();
        let nation = self.nation(&player.nation)?.clone();
        Ok((player, nation))
    }

    /// Tiles holding a city owned by `nation`.
    pub fn owned_tiles(&self, nation: &NationId) -> Vec<Tile> {
        self.tiles
            .values()
            .filter(|t| t.is_owned_by(nation))
            .cloned()
            .collect()
    }

    /// Nations holding at least one city.
    pub fn city_owners(&self) -> BTreeSet<NationId> {
        self.tiles
            .values()
            .filter_map(|t| t.city.as_ref().map(|c| c.owner.clone()))
            .collect()
    }

    /// Whether `player` has been exiled from `nation`.
    pub fn is_exiled(&self, nation: &NationId, player: &PlayerId) -> bool {
        self.exiled.contains(&(nation.clone(), player.clone()))
    }

    /// Every tile id already present in the world.
    pub fn used_tile_ids(&self) -> BTreeSet<TileId> {
        self.tiles.keys().copied().collect()
    }

    /// Number of tiles `nation` has surveyed.
    pub fn surveyed_count(&self, nation: &NationId) -> u64 {
        let count = self.tiles.values().filter(|t| t.is_surveyed_by(nation)).count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    /// Every standing city, weighted by its owner's population and players.
    pub fn city_candidates(&self) -> Vec<CityCandidate> {
        self.tiles
            .values()
            .filter_map(|tile| {
                let city = tile.city.as_ref()?;
                let owner_weight = self
                    .nations
                    .get(&city.owner)
                    .map_or(0, |n| n.population.saturating_add(n.player_count));
                Some(CityCandidate {
                    tile: tile.id,
                    city_name: city.name.clone(),
                    owner: city.owner.clone(),
                    owner_name: city.owner_name.clone(),
                    owner_weight,
                })
            })
            .collect()
    }

    /// Clone the intel `spying` holds on `target`, or start a fresh record.
    pub fn intel_on(&self, spying: &NationId, target: &NationId, target_name: &str) -> Intel {
        self.intel
            .get(&(spying.clone(), target.clone()))
            .cloned()
            .unwrap_or_else(|| Intel::new(spying.clone(), target.clone(), target_name))
    }

    /// Clone every intel record whose target is `target`.
    pub fn intel_targeting(&self, target: &NationId) -> Vec<Intel> {
        self.intel
            .values()
            .filter(|i| &i.target == target)
            .cloned()
            .collect()
    }

    /// Store a nation document.
    pub fn put_nation(&mut self, nation: Nation) {
        self.nations.insert(nation.id.clone(), nation);
    }

    /// Store a player document.
    pub fn put_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    /// Store a tile document.
    pub fn put_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    /// Store an intel record.
    pub fn put_intel(&mut self, intel: Intel) {
        self.intel
            .insert((intel.spying.clone(), intel.target.clone()), intel);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use nationstate_types::{City, TileResources};

    use super::*;

    fn make_nation(id: &str, population: u64) -> Nation {
        let mut nation = Nation::new(NationId::new(id), format!("Nation {id}"), None, Utc::now());
        nation.population = population;
        nation
    }

    fn city_tile(id: u32, owner: &Nation) -> Tile {
        let mut tile = Tile::new(TileId(id), TileResources::default());
        tile.surveyed_by.insert(owner.id.clone());
        tile.city = Some(City {
            name: format!("City {id}"),
            owner: owner.id.clone(),
            owner_name: owner.name.clone(),
            founded_at: Utc::now(),
        });
        tile
    }

    fn make_world() -> GameWorld {
        let (a, b) = (make_nation("a", 40), make_nation("b", 7));
        let mut world = GameWorld::new();
        world.put_tile(city_tile(1, &a));
        world.put_tile(city_tile(2, &b));
        world.put_tile(city_tile(5, &a));
        let mut wild = Tile::new(TileId(9), TileResources::default());
        wild.surveyed_by.insert(a.id.clone());
        world.put_tile(wild);
        world.put_nation(a);
        world.put_nation(b);
        world
    }

    #[test]
    fn owned_and_surveyed_tiles() {
        let world = make_world();
        let a = NationId::new("a");
        let owned: Vec<TileId> = world.owned_tiles(&a).iter().map(|t| t.id).collect();
        assert_eq!(owned, vec![TileId(1), TileId(5)]);
        assert_eq!(world.surveyed_count(&a), 3);
        assert_eq!(world.surveyed_count(&NationId::new("b")), 1);
        assert_eq!(world.used_tile_ids().len(), 4);
    }

    #[test]
    fn city_owners_are_deduplicated() {
        let mut world = make_world();
        let owners: Vec<NationId> = world.city_owners().into_iter().collect();
        assert_eq!(owners, vec![NationId::new("a"), NationId::new("b")]);

        let mut ruin = world.tile(TileId(2)).unwrap().clone();
        ruin.city = None;
        world.put_tile(ruin);
        assert_eq!(world.city_owners().len(), 1);
    }

    #[test]
    fn candidates_cover_every_city() {
        let world = make_world();
        let candidates = world.city_candidates();
        assert_eq!(candidates.len(), 3);
        let b_city = candidates.iter().find(|c| c.tile == TileId(2)).unwrap();
        assert_eq!(b_city.owner, NationId::new("b"));
        assert_eq!(b_city.owner_weight, 7);
    }

    #[test]
    fn intel_is_created_on_demand() {
        let mut world = make_world();
        let a = world.nation(&NationId::new("a")).unwrap().clone();
        let b = world.nation(&NationId::new("b")).unwrap().clone();

        let mut intel = world.intel_on(&a.id, &b.id, &b.name);
        assert_eq!(intel.target_name, "Nation b");
        intel.spy.failed_attempts = 2;
        world.put_intel(intel);

        assert_eq!(world.intel_on(&a.id, &b.id, &b.name).spy.failed_attempts, 2);
        assert_eq!(world.intel_targeting(&b.id).len(), 1);
        assert!(world.intel_targeting(&a.id).is_empty());
    }

    #[test]
    fn missing_documents_are_errors() {
        let world = make_world();
        assert!(matches!(
            world.nation(&NationId::new("zz")),
            Err(EngineError::NationNotFound(_))
        ));
        assert!(matches!(world.tile(TileId(3)), Err(EngineError::TileNotFound(_))));
        assert!(matches!(
            world.actor(&PlayerId::new("p")),
            Err(EngineError::PlayerNotFound(_))
        ));
    }
}
