//! Entity structs for the nationstate engine.
//!
//! Every struct has explicit defaults at construction time. Loading a stored
//! document through serde fills absent nested fields with those defaults, so
//! the resolvers never branch on a missing key.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{
    BuildingKind, Commodity, CovertAction, NationAction, NationTrait, ResearchKind, Resource,
    SkillTrack, TradeStatus, TruceStatus, Unit,
};
use crate::ids::{NationId, PlayerId, TileId, TradeId, TruceId};

// ---------------------------------------------------------------------------
// Stockpiles
// ---------------------------------------------------------------------------

/// Quantities of the four natural resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceStock {
    /// Food on hand.
    pub food: u64,
    /// Steel on hand.
    pub steel: u64,
    /// Oil on hand.
    pub oil: u64,
    /// Gold on hand.
    pub gold: u64,
}

impl ResourceStock {
    /// Quantity of one resource.
    pub const fn get(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Food => self.food,
            Resource::Steel => self.steel,
            Resource::Oil => self.oil,
            Resource::Gold => self.gold,
        }
    }

    /// Mutable access to one resource.
    pub const fn get_mut(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Food => &mut self.food,
            Resource::Steel => &mut self.steel,
            Resource::Oil => &mut self.oil,
            Resource::Gold => &mut self.gold,
        }
    }
}

/// Unit counts of a nation's standing military.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Military {
    /// Infantry.
    pub troops: u64,
    /// Armour.
    pub tanks: u64,
    /// Air units.
    pub jets: u64,
}

impl Military {
    /// Count of one unit kind.
    pub const fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Troops => self.troops,
            Unit::Tanks => self.tanks,
            Unit::Jets => self.jets,
        }
    }

    /// Mutable access to one unit kind.
    pub const fn get_mut(&mut self, unit: Unit) -> &mut u64 {
        match unit {
            Unit::Troops => &mut self.troops,
            Unit::Tanks => &mut self.tanks,
            Unit::Jets => &mut self.jets,
        }
    }

    /// Weighted military strength: troops x1, tanks x5, jets x10.
    ///
    /// Saturates rather than overflowing.
    pub const fn power(&self) -> u64 {
        self.troops
            .saturating_add(self.tanks.saturating_mul(Unit::Tanks.power()))
            .saturating_add(self.jets.saturating_mul(Unit::Jets.power()))
    }
}

// ---------------------------------------------------------------------------
// Nation
// ---------------------------------------------------------------------------

/// The holder of a minister slot and the track experience it was won with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minister {
    /// The player holding the slot.
    pub player: PlayerId,
    /// The player's track experience when last recorded.
    pub exp: u64,
}

/// The four minister slots, one per skill track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leadership {
    /// Military track holder.
    pub commander_in_chief: Option<Minister>,
    /// Economist track holder.
    pub finance_minister: Option<Minister>,
    /// Scout track holder.
    pub chief_scout: Option<Minister>,
    /// Diplomat track holder.
    pub foreign_minister: Option<Minister>,
}

impl Leadership {
    /// The slot contested by `track`.
    pub const fn slot(&self, track: SkillTrack) -> Option<&Minister> {
        match track {
            SkillTrack::Military => self.commander_in_chief.as_ref(),
            SkillTrack::Economist => self.finance_minister.as_ref(),
            SkillTrack::Scout => self.chief_scout.as_ref(),
            SkillTrack::Diplomat => self.foreign_minister.as_ref(),
        }
    }

    /// Mutable access to the slot contested by `track`.
    pub const fn slot_mut(&mut self, track: SkillTrack) -> &mut Option<Minister> {
        match track {
            SkillTrack::Military => &mut self.commander_in_chief,
            SkillTrack::Economist => &mut self.finance_minister,
            SkillTrack::Scout => &mut self.chief_scout,
            SkillTrack::Diplomat => &mut self.foreign_minister,
        }
    }
}

/// A rival city this nation has found while exploring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredCity {
    /// The owning nation.
    pub nation: NationId,
    /// The owning nation's name.
    pub nation_name: String,
    /// The city's name.
    pub city_name: String,
    /// Where the city stands.
    pub tile: TileId,
}

/// Effects of hostile hacks currently applied to a nation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackState {
    /// Bank gold bonuses are suppressed until this instant.
    pub bank_disabled_until: Option<DateTime<Utc>>,
}

/// A paid yield multiplier window for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boost {
    /// When the boost stops applying.
    pub end_time: DateTime<Utc>,
    /// Yield multiplier while active.
    pub multiplier: u32,
}

/// A guild-scoped nation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    /// The owning guild.
    pub id: NationId,
    /// Display name.
    pub name: String,
    /// Founding trait, if one was chosen.
    #[serde(default)]
    pub nation_trait: Option<NationTrait>,
    /// Current population.
    #[serde(default = "default_population")]
    pub population: u64,
    /// Highest population reached since the last city loss.
    #[serde(default)]
    pub peak_population: Option<u64>,
    /// Resource stockpile.
    #[serde(default)]
    pub resources: ResourceStock,
    /// Standing military.
    #[serde(default)]
    pub military: Military,
    /// Building counts, including cities.
    #[serde(default = "default_buildings")]
    pub buildings: BTreeMap<BuildingKind, u64>,
    /// Completed research.
    #[serde(default)]
    pub research: BTreeSet<ResearchKind>,
    /// Minister slots.
    #[serde(default)]
    pub leadership: Leadership,
    /// Tiles the nation has explored into and may survey.
    #[serde(default = "default_tiles_discovered")]
    pub tiles_discovered: u64,
    /// Rival cities found while exploring.
    #[serde(default)]
    pub discovered_cities: Vec<DiscoveredCity>,
    /// Last use of each nation-level action.
    #[serde(default)]
    pub cooldowns: BTreeMap<NationAction, DateTime<Utc>>,
    /// Hostile hack effects.
    #[serde(default)]
    pub hacks: HackState,
    /// Active or lapsed yield boosts.
    #[serde(default)]
    pub boosts: BTreeMap<Resource, Boost>,
    /// Number of players who have joined.
    #[serde(default)]
    pub player_count: u64,
    /// Founding time.
    pub created_at: DateTime<Utc>,
}

const fn default_population() -> u64 {
    1
}

const fn default_tiles_discovered() -> u64 {
    1
}

fn default_buildings() -> BTreeMap<BuildingKind, u64> {
    BTreeMap::from([(BuildingKind::City, 1)])
}

impl Nation {
    /// A freshly founded nation: one city, one citizen, one discovered tile.
    pub fn new(
        id: NationId,
        name: impl Into<String>,
        nation_trait: Option<NationTrait>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            nation_trait,
            population: default_population(),
            peak_population: None,
            resources: ResourceStock::default(),
            military: Military::default(),
            buildings: default_buildings(),
            research: BTreeSet::new(),
            leadership: Leadership::default(),
            tiles_discovered: default_tiles_discovered(),
            discovered_cities: Vec::new(),
            cooldowns: BTreeMap::new(),
            hacks: HackState::default(),
            boosts: BTreeMap::new(),
            player_count: 0,
            created_at: now,
        }
    }

    /// Count of one building kind (zero when never built).
    pub fn building_count(&self, kind: BuildingKind) -> u64 {
        self.buildings.get(&kind).copied().unwrap_or(0)
    }

    /// Raw city count. Zero means the nation is eliminated.
    pub fn city_count(&self) -> u64 {
        self.building_count(BuildingKind::City)
    }

    /// City count floored at one, for per-city divisions and caps.
    pub fn cities_or_one(&self) -> u64 {
        self.city_count().max(1)
    }

    /// Whether a research flag is set.
    pub fn has_research(&self, kind: ResearchKind) -> bool {
        self.research.contains(&kind)
    }

    /// Quantity held of a resource or unit kind.
    pub const fn holding(&self, item: Commodity) -> u64 {
        match item {
            Commodity::Resource(r) => self.resources.get(r),
            Commodity::Unit(u) => self.military.get(u),
        }
    }

    /// Mutable access to a resource or unit count.
    pub const fn holding_mut(&mut self, item: Commodity) -> &mut u64 {
        match item {
            Commodity::Resource(r) => self.resources.get_mut(r),
            Commodity::Unit(u) => self.military.get_mut(u),
        }
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// Static yield contributions of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileResources {
    /// Gold bonus.
    pub gold: u64,
    /// Steel bonus.
    pub steel: u64,
    /// Oil bonus.
    pub oil: u64,
    /// Food bonus.
    pub fertility: u64,
}

impl TileResources {
    /// Land bonus this tile contributes to a resource's yield.
    pub const fn bonus(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Food => self.fertility,
            Resource::Steel => self.steel,
            Resource::Oil => self.oil,
            Resource::Gold => self.gold,
        }
    }
}

/// A city standing on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// City name.
    pub name: String,
    /// The owning nation.
    pub owner: NationId,
    /// The owning nation's name.
    pub owner_name: String,
    /// When it was founded.
    pub founded_at: DateTime<Utc>,
}

/// A unit of world map space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// World coordinate.
    pub id: TileId,
    /// Yield contributions.
    #[serde(default)]
    pub resources: TileResources,
    /// Nations that have surveyed this tile.
    #[serde(default)]
    pub surveyed_by: BTreeSet<NationId>,
    /// The city on this tile. `None` once captured.
    #[serde(default)]
    pub city: Option<City>,
}

impl Tile {
    /// An empty, unsurveyed tile.
    pub const fn new(id: TileId, resources: TileResources) -> Self {
        Self {
            id,
            resources,
            surveyed_by: BTreeSet::new(),
            city: None,
        }
    }

    /// Whether `nation` owns the city on this tile.
    pub fn is_owned_by(&self, nation: &NationId) -> bool {
        self.city.as_ref().is_some_and(|c| &c.owner == nation)
    }

    /// Whether `nation` has surveyed this tile.
    pub fn is_surveyed_by(&self, nation: &NationId) -> bool {
        self.surveyed_by.contains(nation)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Experience per skill track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillExp {
    /// Military track.
    pub military: u64,
    /// Economist track.
    pub economist: u64,
    /// Scout track.
    pub scout: u64,
    /// Diplomat track.
    pub diplomat: u64,
}

impl SkillExp {
    /// Experience on one track.
    pub const fn get(&self, track: SkillTrack) -> u64 {
        match track {
            SkillTrack::Military => self.military,
            SkillTrack::Economist => self.economist,
            SkillTrack::Scout => self.scout,
            SkillTrack::Diplomat => self.diplomat,
        }
    }

    /// Mutable access to one track.
    pub const fn get_mut(&mut self, track: SkillTrack) -> &mut u64 {
        match track {
            SkillTrack::Military => &mut self.military,
            SkillTrack::Economist => &mut self.economist,
            SkillTrack::Scout => &mut self.scout,
            SkillTrack::Diplomat => &mut self.diplomat,
        }
    }
}

/// A member of a nation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Chat user id.
    pub id: PlayerId,
    /// The nation the player joined.
    pub nation: NationId,
    /// Track experience.
    #[serde(default)]
    pub exp: SkillExp,
    /// Last resource command, for the shared player cooldown.
    #[serde(default)]
    pub last_resource_action: Option<DateTime<Utc>>,
}

impl Player {
    /// A new player with no experience.
    pub const fn new(id: PlayerId, nation: NationId) -> Self {
        Self {
            id,
            nation,
            exp: SkillExp {
                military: 0,
                economist: 0,
                scout: 0,
                diplomat: 0,
            },
            last_resource_action: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

/// A rival city known to the spying nation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownCity {
    /// Where the city stands.
    pub tile: TileId,
    /// City name.
    pub name: String,
}

/// Point-in-time copy of a rival's state from the last successful spy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelSnapshot {
    /// Population.
    pub population: u64,
    /// Stockpile.
    pub resources: ResourceStock,
    /// Military.
    pub military: Military,
    /// Buildings.
    pub buildings: BTreeMap<BuildingKind, u64>,
    /// Research.
    pub research: BTreeSet<ResearchKind>,
    /// Joined players.
    pub player_count: u64,
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
}

/// Failure bookkeeping for one covert action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptLog {
    /// Failures since the last success or alert.
    pub failed_attempts: u32,
    /// Last attempt, successful or not.
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// One nation's accumulated knowledge about another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intel {
    /// The nation holding the intel.
    pub spying: NationId,
    /// The nation being watched.
    pub target: NationId,
    /// Target name at the time of the last update.
    #[serde(default)]
    pub target_name: String,
    /// Last successful spy snapshot.
    #[serde(default)]
    pub snapshot: Option<IntelSnapshot>,
    /// Target cities known to the spying nation.
    #[serde(default)]
    pub known_cities: Vec<KnownCity>,
    /// Spy bookkeeping.
    #[serde(default)]
    pub spy: AttemptLog,
    /// Sabotage bookkeeping.
    #[serde(default)]
    pub sabotage: AttemptLog,
    /// Hack bookkeeping.
    #[serde(default)]
    pub hack: AttemptLog,
}

impl Intel {
    /// An empty intel record.
    pub fn new(spying: NationId, target: NationId, target_name: impl Into<String>) -> Self {
        Self {
            spying,
            target,
            target_name: target_name.into(),
            snapshot: None,
            known_cities: Vec::new(),
            spy: AttemptLog::default(),
            sabotage: AttemptLog::default(),
            hack: AttemptLog::default(),
        }
    }

    /// Bookkeeping for one covert action.
    pub const fn log(&self, action: CovertAction) -> &AttemptLog {
        match action {
            CovertAction::Spy => &self.spy,
            CovertAction::Sabotage => &self.sabotage,
            CovertAction::Hack => &self.hack,
        }
    }

    /// Mutable bookkeeping for one covert action.
    pub const fn log_mut(&mut self, action: CovertAction) -> &mut AttemptLog {
        match action {
            CovertAction::Spy => &mut self.spy,
            CovertAction::Sabotage => &mut self.sabotage,
            CovertAction::Hack => &mut self.hack,
        }
    }

    /// Record a known city unless its tile is already listed.
    pub fn remember_city(&mut self, tile: TileId, name: impl Into<String>) -> bool {
        if self.known_cities.iter().any(|c| c.tile == tile) {
            return false;
        }
        self.known_cities.push(KnownCity {
            tile,
            name: name.into(),
        });
        true
    }
}

// ---------------------------------------------------------------------------
// Agreements
// ---------------------------------------------------------------------------

/// A one-way payment from truce requester to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribute {
    /// The resource paid.
    pub resource: Resource,
    /// Amount paid.
    pub amount: u64,
}

/// The bilateral truce record for a nation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truce {
    /// Stable record id, kept across renewals.
    pub id: TruceId,
    /// The proposing nation of the current round.
    pub requester: NationId,
    /// The nation that must answer.
    pub target: NationId,
    /// Current state.
    pub status: TruceStatus,
    /// Duration of the truce once accepted.
    pub effective_hours: u32,
    /// Optional tribute paid on acceptance.
    pub tribute: Option<Tribute>,
    /// When the current proposal was made.
    pub offer_created_at: DateTime<Utc>,
    /// When the current proposal lapses.
    pub offer_expires_at: DateTime<Utc>,
    /// Start of the active window.
    pub start_time: Option<DateTime<Utc>>,
    /// End of the active window.
    pub end_time: Option<DateTime<Utc>>,
    /// Last state change.
    pub last_updated_at: DateTime<Utc>,
}

impl Truce {
    /// Whether this record is an accepted truce still inside its window.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == TruceStatus::Accepted && self.end_time.is_some_and(|end| end > now)
    }

    /// Whether this record is a pending offer that has not yet lapsed.
    pub fn is_live_offer(&self, now: DateTime<Utc>) -> bool {
        self.status == TruceStatus::Pending && now < self.offer_expires_at
    }

    /// Whether this record binds the two nations, in either direction.
    pub fn involves(&self, a: &NationId, b: &NationId) -> bool {
        (&self.requester == a && &self.target == b) || (&self.requester == b && &self.target == a)
    }
}

/// An amount of one commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTerms {
    /// The item.
    pub item: Commodity,
    /// How many.
    pub amount: u64,
}

/// A trade proposal between two nations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Record id.
    pub id: TradeId,
    /// The proposing nation.
    pub requester: NationId,
    /// The nation asked to supply `request`.
    pub target: NationId,
    /// What the requester wants.
    pub request: TradeTerms,
    /// What the requester offers. `None` makes an open trade.
    pub offer: Option<TradeTerms>,
    /// The target's counter-offer, replacing `offer` if accepted.
    pub counter: Option<TradeTerms>,
    /// Who made the counter-offer.
    pub counter_by: Option<NationId>,
    /// Current state.
    pub status: TradeStatus,
    /// The side that acted last; the other side answers next.
    pub last_action_by: NationId,
    /// When proposed.
    pub created_at: DateTime<Utc>,
    /// When the proposal lapses.
    pub expires_at: DateTime<Utc>,
    /// When accepted, rejected or expired.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// What the requester hands over if accepted now.
    pub fn effective_offer(&self) -> Option<TradeTerms> {
        self.counter.or(self.offer)
    }
}
