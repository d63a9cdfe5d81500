//! Enumeration types for the nationstate engine.
//!
//! Stored keys use the lowercase names the game's documents have always used
//! (`oilrig`, `mickdonalds`, `shit_coins`), so serialized nations stay
//! readable by the command layer.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources and units
// ---------------------------------------------------------------------------

/// A natural resource held in a nation's stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Feeds population growth and troop deployment.
    Food,
    /// Construction and vehicle material.
    Steel,
    /// Fuel for tanks and jets.
    Oil,
    /// Currency for buildings and research.
    Gold,
}

impl Resource {
    /// Every resource, in stockpile order.
    pub const ALL: [Self; 4] = [Self::Food, Self::Steel, Self::Oil, Self::Gold];

    /// Stable lowercase key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Steel => "steel",
            Self::Oil => "oil",
            Self::Gold => "gold",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// A deployable military unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Infantry, worth 1 power.
    Troops,
    /// Armour, worth 5 power.
    Tanks,
    /// Air units, worth 10 power.
    Jets,
}

impl Unit {
    /// Unit kinds ordered from most to least expensive.
    pub const EXPENSIVE_FIRST: [Self; 3] = [Self::Jets, Self::Tanks, Self::Troops];

    /// Power contributed by a single unit of this kind.
    pub const fn power(self) -> u64 {
        match self {
            Self::Troops => 1,
            Self::Tanks => 5,
            Self::Jets => 10,
        }
    }

    /// Stable lowercase key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Troops => "troops",
            Self::Tanks => "tanks",
            Self::Jets => "jets",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.key())
    }
}

/// Anything a nation can hold a count of: a resource or a unit kind.
///
/// Used as the yield key and as the item of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Commodity {
    /// A stockpiled resource.
    Resource(Resource),
    /// A military unit kind.
    Unit(Unit),
}

impl Commodity {
    /// Parse a user-supplied item name, accepting singular and plural forms.
    pub fn parse(raw: &str) -> Option<Self> {
        let item = match raw.trim().to_ascii_lowercase().as_str() {
            "food" | "foods" => Self::Resource(Resource::Food),
            "steel" | "steels" => Self::Resource(Resource::Steel),
            "oil" | "oils" => Self::Resource(Resource::Oil),
            "gold" | "golds" => Self::Resource(Resource::Gold),
            "troop" | "troops" => Self::Unit(Unit::Troops),
            "tank" | "tanks" => Self::Unit(Unit::Tanks),
            "jet" | "jets" => Self::Unit(Unit::Jets),
            _ => return None,
        };
        Some(item)
    }

    /// The resource, when this commodity is one.
    pub const fn as_resource(self) -> Option<Resource> {
        match self {
            Self::Resource(r) => Some(r),
            Self::Unit(_) => None,
        }
    }
}

impl From<Resource> for Commodity {
    fn from(r: Resource) -> Self {
        Self::Resource(r)
    }
}

impl From<Unit> for Commodity {
    fn from(u: Unit) -> Self {
        Self::Unit(u)
    }
}

impl core::fmt::Display for Commodity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Resource(r) => r.fmt(f),
            Self::Unit(u) => u.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Buildings and research
// ---------------------------------------------------------------------------

/// A constructible building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    /// A settlement. Counted like a building, created by settling.
    City,
    /// Boosts troop deployment.
    Barracks,
    /// Boosts steel mining.
    Factory,
    /// Boosts jet deployment.
    Hangar,
    /// Boosts oil drilling.
    OilRig,
    /// Boosts farming.
    MickDonalds,
    /// Boosts gold mining unless hacked.
    Bank,
    /// Boosts tank deployment.
    Depot,
}

impl BuildingKind {
    /// Every building kind.
    pub const ALL: [Self; 8] = [
        Self::City,
        Self::Barracks,
        Self::Factory,
        Self::Hangar,
        Self::OilRig,
        Self::MickDonalds,
        Self::Bank,
        Self::Depot,
    ];
}

/// A one-shot research unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchKind {
    /// Unlocks depots and tanks.
    Manufacturing,
    /// Unlocks hangars and jets.
    Flight,
    /// Unlocks banks.
    Banking,
    /// Unlocks the nation token launch.
    ShitCoins,
    /// Unlocks `MickDonalds`.
    HappyMeals,
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// A player's experience track. Each track backs one minister slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillTrack {
    /// Attacks and deployments. Backs the commander in chief.
    Military,
    /// Gathering, building and selling. Backs the finance minister.
    Economist,
    /// Exploring, surveying and settling. Backs the chief scout.
    Scout,
    /// Espionage and envoys. Backs the foreign minister.
    Diplomat,
}

impl SkillTrack {
    /// Every track.
    pub const ALL: [Self; 4] = [Self::Military, Self::Economist, Self::Scout, Self::Diplomat];

    /// Title of the minister slot this track contests.
    pub const fn minister_title(self) -> &'static str {
        match self {
            Self::Military => "Commander in Chief",
            Self::Economist => "Finance Minister",
            Self::Scout => "Chief Scout",
            Self::Diplomat => "Foreign Minister",
        }
    }
}

/// A nation-wide modifier chosen at founding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NationTrait {
    /// Bonus food yield.
    Agricultural,
    /// Bonus steel yield.
    Industrial,
    /// Bonus gold yield.
    Mercantile,
    /// Better spy odds and a more forgiving spy alert threshold.
    Stealthy,
    /// Chance of an extra tile when exploring.
    Nomadic,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// An action gated by a nation-level cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NationAction {
    /// Attacking a rival city.
    Attack,
    /// Spying on a rival.
    Spy,
    /// Sabotaging a rival.
    Sabotage,
    /// Hacking a rival's banks.
    Hack,
    /// Sending an envoy.
    Envoy,
    /// Launching the nation token.
    LaunchShitcoin,
}

/// A covert operation against a rival nation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovertAction {
    /// Refresh the intel snapshot.
    Spy,
    /// Steal resources and destroy units.
    Sabotage,
    /// Disable the target's bank bonus.
    Hack,
}

impl CovertAction {
    /// The nation cooldown this operation consumes.
    pub const fn nation_action(self) -> NationAction {
        match self {
            Self::Spy => NationAction::Spy,
            Self::Sabotage => NationAction::Sabotage,
            Self::Hack => NationAction::Hack,
        }
    }
}

// ---------------------------------------------------------------------------
// Agreement statuses
// ---------------------------------------------------------------------------

/// Lifecycle state of a truce record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruceStatus {
    /// Awaiting the target's answer.
    Pending,
    /// In force between `start_time` and `end_time`.
    Accepted,
    /// Declined by the target.
    Rejected,
    /// The offer lapsed or the tribute could not be paid.
    Expired,
}

/// Lifecycle state of a trade proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeStatus {
    /// Awaiting the target's answer.
    Pending,
    /// The target countered; awaiting the requester's answer.
    PendingCounter,
    /// Goods exchanged.
    Accepted,
    /// Declined.
    Rejected,
    /// Lapsed, or a side could no longer pay at accept time.
    Expired,
}

impl TradeStatus {
    /// Whether the trade is still waiting on a response.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::PendingCounter)
    }
}

// ---------------------------------------------------------------------------
// Game modes
// ---------------------------------------------------------------------------

/// How a game ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Runs until one nation holds every city.
    #[default]
    Sandbox,
    /// Also ends at the configured season end.
    #[serde(alias = "conquest")]
    Seasonal,
}

/// What nations are ranked by when a season ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VictoryType {
    /// Military power.
    #[default]
    #[serde(alias = "power")]
    Military,
    /// City count, then population.
    Cities,
    /// Gold on hand.
    Gold,
}
