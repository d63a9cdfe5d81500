//! Shared type definitions for the nationstate engine.
//!
//! This crate is the single source of truth for the persisted entities every
//! resolver reads and mutates: nations, tiles, players, intel records and the
//! two bilateral agreement kinds. Nested fields that the document store
//! leaves optional are modelled here with explicit defaults, so resolver
//! code can assume presence.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers (guild snowflakes, tile numbers, UUIDs)
//! - [`enums`] -- Resources, units, buildings, research, skill tracks, statuses, game modes
//! - [`structs`] -- Entity structs (nation, tile, player, intel, truce, trade)

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    BuildingKind, Commodity, CovertAction, GameType, NationAction, NationTrait, ResearchKind,
    Resource, SkillTrack, TradeStatus, TruceStatus, Unit, VictoryType,
};
pub use ids::{NationId, PlayerId, TileId, TradeId, TruceId};
pub use structs::{
    AttemptLog, Boost, City, DiscoveredCity, HackState, Intel, IntelSnapshot, KnownCity,
    Leadership, Military, Minister, Nation, Player, ResourceStock, SkillExp, Tile, TileResources,
    Trade, TradeTerms, Tribute, Truce,
};
