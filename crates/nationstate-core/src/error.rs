//! Error types for the nationstate-core crate.
//!
//! Resolver errors pass through unchanged inside their crate's variant, so
//! callers can match on the precise precondition that failed.

use nationstate_conflict::ConflictError;
use nationstate_diplomacy::DiplomacyError;
use nationstate_economy::EconomyError;
use nationstate_types::{NationId, PlayerId, TileId};

use crate::config::ConfigError;

/// Errors returned by [`Engine`](crate::engine::Engine) commands.
///
/// Every variant is raised before the world is touched.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No nation with this id.
    #[error("nation not found: {0}")]
    NationNotFound(NationId),

    /// No player with this id.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// No tile with this id.
    #[error("tile not found: {0}")]
    TileNotFound(TileId),

    /// The player does not belong to this nation.
    #[error("player {player} is not a member of nation {nation}")]
    NotAMember {
        /// The player.
        player: PlayerId,
        /// The nation.
        nation: NationId,
    },

    /// The player was exiled from this nation and cannot rejoin.
    #[error("player {player} is exiled from nation {nation}")]
    Exiled {
        /// The player.
        player: PlayerId,
        /// The nation.
        nation: NationId,
    },

    /// The player is not exiled from this nation.
    #[error("player {player} is not exiled from nation {nation}")]
    NotExiled {
        /// The player.
        player: PlayerId,
        /// The nation.
        nation: NationId,
    },

    /// A nation or player with this id already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// An economy rule rejected the command.
    #[error(transparent)]
    Economy(#[from] EconomyError),

    /// A conflict rule rejected the command.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// A cooldown or agreement rule rejected the command.
    #[error(transparent)]
    Diplomacy(#[from] DiplomacyError),

    /// Configuration could not be loaded.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },
}
