//! Error types for the nationstate-conflict crate.

use nationstate_diplomacy::DiplomacyError;
use nationstate_types::{NationId, TileId};

/// Errors raised before an attack or covert action is rolled.
#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    /// The tile holds no city.
    #[error("tile {0} has no city")]
    TileHasNoCity(TileId),

    /// The acting nation owns the target city.
    #[error("cannot target your own city on tile {0}")]
    OwnCity(TileId),

    /// The defending nation passed in does not own the tile's city.
    #[error("city on tile {tile} is not owned by {nation}")]
    DefenderMismatch {
        /// The target tile.
        tile: TileId,
        /// The nation that was passed as defender.
        nation: NationId,
    },

    /// The intel record passed in is not the attacker's record on the defender.
    #[error("intel record does not belong to this nation pair")]
    IntelMismatch,

    /// The acting nation has not surveyed the tile.
    #[error("tile {0} has not been surveyed")]
    NotSurveyed(TileId),

    /// A truce between the two nations is in force.
    #[error("truce active: {remaining_ms} ms remaining")]
    TruceActive {
        /// Time left on the truce, in milliseconds.
        remaining_ms: u64,
    },

    /// The attacker's power is below its city-scaled floor.
    #[error("military too weak: power {power}, need {required}")]
    MilitaryTooWeak {
        /// Current power.
        power: u64,
        /// Minimum power to attack.
        required: u64,
    },

    /// A cooldown gate failed.
    #[error(transparent)]
    Diplomacy(#[from] DiplomacyError),

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },
}

impl ConflictError {
    /// Shorthand for an overflow error.
    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }
}
