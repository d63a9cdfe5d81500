//! Error types for the nationstate-economy crate.
//!
//! Every variant is a precondition or capability failure: the operation
//! that returned it left all entities untouched.

use nationstate_types::{BuildingKind, ResearchKind, Resource, TileId};

/// Errors raised by economic and progression rules.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// A research prerequisite has not been completed.
    #[error("research required: {research:?}")]
    ResearchRequired {
        /// The missing research.
        research: ResearchKind,
    },

    /// The nation owns none of a required building.
    #[error("building required: {building:?}")]
    BuildingRequired {
        /// The missing building.
        building: BuildingKind,
    },

    /// The nation cannot pay a cost.
    #[error("insufficient {resource}: need {needed}, have {available}")]
    InsufficientResources {
        /// The short resource.
        resource: Resource,
        /// Amount required.
        needed: u64,
        /// Amount on hand.
        available: u64,
    },

    /// The per-city building cap is reached.
    #[error("cap exceeded for {building:?}: {count} built, cap {cap}")]
    CapExceeded {
        /// The capped building.
        building: BuildingKind,
        /// Current count.
        count: u64,
        /// Cap for the current city count.
        cap: u64,
    },

    /// The building cannot be bought through construction.
    #[error("{0:?} cannot be constructed directly")]
    NotConstructible(BuildingKind),

    /// The research flag is already set.
    #[error("already researched: {0:?}")]
    AlreadyResearched(ResearchKind),

    /// Troops already match the population.
    #[error("population cap reached: {troops} troops for {population} population")]
    PopulationCapReached {
        /// Current population.
        population: u64,
        /// Current troops.
        troops: u64,
    },

    /// The resource has no market rate.
    #[error("{0} cannot be sold")]
    NotSellable(Resource),

    /// A quantity argument was zero.
    #[error("amount must be positive")]
    InvalidAmount,

    /// No discovered tile is left to survey.
    #[error("no tiles to survey: {discovered} discovered, {surveyed} surveyed")]
    NothingToSurvey {
        /// Tiles discovered by the nation.
        discovered: u64,
        /// Tiles already surveyed by the nation.
        surveyed: u64,
    },

    /// Every world tile is already in use.
    #[error("the world has no free tiles")]
    WorldFull,

    /// The nation has not surveyed the tile.
    #[error("tile {0} has not been surveyed")]
    TileNotSurveyed(TileId),

    /// The tile already hosts a city.
    #[error("tile {0} already has a city")]
    TileOccupied(TileId),

    /// Not enough population to found another city.
    #[error("population too low: need {required}, have {population}")]
    PopulationTooLow {
        /// Population required.
        required: u64,
        /// Current population.
        population: u64,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl EconomyError {
    /// Shorthand for an overflow error.
    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }
}
