//! Error types for the nationstate-diplomacy crate.

use nationstate_types::{Commodity, NationAction, NationId, TradeId, TradeStatus, TruceId, TruceStatus};

/// Which cooldown blocked an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownScope {
    /// The player's shared resource-command cooldown.
    Player,
    /// A nation-level action cooldown.
    Nation(NationAction),
}

/// Errors raised by cooldown gates and agreement state machines.
///
/// Every variant is raised before any mutation.
#[derive(Debug, thiserror::Error)]
pub enum DiplomacyError {
    /// A cooldown has not elapsed.
    #[error("cooldown active ({scope:?}): {remaining_ms} ms remaining")]
    CooldownActive {
        /// The blocking cooldown.
        scope: CooldownScope,
        /// Time left, in milliseconds.
        remaining_ms: u64,
    },

    /// A nation tried to make an agreement with itself.
    #[error("a nation cannot make an agreement with itself")]
    SelfTarget,

    /// An amount or duration was zero.
    #[error("amount must be positive")]
    InvalidAmount,

    /// A party does not hold what it proposes to give.
    #[error("{nation} has {available} {item}, needs {needed}")]
    InsufficientHoldings {
        /// The short nation.
        nation: NationId,
        /// The item.
        item: Commodity,
        /// Amount required.
        needed: u64,
        /// Amount held.
        available: u64,
    },

    /// A truce between the pair is already in force.
    #[error("truce already active: {remaining_ms} ms remaining")]
    TruceAlreadyActive {
        /// Time left on the truce, in milliseconds.
        remaining_ms: u64,
    },

    /// A truce offer between the pair is already awaiting an answer.
    #[error("truce offer already pending")]
    TruceOfferPending,

    /// No truce record with this id.
    #[error("truce not found: {0}")]
    TruceNotFound(TruceId),

    /// The truce is not awaiting an answer.
    #[error("truce is {0:?}, not pending")]
    TruceNotPending(TruceStatus),

    /// No trade record with this id.
    #[error("trade not found: {0}")]
    TradeNotFound(TradeId),

    /// The trade is not awaiting an answer.
    #[error("trade is {0:?}, not open")]
    TradeNotOpen(TradeStatus),

    /// The trade cannot take a counter-offer in its current state.
    #[error("trade is {0:?}; counter-offers are only allowed while pending")]
    CounterNotAllowed(TradeStatus),

    /// An open trade names no offer and must be countered, not accepted.
    #[error("open trades must be countered or rejected")]
    OpenTradeNeedsCounter,

    /// The responding nation may not answer at this step.
    #[error("{0} may not respond to this agreement now")]
    NotAuthorized(NationId),

    /// The nations passed in are not the agreement's parties.
    #[error("nations do not match the agreement's parties")]
    PartyMismatch,
}
