//! Trade proposals, counter-offers and exchanges.
//!
//! ```text
//! pending --counter--> pendingCounter --accept--> accepted
//!    |  \--accept--> accepted               \--reject--> rejected
//!    |   \--reject--> rejected               \--lapse / short--> expired
//!     \--lapse / short--> expired
//! ```
//!
//! `last_action_by` is the authorization gate: only the nation that did
//! not act last may answer. A trade without an offer is open and must be
//! countered or rejected.
//!
//! Holdings are re-checked on both sides when a trade is accepted. If
//! either side is short the trade expires rather than completing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use nationstate_types::{Nation, NationId, Trade, TradeId, TradeStatus, TradeTerms};

use crate::config::{AgreementConfig, millis};
use crate::error::DiplomacyError;

/// Why a trade ended up expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeExpiry {
    /// Nobody answered within the offer window.
    OfferLapsed,
    /// A side no longer held what it had to hand over.
    InsufficientHoldings,
}

/// The outcome of acting on a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeResolution {
    /// The exchange happened.
    Accepted {
        /// What the requester handed over.
        requester_gave: TradeTerms,
        /// What the target handed over.
        target_gave: TradeTerms,
    },
    /// The answering side declined.
    Rejected,
    /// The target replaced the offer.
    Countered {
        /// The new offer.
        counter: TradeTerms,
    },
    /// The trade expired instead of completing.
    Expired(TradeExpiry),
}

/// All trade records, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeBook {
    trades: BTreeMap<TradeId, Trade>,
}

impl TradeBook {
    /// An empty book.
    pub const fn new() -> Self {
        Self {
            trades: BTreeMap::new(),
        }
    }

    /// Rebuild a book from stored records.
    pub fn from_records(records: impl IntoIterator<Item = Trade>) -> Self {
        Self {
            trades: records.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Look up a record.
    pub fn get(&self, id: TradeId) -> Option<&Trade> {
        self.trades.get(&id)
    }

    /// Every record.
    pub fn records(&self) -> impl Iterator<Item = &Trade> {
        self.trades.values()
    }

    /// Propose a trade. `offer: None` makes an open trade.
    pub fn propose(
        &mut self,
        requester: &Nation,
        target: &Nation,
        request: TradeTerms,
        offer: Option<TradeTerms>,
        config: &AgreementConfig,
        now: DateTime<Utc>,
    ) -> Result<TradeId, DiplomacyError> {
        if requester.id == target.id {
            return Err(DiplomacyError::SelfTarget);
        }
        if request.amount == 0 || offer.is_some_and(|o| o.amount == 0) {
            return Err(DiplomacyError::InvalidAmount);
        }
        if let Some(offer) = offer {
            ensure_holds(requester, offer)?;
        }

        let id = TradeId::new();
        let trade = Trade {
            id,
            requester: requester.id.clone(),
            target: target.id.clone(),
            request,
            offer,
            counter: None,
            counter_by: None,
            status: TradeStatus::Pending,
            last_action_by: requester.id.clone(),
            created_at: now,
            expires_at: now
                .checked_add_signed(millis(config.offer_window_ms))
                .unwrap_or(now),
            resolved_at: None,
        };
        self.trades.insert(id, trade);
        info!(
            trade = %id,
            requester = %requester.id,
            target = %target.id,
            request = %request.item,
            amount = request.amount,
            open = offer.is_none(),
            "trade proposed"
        );
        Ok(id)
    }

    /// Replace the offer with `counter` on behalf of the target.
    ///
    /// The target must hold what was requested, since countering commits
    /// it to the exchange.
    pub fn counter(
        &mut self,
        id: TradeId,
        responder: &NationId,
        counter: TradeTerms,
        target: &Nation,
        now: DateTime<Utc>,
    ) -> Result<TradeResolution, DiplomacyError> {
        let trade = self
            .trades
            .get_mut(&id)
            .ok_or(DiplomacyError::TradeNotFound(id))?;
        if trade.status != TradeStatus::Pending {
            return Err(DiplomacyError::CounterNotAllowed(trade.status));
        }
        if responder == &trade.last_action_by || responder != &trade.target {
            return Err(DiplomacyError::NotAuthorized(responder.clone()));
        }
        if target.id != trade.target {
            return Err(DiplomacyError::PartyMismatch);
        }
        if counter.amount == 0 {
            return Err(DiplomacyError::InvalidAmount);
        }
        if lapse(trade, now) {
            return Ok(TradeResolution::Expired(TradeExpiry::OfferLapsed));
        }
        ensure_holds(target, trade.request)?;

        trade.counter = Some(counter);
        trade.counter_by = Some(responder.clone());
        trade.status = TradeStatus::PendingCounter;
        trade.last_action_by = responder.clone();
        info!(trade = %id, item = %counter.item, amount = counter.amount, "trade countered");
        Ok(TradeResolution::Countered { counter })
    }

    /// Accept or reject on behalf of `responder`.
    ///
    /// A second accept on a settled trade fails with
    /// [`DiplomacyError::TradeNotOpen`] and changes nothing.
    pub fn respond(
        &mut self,
        id: TradeId,
        responder: &NationId,
        accept: bool,
        requester: &mut Nation,
        target: &mut Nation,
        now: DateTime<Utc>,
    ) -> Result<TradeResolution, DiplomacyError> {
        let trade = self
            .trades
            .get_mut(&id)
            .ok_or(DiplomacyError::TradeNotFound(id))?;
        if !trade.status.is_open() {
            return Err(DiplomacyError::TradeNotOpen(trade.status));
        }
        if responder == &trade.last_action_by || !(responder == &trade.requester || responder == &trade.target) {
            return Err(DiplomacyError::NotAuthorized(responder.clone()));
        }
        if requester.id != trade.requester || target.id != trade.target {
            return Err(DiplomacyError::PartyMismatch);
        }
        if lapse(trade, now) {
            return Ok(TradeResolution::Expired(TradeExpiry::OfferLapsed));
        }

        if !accept {
            trade.status = TradeStatus::Rejected;
            trade.last_action_by = responder.clone();
            trade.resolved_at = Some(now);
            info!(trade = %id, by = %responder, "trade rejected");
            return Ok(TradeResolution::Rejected);
        }

        let Some(requester_gives) = trade.effective_offer() else {
            return Err(DiplomacyError::OpenTradeNeedsCounter);
        };
        let target_gives = trade.request;

        trade.last_action_by = responder.clone();
        trade.resolved_at = Some(now);
        if ensure_holds(requester, requester_gives).is_err() || ensure_holds(target, target_gives).is_err() {
            trade.status = TradeStatus::Expired;
            info!(trade = %id, "trade expired: insufficient holdings");
            return Ok(TradeResolution::Expired(TradeExpiry::InsufficientHoldings));
        }

        transfer(requester, target, requester_gives);
        transfer(target, requester, target_gives);
        trade.status = TradeStatus::Accepted;
        info!(
            trade = %id,
            requester_gave = %requester_gives.item,
            requester_amount = requester_gives.amount,
            target_gave = %target_gives.item,
            target_amount = target_gives.amount,
            "trade accepted"
        );

        Ok(TradeResolution::Accepted {
            requester_gave: requester_gives,
            target_gave: target_gives,
        })
    }

    /// Expire every open trade whose window has passed.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Vec<TradeId> {
        self.trades
            .values_mut()
            .filter_map(|trade| (trade.status.is_open() && lapse(trade, now)).then_some(trade.id))
            .collect()
    }
}

/// Expire `trade` if its window has passed. Returns whether it did.
fn lapse(trade: &mut Trade, now: DateTime<Utc>) -> bool {
    if now < trade.expires_at {
        return false;
    }
    trade.status = TradeStatus::Expired;
    trade.resolved_at = Some(now);
    info!(trade = %trade.id, "trade offer lapsed");
    true
}

fn ensure_holds(nation: &Nation, terms: TradeTerms) -> Result<(), DiplomacyError> {
    let available = nation.holding(terms.item);
    if available < terms.amount {
        return Err(DiplomacyError::InsufficientHoldings {
            nation: nation.id.clone(),
            item: terms.item,
            needed: terms.amount,
            available,
        });
    }
    Ok(())
}

fn transfer(from: &mut Nation, to: &mut Nation, terms: TradeTerms) {
    let given = from.holding_mut(terms.item);
    *given = given.saturating_sub(terms.amount);
    let received = to.holding_mut(terms.item);
    *received = received.saturating_add(terms.amount);
}
