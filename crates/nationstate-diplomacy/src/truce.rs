//! Truce proposals and active windows.
//!
//! Each nation pair has at most one truce record, shared by both
//! directions. The record moves through:
//!
//! ```text
//! pending --accept--> accepted (active until end_time)
//!    |  \--reject--> rejected
//!     \--lapse / unpaid tribute--> expired
//! ```
//!
//! An accepted truce stops blocking attacks once `end_time` passes; no
//! transition is needed for that. Proposing again for a pair whose record
//! is no longer live renews the same record in place, keeping its id.
//!
//! Tribute is checked twice: at proposal, so the requester cannot offer
//! what it does not have, and at acceptance, where a shortfall expires the
//! truce instead of completing it.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use nationstate_types::{Nation, NationId, Tribute, Truce, TruceId, TruceStatus};

use crate::config::{AgreementConfig, millis};
use crate::cooldown::as_millis;
use crate::error::DiplomacyError;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Why a truce ended up expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruceExpiry {
    /// Nobody answered within the offer window.
    OfferLapsed,
    /// The requester could no longer pay the tribute.
    TributeUnaffordable,
}

/// The outcome of answering a truce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruceResolution {
    /// The truce is in force.
    Accepted {
        /// Start of the window.
        start: DateTime<Utc>,
        /// End of the window.
        end: DateTime<Utc>,
        /// Tribute transferred, if any.
        tribute: Option<Tribute>,
    },
    /// The target declined.
    Rejected,
    /// The truce expired instead of completing.
    Expired(TruceExpiry),
}

// ---------------------------------------------------------------------------
// TruceBook
// ---------------------------------------------------------------------------

/// All truce records, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruceBook {
    truces: BTreeMap<TruceId, Truce>,
}

impl TruceBook {
    /// An empty book.
    pub const fn new() -> Self {
        Self {
            truces: BTreeMap::new(),
        }
    }

    /// Rebuild a book from stored records.
    pub fn from_records(records: impl IntoIterator<Item = Truce>) -> Self {
        Self {
            truces: records.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Look up a record.
    pub fn get(&self, id: TruceId) -> Option<&Truce> {
        self.truces.get(&id)
    }

    /// Every record.
    pub fn records(&self) -> impl Iterator<Item = &Truce> {
        self.truces.values()
    }

    /// The pair's record, in either direction.
    pub fn between(&self, a: &NationId, b: &NationId) -> Option<&Truce> {
        self.truces.values().find(|t| t.involves(a, b))
    }

    /// The pair's truce if it is accepted and still inside its window.
    pub fn active_between(&self, a: &NationId, b: &NationId, now: DateTime<Utc>) -> Option<&Truce> {
        self.between(a, b).filter(|t| t.is_active(now))
    }

    /// Propose a truce from `requester` to `target`.
    ///
    /// `hours` falls back to the configured default. Renews the pair's
    /// existing record when it is no longer live.
    pub fn propose(
        &mut self,
        requester: &Nation,
        target: &Nation,
        hours: Option<u32>,
        tribute: Option<Tribute>,
        config: &AgreementConfig,
        now: DateTime<Utc>,
    ) -> Result<TruceId, DiplomacyError> {
        if requester.id == target.id {
            return Err(DiplomacyError::SelfTarget);
        }
        let effective_hours = hours.unwrap_or(config.default_truce_hours);
        if effective_hours == 0 {
            return Err(DiplomacyError::InvalidAmount);
        }
        if let Some(t) = tribute {
            if t.amount == 0 {
                return Err(DiplomacyError::InvalidAmount);
            }
            ensure_tribute(requester, t)?;
        }

        let existing = self.between(&requester.id, &target.id).cloned();
        if let Some(existing) = &existing {
            if existing.is_active(now) {
                let left = existing
                    .end_time
                    .map_or(Duration::zero(), |end| end.signed_duration_since(now));
                return Err(DiplomacyError::TruceAlreadyActive {
                    remaining_ms: as_millis(left),
                });
            }
            if existing.is_live_offer(now) {
                return Err(DiplomacyError::TruceOfferPending);
            }
        }

        let offer_expires_at = now
            .checked_add_signed(millis(config.offer_window_ms))
            .unwrap_or(now);
        let id = existing.as_ref().map_or_else(TruceId::new, |t| t.id);
        let truce = Truce {
            id,
            requester: requester.id.clone(),
            target: target.id.clone(),
            status: TruceStatus::Pending,
            effective_hours,
            tribute,
            offer_created_at: now,
            offer_expires_at,
            start_time: None,
            end_time: None,
            last_updated_at: now,
        };
        self.truces.insert(id, truce);
        info!(
            truce = %id,
            requester = %requester.id,
            target = %target.id,
            effective_hours,
            renewed = existing.is_some(),
            "truce proposed"
        );
        Ok(id)
    }

    /// Answer a pending truce on behalf of `responder`.
    ///
    /// `requester` and `target` must be the record's parties. On
    /// acceptance the tribute moves from requester to target.
    pub fn respond(
        &mut self,
        id: TruceId,
        responder: &NationId,
        accept: bool,
        requester: &mut Nation,
        target: &mut Nation,
        now: DateTime<Utc>,
    ) -> Result<TruceResolution, DiplomacyError> {
        let truce = self
            .truces
            .get_mut(&id)
            .ok_or(DiplomacyError::TruceNotFound(id))?;
        if truce.status != TruceStatus::Pending {
            return Err(DiplomacyError::TruceNotPending(truce.status));
        }
        if responder != &truce.target {
            return Err(DiplomacyError::NotAuthorized(responder.clone()));
        }
        if requester.id != truce.requester || target.id != truce.target {
            return Err(DiplomacyError::PartyMismatch);
        }

        truce.last_updated_at = now;
        if now >= truce.offer_expires_at {
            truce.status = TruceStatus::Expired;
            info!(truce = %id, "truce offer lapsed");
            return Ok(TruceResolution::Expired(TruceExpiry::OfferLapsed));
        }
        if !accept {
            truce.status = TruceStatus::Rejected;
            info!(truce = %id, "truce rejected");
            return Ok(TruceResolution::Rejected);
        }

        if let Some(t) = truce.tribute {
            if ensure_tribute(requester, t).is_err() {
                truce.status = TruceStatus::Expired;
                info!(truce = %id, "truce expired: tribute unaffordable");
                return Ok(TruceResolution::Expired(TruceExpiry::TributeUnaffordable));
            }
            let paid = requester.resources.get_mut(t.resource);
            *paid = paid.saturating_sub(t.amount);
            let received = target.resources.get_mut(t.resource);
            *received = received.saturating_add(t.amount);
        }

        let end = now
            .checked_add_signed(Duration::hours(i64::from(truce.effective_hours)))
            .unwrap_or(now);
        truce.status = TruceStatus::Accepted;
        truce.start_time = Some(now);
        truce.end_time = Some(end);
        info!(truce = %id, %end, "truce accepted");

        Ok(TruceResolution::Accepted {
            start: now,
            end,
            tribute: truce.tribute,
        })
    }

    /// Expire every pending offer whose window has passed.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> Vec<TruceId> {
        let mut expired = Vec::new();
        for truce in self.truces.values_mut() {
            if truce.status == TruceStatus::Pending && now >= truce.offer_expires_at {
                truce.status = TruceStatus::Expired;
                truce.last_updated_at = now;
                expired.push(truce.id);
            }
        }
        expired
    }
}

fn ensure_tribute(requester: &Nation, tribute: Tribute) -> Result<(), DiplomacyError> {
    let available = requester.resources.get(tribute.resource);
    if available < tribute.amount {
        return Err(DiplomacyError::InsufficientHoldings {
            nation: requester.id.clone(),
            item: tribute.resource.into(),
            needed: tribute.amount,
            available,
        });
    }
    Ok(())
}
