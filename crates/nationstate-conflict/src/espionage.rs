//! Spy, sabotage and hack attempts.
//!
//! Each attempt is one roll against a flat success chance. The intel record
//! for the nation pair counts failures per action; reaching the action's
//! alert threshold notifies the target and resets the count. A success
//! resets it too.
//!
//! | Action   | Success                                   | Alert at |
//! |----------|-------------------------------------------|----------|
//! | spy      | snapshot of the target's state            | 4        |
//! | sabotage | 10% of per-city stock stolen, 10% power   | 5        |
//! | hack     | target banks give no gold bonus for a time | 5        |
//!
//! A stealthy attacker adds its trait bonus to the spy chance and the spy
//! threshold. Cooldowns are the caller's concern.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use nationstate_diplomacy::config::millis;
use nationstate_economy::traits::trait_bonus;
use nationstate_types::{
    CovertAction, Intel, IntelSnapshot, Military, Nation, Resource, ResourceStock, Tile,
};

use crate::config::EspionageConfig;
use crate::error::ConflictError;
use crate::losses::allocate_losses;
use crate::targeting::validate_target;

/// Share of sabotaged stock and power, as a divisor.
const SABOTAGE_DIVISOR: u64 = 10;

/// The result of one covert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EspionageOutcome {
    /// Spies returned with a fresh snapshot.
    Spied {
        /// What they saw.
        snapshot: IntelSnapshot,
    },
    /// Saboteurs stole resources and destroyed units.
    Sabotaged {
        /// Resources moved from target to attacker.
        stolen: ResourceStock,
        /// Units the target lost.
        destroyed: Military,
    },
    /// The target's banks are disabled.
    Hacked {
        /// When the banks come back.
        bank_disabled_until: DateTime<Utc>,
    },
    /// The attempt failed.
    Failed {
        /// The action that failed.
        action: CovertAction,
        /// Failures counted so far, zero if this one raised an alert.
        failed_attempts: u32,
        /// Failures that raise an alert.
        threshold: u32,
        /// The target was notified. For sabotage the operative was caught.
        alerted: bool,
    },
}

impl EspionageOutcome {
    /// Whether the attempt succeeded.
    pub const fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Success chance in basis points for `attacker`.
pub fn success_chance_bps(action: CovertAction, attacker: &Nation, config: &EspionageConfig) -> u32 {
    let base = config.success_bps(action);
    if action == CovertAction::Spy {
        base.saturating_add(trait_bonus(attacker.nation_trait).spy_chance_bps)
    } else {
        base
    }
}

/// Failures before `attacker` raises an alert.
pub fn alert_threshold(action: CovertAction, attacker: &Nation, config: &EspionageConfig) -> u32 {
    let base = config.alert_threshold(action);
    if action == CovertAction::Spy {
        base.saturating_add(trait_bonus(attacker.nation_trait).spy_alert_bonus)
    } else {
        base
    }
}

/// Attempt `action` against the city on `tile`.
///
/// `intel` must be the attacker's record on the defender.
#[allow(clippy::too_many_arguments)]
pub fn attempt(
    action: CovertAction,
    attacker: &mut Nation,
    defender: &mut Nation,
    tile: &Tile,
    intel: &mut Intel,
    config: &EspionageConfig,
    rng: &mut impl Rng,
    now: DateTime<Utc>,
) -> Result<EspionageOutcome, ConflictError> {
    validate_target(attacker, defender, tile)?;
    if intel.spying != attacker.id || intel.target != defender.id {
        return Err(ConflictError::IntelMismatch);
    }

    let chance = success_chance_bps(action, attacker, config);
    let success = rng.random_range(0..10_000) < chance;
    intel.log_mut(action).last_attempt_at = Some(now);

    if !success {
        return Ok(record_failure(action, attacker, defender, intel, config));
    }

    intel.log_mut(action).failed_attempts = 0;
    let outcome = match action {
        CovertAction::Spy => spy(defender, intel, now),
        CovertAction::Sabotage => sabotage(attacker, defender),
        CovertAction::Hack => hack(defender, config, now),
    };
    info!(
        attacker = %attacker.id,
        defender = %defender.id,
        ?action,
        "covert action succeeded"
    );
    Ok(outcome)
}

fn record_failure(
    action: CovertAction,
    attacker: &Nation,
    defender: &Nation,
    intel: &mut Intel,
    config: &EspionageConfig,
) -> EspionageOutcome {
    let threshold = alert_threshold(action, attacker, config);
    let log = intel.log_mut(action);
    log.failed_attempts = log.failed_attempts.saturating_add(1);
    let alerted = log.failed_attempts >= threshold;
    if alerted {
        log.failed_attempts = 0;
        info!(
            attacker = %attacker.id,
            defender = %defender.id,
            ?action,
            "covert action detected, target alerted"
        );
    }
    EspionageOutcome::Failed {
        action,
        failed_attempts: log.failed_attempts,
        threshold,
        alerted,
    }
}

/// Overwrite the snapshot; known cities stay as they are.
fn spy(defender: &Nation, intel: &mut Intel, now: DateTime<Utc>) -> EspionageOutcome {
    let snapshot = IntelSnapshot {
        population: defender.population,
        resources: defender.resources,
        military: defender.military,
        buildings: defender.buildings.clone(),
        research: defender.research.clone(),
        player_count: defender.player_count,
        captured_at: now,
    };
    intel.target_name.clone_from(&defender.name);
    intel.snapshot = Some(snapshot.clone());
    EspionageOutcome::Spied { snapshot }
}

/// Steal `floor(stock / cities / 10)` of each resource and destroy a tenth
/// of the target's power.
fn sabotage(attacker: &mut Nation, defender: &mut Nation) -> EspionageOutcome {
    let divisor = defender.cities_or_one().saturating_mul(SABOTAGE_DIVISOR);
    let mut stolen = ResourceStock::default();
    for resource in Resource::ALL {
        let held = defender.resources.get_mut(resource);
        let take = held.checked_div(divisor).unwrap_or(0);
        *held = held.saturating_sub(take);
        let gained = attacker.resources.get_mut(resource);
        *gained = gained.saturating_add(take);
        *stolen.get_mut(resource) = take;
    }

    let loss_power = defender
        .military
        .power()
        .checked_div(SABOTAGE_DIVISOR)
        .unwrap_or(0);
    let destroyed = allocate_losses(&mut defender.military, loss_power);
    EspionageOutcome::Sabotaged { stolen, destroyed }
}

fn hack(defender: &mut Nation, config: &EspionageConfig, now: DateTime<Utc>) -> EspionageOutcome {
    let until = now
        .checked_add_signed(millis(config.hack_duration_ms))
        .unwrap_or(now);
    defender.hacks.bank_disabled_until = Some(until);
    EspionageOutcome::Hacked {
        bank_disabled_until: until,
    }
}
