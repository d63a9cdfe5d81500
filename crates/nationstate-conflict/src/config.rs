//! Combat and espionage parameters.
//!
//! Chances are in basis points: 2500 is a 25% chance.

use nationstate_diplomacy::CooldownConfig;
use nationstate_types::CovertAction;

/// Parameters for attack resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatConfig {
    /// Population backing one city (default: 1000).
    pub population_per_city: u64,
    /// Power required per owned city to attack, and the defender's
    /// full-strength reference (default: 100).
    pub min_military_power_per_city: u64,
    /// Cooldowns; only the attack cooldown is consulted here.
    pub cooldowns: CooldownConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            population_per_city: 1000,
            min_military_power_per_city: 100,
            cooldowns: CooldownConfig::default(),
        }
    }
}

/// Parameters for covert actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EspionageConfig {
    /// Spy success chance (default: 2500).
    pub spy_success_bps: u32,
    /// Sabotage success chance (default: 2500).
    pub sabotage_success_bps: u32,
    /// Hack success chance (default: 2000).
    pub hack_success_bps: u32,
    /// Failed spy attempts before the target is alerted (default: 4).
    pub spy_alert_threshold: u32,
    /// Failed sabotage attempts before the operative is caught (default: 5).
    pub sabotage_alert_threshold: u32,
    /// Failed hack attempts before the target is alerted (default: 5).
    pub hack_alert_threshold: u32,
    /// How long a successful hack disables banks (default: 4 h).
    pub hack_duration_ms: u64,
}

impl EspionageConfig {
    /// Base success chance of an action, before trait bonuses.
    pub const fn success_bps(&self, action: CovertAction) -> u32 {
        match action {
            CovertAction::Spy => self.spy_success_bps,
            CovertAction::Sabotage => self.sabotage_success_bps,
            CovertAction::Hack => self.hack_success_bps,
        }
    }

    /// Base alert threshold of an action, before trait bonuses.
    pub const fn alert_threshold(&self, action: CovertAction) -> u32 {
        match action {
            CovertAction::Spy => self.spy_alert_threshold,
            CovertAction::Sabotage => self.sabotage_alert_threshold,
            CovertAction::Hack => self.hack_alert_threshold,
        }
    }
}

impl Default for EspionageConfig {
    fn default() -> Self {
        Self {
            spy_success_bps: 2500,
            sabotage_success_bps: 2500,
            hack_success_bps: 2000,
            spy_alert_threshold: 4,
            sabotage_alert_threshold: 5,
            hack_alert_threshold: 5,
            hack_duration_ms: 14_400_000,
        }
    }
}
