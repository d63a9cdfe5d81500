//! Cooldown durations and agreement windows.
//!
//! Durations are kept in milliseconds, the unit the game has always been
//! configured in.

use chrono::Duration;

use nationstate_types::NationAction;

/// Convert a millisecond setting to a [`Duration`], saturating on overflow.
pub fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

/// Cooldown durations for both scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownConfig {
    /// Shared player cooldown between resource commands (default: 5 s).
    pub resource_ms: u64,
    /// Nation attack cooldown (default: 24 h).
    pub attack_ms: u64,
    /// Nation spy cooldown (default: 4 h).
    pub spy_ms: u64,
    /// Nation sabotage cooldown (default: 1 h).
    pub sabotage_ms: u64,
    /// Nation hack cooldown (default: 4 h).
    pub hack_ms: u64,
    /// Nation envoy cooldown (default: 15 min).
    pub envoy_ms: u64,
    /// Nation token launch cooldown (default: 4 h).
    pub launch_shitcoin_ms: u64,
}

impl CooldownConfig {
    /// Duration of a nation action's cooldown.
    pub const fn for_action(&self, action: NationAction) -> u64 {
        match action {
            NationAction::Attack => self.attack_ms,
            NationAction::Spy => self.spy_ms,
            NationAction::Sabotage => self.sabotage_ms,
            NationAction::Hack => self.hack_ms,
            NationAction::Envoy => self.envoy_ms,
            NationAction::LaunchShitcoin => self.launch_shitcoin_ms,
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            resource_ms: 5_000,
            attack_ms: 86_400_000,
            spy_ms: 14_400_000,
            sabotage_ms: 3_600_000,
            hack_ms: 14_400_000,
            envoy_ms: 900_000,
            launch_shitcoin_ms: 14_400_000,
        }
    }
}

/// Truce and trade timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgreementConfig {
    /// How long a proposal stays open (default: 4 h).
    pub offer_window_ms: u64,
    /// Truce duration when the proposer names none (default: 24).
    pub default_truce_hours: u32,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            offer_window_ms: 14_400_000,
            default_truce_hours: 24,
        }
    }
}
