//! Player and nation cooldowns.
//!
//! Two independent scopes:
//!
//! - **Player**: one shared timestamp per player, gating every resource
//!   command alike. Farming blocks mining for the same player.
//! - **Nation**: one timestamp per [`NationAction`], each with its own
//!   duration. Spying does not block sabotage.
//!
//! An action is ready when `now - last_used >= duration`.

use chrono::{DateTime, Duration, Utc};

use nationstate_types::{Nation, NationAction, Player};

use crate::config::{CooldownConfig, millis};
use crate::error::{CooldownScope, DiplomacyError};

/// A remaining time split into whole hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hms {
    /// Whole hours.
    pub hours: u64,
    /// Minutes past the hour.
    pub minutes: u64,
    /// Seconds past the minute.
    pub seconds: u64,
}

impl Hms {
    /// Break a millisecond count down, rounding partial seconds up.
    pub const fn from_millis(ms: u64) -> Self {
        let total = ms.div_ceil(1000);
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl core::fmt::Display for Hms {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// Time left before an action last used at `last` may run again.
///
/// `None` when ready, including when it has never been used.
pub fn remaining(last: Option<DateTime<Utc>>, duration: Duration, now: DateTime<Utc>) -> Option<Duration> {
    let last = last?;
    let elapsed = now.signed_duration_since(last);
    let left = duration.checked_sub(&elapsed)?;
    (left > Duration::zero()).then_some(left)
}

/// Milliseconds in a duration, floored at zero.
pub fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.num_milliseconds()).unwrap_or(0)
}

/// Fail unless the player's resource cooldown has elapsed.
pub fn check_player(player: &Player, config: &CooldownConfig, now: DateTime<Utc>) -> Result<(), DiplomacyError> {
    match remaining(player.last_resource_action, millis(config.resource_ms), now) {
        Some(left) => Err(DiplomacyError::CooldownActive {
            scope: CooldownScope::Player,
            remaining_ms: as_millis(left),
        }),
        None => Ok(()),
    }
}

/// Fail unless the nation's cooldown for `action` has elapsed.
pub fn check_nation(
    nation: &Nation,
    action: NationAction,
    config: &CooldownConfig,
    now: DateTime<Utc>,
) -> Result<(), DiplomacyError> {
    let last = nation.cooldowns.get(&action).copied();
    match remaining(last, millis(config.for_action(action)), now) {
        Some(left) => Err(DiplomacyError::CooldownActive {
            scope: CooldownScope::Nation(action),
            remaining_ms: as_millis(left),
        }),
        None => Ok(()),
    }
}

/// Start the player's resource cooldown.
pub fn mark_player(player: &mut Player, now: DateTime<Utc>) {
    player.last_resource_action = Some(now);
}

/// Start the nation's cooldown for `action`.
pub fn mark_nation(nation: &mut Nation, action: NationAction, now: DateTime<Utc>) {
    nation.cooldowns.insert(action, now);
}
