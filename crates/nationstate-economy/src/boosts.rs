//! Paid yield boosts.
//!
//! A boost multiplies one resource's yield until its end time. Buying more
//! time while a boost is running extends it from the current end rather
//! than from now. Payment is handled outside the engine.

use chrono::{DateTime, Duration, Utc};

use nationstate_types::{Boost, Nation, Resource};

/// Default multiplier of a purchased boost.
pub const DEFAULT_BOOST_MULTIPLIER: u32 = 2;

/// Current multiplier for `resource`, or 1 when no boost is running.
pub fn boost_multiplier(nation: &Nation, resource: Resource, now: DateTime<Utc>) -> u32 {
    nation
        .boosts
        .get(&resource)
        .filter(|b| now < b.end_time)
        .map_or(1, |b| b.multiplier.max(1))
}

/// Open or extend a boost window and return the new end time.
pub fn apply_boost(
    nation: &mut Nation,
    resource: Resource,
    hours: u32,
    multiplier: u32,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let start = nation
        .boosts
        .get(&resource)
        .map(|b| b.end_time)
        .filter(|end| *end > now)
        .unwrap_or(now);
    let end_time = start
        .checked_add_signed(Duration::hours(i64::from(hours)))
        .unwrap_or(start);
    nation.boosts.insert(resource, Boost {
        end_time,
        multiplier,
    });
    end_time
}

/// Time left on a boost, if it is still running.
pub fn boost_remaining(nation: &Nation, resource: Resource, now: DateTime<Utc>) -> Option<Duration> {
    nation
        .boosts
        .get(&resource)
        .filter(|b| now < b.end_time)
        .map(|b| b.end_time.signed_duration_since(now))
}
