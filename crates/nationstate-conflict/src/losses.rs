//! Expensive-first military loss allocation.
//!
//! A loss is expressed in power. Whole units are removed from the most
//! valuable kind down (jets, tanks, troops), each kind covering as much of
//! the remaining power as it can without overshooting. Any power still
//! unaccounted for is then taken from troops one-for-one. Whatever is left
//! after that is dropped: unit counts never go negative.

use nationstate_types::{Military, Unit};

/// Remove up to `loss_power` worth of units from `military`.
///
/// Returns the units removed.
pub fn allocate_losses(military: &mut Military, loss_power: u64) -> Military {
    let mut remaining = loss_power;
    let mut removed = Military::default();

    for unit in Unit::EXPENSIVE_FIRST {
        if remaining == 0 {
            break;
        }
        let needed = remaining.checked_div(unit.power()).unwrap_or(0);
        let take = military.get(unit).min(needed);
        if take == 0 {
            continue;
        }
        take_units(military, &mut removed, unit, take);
        remaining = remaining.saturating_sub(take.saturating_mul(unit.power()));
    }

    // Leftover below a whole expensive unit comes out of troops.
    let take = military.troops.min(remaining);
    if take > 0 {
        take_units(military, &mut removed, Unit::Troops, take);
    }

    removed
}

fn take_units(military: &mut Military, removed: &mut Military, unit: Unit, count: u64) {
    let held = military.get_mut(unit);
    *held = held.saturating_sub(count);
    let lost = removed.get_mut(unit);
    *lost = lost.saturating_add(count);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn army(troops: u64, tanks: u64, jets: u64) -> Military {
        Military { troops, tanks, jets }
    }

    #[test]
    fn jets_go_first() {
        let mut m = army(10, 10, 10);
        let lost = allocate_losses(&mut m, 21);
        assert_eq!(lost, army(1, 0, 2));
        assert_eq!(m, army(9, 10, 8));
    }

    #[test]
    fn falls_through_to_cheaper_units() {
        let mut m = army(100, 3, 1);
        // 1 jet (10) + 3 tanks (15) + 25 troops
        let lost = allocate_losses(&mut m, 50);
        assert_eq!(lost, army(25, 3, 1));
        assert_eq!(m.power(), 75);
    }

    #[test]
    fn remainder_without_troops_is_dropped() {
        let mut m = army(0, 0, 5);
        let lost = allocate_losses(&mut m, 27);
        assert_eq!(lost, army(0, 0, 2));
        assert_eq!(m, army(0, 0, 3));
    }

    #[test]
    fn loss_beyond_total_wipes_out_army() {
        let mut m = army(4, 2, 1);
        let lost = allocate_losses(&mut m, 1_000);
        assert_eq!(lost, army(4, 2, 1));
        assert_eq!(m.power(), 0);
    }

    #[test]
    fn zero_loss_changes_nothing() {
        let mut m = army(3, 3, 3);
        assert_eq!(allocate_losses(&mut m, 0), Military::default());
        assert_eq!(m, army(3, 3, 3));
    }

    #[test]
    fn removed_power_matches_request_with_troop_cover() {
        // With at least 9 troops every sub-jet remainder can be covered,
        // so the removed power is exactly min(request, total).
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let mut m = army(
                rng.random_range(9..200),
                rng.random_range(0..50),
                rng.random_range(0..50),
            );
            let before = m;
            let request = rng.random_range(0..1_500);
            let lost = allocate_losses(&mut m, request);

            assert_eq!(lost.power(), request.min(before.power()));
            assert_eq!(m.power(), before.power().saturating_sub(lost.power()));
        }
    }

    #[test]
    fn removed_power_never_exceeds_request() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let mut m = army(
                rng.random_range(0..9),
                rng.random_range(0..20),
                rng.random_range(0..20),
            );
            let before = m;
            let request = rng.random_range(0..400);
            let lost = allocate_losses(&mut m, request);

            assert!(lost.power() <= request.min(before.power()));
            for unit in Unit::EXPENSIVE_FIRST {
                assert!(lost.get(unit) <= before.get(unit));
            }
        }
    }
}
