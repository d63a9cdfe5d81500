//! A scripted border skirmish between two nations.
//!
//! Northmark and Southreach build up side by side. Northmark's second
//! player scouts until a southern city turns up, spies on it, and attacks
//! once the army is large enough. The run closes with an envoy, a truce, a
//! trade and an expiry sweep. Rule rejections along the way are expected
//! and counted.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use nationstate_core::{Engine, EngineError, PrizePool};
use nationstate_types::{NationId, NationTrait, PlayerId, Resource, TileId, TradeTerms, Unit};

/// Tallies from one skirmish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkirmishReport {
    /// Commands issued.
    pub commands: u32,
    /// Commands the engine rejected.
    pub rejected: u32,
    /// Attacks that resolved.
    pub attacks: u32,
    /// Cities that fell.
    pub cities_fallen: u32,
}

struct Cast {
    north: NationId,
    south: NationId,
    north_lead: PlayerId,
    north_scout: PlayerId,
    south_lead: PlayerId,
}

impl Cast {
    fn new() -> Self {
        Self {
            north: NationId::new("north"),
            south: NationId::new("south"),
            north_lead: PlayerId::new("north-1"),
            north_scout: PlayerId::new("north-2"),
            south_lead: PlayerId::new("south-1"),
        }
    }
}

/// Play `rounds` rounds starting at `start`.
///
/// Each round advances the clock by the resource cooldown.
///
/// # Errors
///
/// Returns [`EngineError`] if the nations cannot be founded.
pub async fn run<P: PrizePool>(
    engine: &Engine<P>,
    start: DateTime<Utc>,
    rounds: u32,
) -> Result<SkirmishReport, EngineError> {
    let cast = Cast::new();
    engine
        .found_nation(
            cast.north.clone(),
            "Northmark",
            Some(NationTrait::Nomadic),
            cast.north_lead.clone(),
            start,
        )
        .await?;
    engine
        .found_nation(
            cast.south.clone(),
            "Southreach",
            Some(NationTrait::Agricultural),
            cast.south_lead.clone(),
            start,
        )
        .await?;
    engine.join(cast.north_scout.clone(), &cast.north).await?;

    let step = Duration::milliseconds(i64::try_from(engine.config().cooldowns.resource).unwrap_or(i64::MAX));
    let mut now = start;
    let mut report = SkirmishReport::default();
    let mut target: Option<TileId> = None;
    let mut spied = false;

    for round in 0..rounds {
        now = now.checked_add_signed(step).unwrap_or(now);

        match round % 3 {
            0 => {
                let r = engine.farm(&cast.north_lead, now).await;
                tally(&mut report, "farm", r);
                let r = engine.farm(&cast.south_lead, now).await;
                tally(&mut report, "farm", r);
            }
            1 => {
                let r = engine.mine(&cast.north_lead, now).await;
                tally(&mut report, "mine", r);
                let r = engine.mine(&cast.south_lead, now).await;
                tally(&mut report, "mine", r);
            }
            _ => {
                let r = engine.deploy(&cast.north_lead, Unit::Troops, now).await;
                tally(&mut report, "deploy", r);
                let r = engine.drill(&cast.south_lead, now).await;
                tally(&mut report, "drill", r);
            }
        }

        let Some(tile) = target else {
            let r = engine.explore(&cast.north_scout, now).await;
            if tally(&mut report, "explore", r).is_some() {
                target = known_target(engine, &cast).await;
                if let Some(tile) = target {
                    info!(round, %tile, "southern city located");
                }
            }
            continue;
        };

        if !spied {
            let r = engine.spy(&cast.north_scout, tile, now).await;
            spied = tally(&mut report, "spy", r).is_some();
            continue;
        }
        if army_ready(engine, &cast).await {
            let r = engine.attack(&cast.north_scout, tile, now).await;
            if let Some(summary) = tally(&mut report, "attack", r) {
                report.attacks = report.attacks.saturating_add(1);
                if summary.report.fallen.is_some() {
                    report.cities_fallen = report.cities_fallen.saturating_add(1);
                    target = known_target(engine, &cast).await;
                }
            }
        }
    }

    close_out(engine, &cast, now, &mut report).await;
    Ok(report)
}

/// Southreach sends word and sues for peace, Northmark accepts, and the two
/// trade.
async fn close_out<P: PrizePool>(engine: &Engine<P>, cast: &Cast, now: DateTime<Utc>, report: &mut SkirmishReport) {
    let r = engine
        .envoy(&cast.south_lead, &cast.north, "Southreach asks for terms.", now)
        .await;
    tally(report, "envoy", r);

    let r = engine.propose_truce(&cast.south_lead, &cast.north, Some(12), None, now).await;
    if let Some(truce) = tally(report, "propose_truce", r) {
        let r = engine.respond_truce(&cast.north_lead, truce, true, now).await;
        tally(report, "respond_truce", r);
    }

    let request = TradeTerms {
        item: Resource::Steel.into(),
        amount: 5,
    };
    let offer = TradeTerms {
        item: Resource::Food.into(),
        amount: 10,
    };
    let r = engine
        .propose_trade(&cast.south_lead, &cast.north, request, Some(offer), now)
        .await;
    if let Some(trade) = tally(report, "propose_trade", r) {
        let r = engine.respond_trade(&cast.north_lead, trade, true, now).await;
        tally(report, "respond_trade", r);
    }

    let window = Duration::milliseconds(
        i64::try_from(engine.config().agreements.offer_window_ms).unwrap_or(i64::MAX),
    );
    let (truces, trades) = engine
        .expire_stale(now.checked_add_signed(window).unwrap_or(now))
        .await;
    debug!(truces = truces.len(), trades = trades.len(), "expiry sweep done");
}

/// A southern city Northmark has surveyed, if any.
async fn known_target<P: PrizePool>(engine: &Engine<P>, cast: &Cast) -> Option<TileId> {
    engine
        .snapshot()
        .await
        .owned_tiles(&cast.south)
        .into_iter()
        .find(|t| t.is_surveyed_by(&cast.north))
        .map(|t| t.id)
}

/// Whether Northmark's army meets the attack minimum.
async fn army_ready<P: PrizePool>(engine: &Engine<P>, cast: &Cast) -> bool {
    let Ok(nation) = engine.nation(&cast.north).await else {
        return false;
    };
    let required = nation
        .cities_or_one()
        .saturating_mul(engine.config().world.min_military_power_per_city);
    nation.military.power() >= required
}

fn tally<T>(report: &mut SkirmishReport, command: &str, result: Result<T, EngineError>) -> Option<T> {
    report.commands = report.commands.saturating_add(1);
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            report.rejected = report.rejected.saturating_add(1);
            debug!(command, error = %e, "command rejected");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use nationstate_core::{GameConfig, GameWorld, NoPrizePool, WorldEvent};

    use super::*;

    #[tokio::test]
    async fn skirmish_runs_to_completion() {
        let (engine, mut events) = Engine::with_world(GameConfig::default(), NoPrizePool, GameWorld::new(), 7);
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        let report = run(&engine, start, 30).await.unwrap();
        let mut envoys = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let WorldEvent::EnvoySent { message, .. } = event {
                envoys.push(message);
            }
        }
        assert_eq!(envoys, vec!["Southreach asks for terms."]);
        assert!(report.commands >= 60);
        assert!(report.rejected <= report.commands);

        let world = engine.snapshot().await;
        assert_eq!(world.nations.len(), 2);
        assert_eq!(world.players.len(), 3);
        assert!(world.truces.records().count() <= 1);
    }

    #[tokio::test]
    async fn founding_twice_fails() {
        let (engine, _events) = Engine::with_world(GameConfig::default(), NoPrizePool, GameWorld::new(), 7);
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        run(&engine, start, 1).await.unwrap();
        assert!(matches!(
            run(&engine, start, 1).await,
            Err(EngineError::AlreadyExists(_))
        ));
    }
}
