//! End-to-end command flows through the engine.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::panic)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use nationstate_conflict::{ConflictError, EspionageOutcome, GameEnd};
use nationstate_core::events::EventReceiver;
use nationstate_core::prize_pool::PrizePool;
use nationstate_core::{Engine, EngineError, GameConfig, GameWorld, LedgerPool, WorldEvent};
use nationstate_diplomacy::error::CooldownScope;
use nationstate_diplomacy::{DiplomacyError, TradeResolution, TruceResolution};
use nationstate_economy::EconomyError;
use nationstate_types::{
    BuildingKind, City, Commodity, GameType, Nation, NationAction, NationId, Player, PlayerId,
    ResearchKind, Resource, Tile, TileId, TileResources, TradeStatus, TradeTerms, TruceStatus, Unit,
    VictoryType,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn make_nation(id: &str) -> Nation {
    Nation::new(NationId::new(id), format!("Nation {id}"), None, t0())
}

fn city_tile(id: u32, owner: &Nation, surveyed_by: &[&Nation]) -> Tile {
    let mut tile = Tile::new(TileId(id), TileResources::default());
    tile.surveyed_by.insert(owner.id.clone());
    for n in surveyed_by {
        tile.surveyed_by.insert(n.id.clone());
    }
    tile.city = Some(City {
        name: format!("City {id}"),
        owner: owner.id.clone(),
        owner_name: owner.name.clone(),
        founded_at: t0(),
    });
    tile
}

fn player(id: &str, nation: &Nation) -> Player {
    Player::new(PlayerId::new(id), nation.id.clone())
}

fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

fn nid(id: &str) -> NationId {
    NationId::new(id)
}

/// Two nations, "north" (player "n1") and "south" (player "s1").
///
/// North holds tile 1 with 500 troops. South holds tiles 2 and 3, has no
/// army and 100 gold. North has surveyed both southern cities.
fn border_world() -> GameWorld {
    let mut north = make_nation("north");
    north.military.troops = 500;
    north.population = 1000;

    let mut south = make_nation("south");
    south.buildings.insert(BuildingKind::City, 2);
    south.population = 1000;
    south.resources.gold = 100;

    let mut world = GameWorld::new();
    world.put_tile(city_tile(1, &north, &[]));
    world.put_tile(city_tile(2, &south, &[&north]));
    world.put_tile(city_tile(3, &south, &[&north]));
    world.put_player(player("n1", &north));
    world.put_player(player("s1", &south));
    world.put_nation(north);
    world.put_nation(south);
    world
}

fn engine_with(world: GameWorld, config: GameConfig) -> (Engine<LedgerPool>, EventReceiver) {
    Engine::with_world(config, LedgerPool::new(), world, 42)
}

fn drain(rx: &mut EventReceiver) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Founding and joining
// ---------------------------------------------------------------------------

#[tokio::test]
async fn found_and_join() {
    let (engine, mut rx) = engine_with(GameWorld::new(), GameConfig::default());

    let capital = engine
        .found_nation(nid("g1"), "Freedonia", None, pid("p1"), t0())
        .await
        .unwrap();
    assert_eq!(capital, TileId(1));
    let second = engine
        .found_nation(nid("g2"), "Sylvania", None, pid("p2"), t0())
        .await
        .unwrap();
    assert_eq!(second, TileId(2));

    engine.join(pid("p3"), &nid("g1")).await.unwrap();
    let nation = engine.nation(&nid("g1")).await.unwrap();
    assert_eq!(nation.player_count, 2);
    assert_eq!(nation.population, 1);
    assert_eq!(nation.tiles_discovered, 1);

    let json = serde_json::to_value(&nation).unwrap();
    assert_eq!(json["buildings"]["city"], 1);

    let duplicate = engine
        .found_nation(nid("g1"), "Again", None, pid("p9"), t0())
        .await;
    assert!(matches!(duplicate, Err(EngineError::AlreadyExists(_))));
    let rejoin = engine.join(pid("p1"), &nid("g2")).await;
    assert!(matches!(rejoin, Err(EngineError::AlreadyExists(_))));

    let events = drain(&mut rx);
    assert!(events.contains(&WorldEvent::NationFounded {
        nation: nid("g1"),
        capital: TileId(1),
    }));
    assert!(events.contains(&WorldEvent::PlayerJoined {
        player: pid("p3"),
        nation: nid("g1"),
    }));
}

#[tokio::test]
async fn retire_and_exile_free_the_seat() {
    let (engine, mut rx) = engine_with(GameWorld::new(), GameConfig::default());
    engine
        .found_nation(nid("g1"), "Freedonia", None, pid("p1"), t0())
        .await
        .unwrap();
    engine
        .found_nation(nid("g2"), "Sylvania", None, pid("p2"), t0())
        .await
        .unwrap();
    let p3 = pid("p3");

    engine.join(p3.clone(), &nid("g1")).await.unwrap();
    engine.farm(&p3, t0()).await.unwrap();
    let g1 = engine.nation(&nid("g1")).await.unwrap();
    assert_eq!(g1.player_count, 2);
    assert_eq!(g1.leadership.finance_minister.unwrap().player, p3);

    engine.retire(&p3).await.unwrap();
    let g1 = engine.nation(&nid("g1")).await.unwrap();
    assert_eq!(g1.player_count, 1);
    assert!(g1.leadership.finance_minister.is_none());
    assert!(matches!(engine.player(&p3).await, Err(EngineError::PlayerNotFound(_))));
    assert!(matches!(engine.retire(&p3).await, Err(EngineError::PlayerNotFound(_))));

    engine.join(p3.clone(), &nid("g2")).await.unwrap();
    let wrong_nation = engine.exile(&nid("g1"), &p3).await;
    assert!(matches!(wrong_nation, Err(EngineError::NotAMember { .. })));
    engine.exile(&nid("g2"), &p3).await.unwrap();
    assert_eq!(engine.nation(&nid("g2")).await.unwrap().player_count, 1);

    let barred = engine.join(p3.clone(), &nid("g2")).await;
    assert!(matches!(barred, Err(EngineError::Exiled { .. })));
    engine.return_exiled(&nid("g2"), &p3).await.unwrap();
    let twice = engine.return_exiled(&nid("g2"), &p3).await;
    assert!(matches!(twice, Err(EngineError::NotExiled { .. })));
    engine.join(p3.clone(), &nid("g2")).await.unwrap();

    engine.retire(&pid("p1")).await.unwrap();
    let gone = engine.exile(&nid("g1"), &pid("p1")).await;
    assert!(matches!(gone, Err(EngineError::PlayerNotFound(_))));
    assert_eq!(engine.nation(&nid("g1")).await.unwrap().player_count, 0);

    let events = drain(&mut rx);
    assert!(events.contains(&WorldEvent::PlayerLeft {
        player: p3.clone(),
        nation: nid("g1"),
        exiled: false,
    }));
    assert!(events.contains(&WorldEvent::PlayerLeft {
        player: p3,
        nation: nid("g2"),
        exiled: true,
    }));
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resource_cooldown_is_shared_across_commands() {
    let (engine, mut rx) = engine_with(border_world(), GameConfig::default());
    let n1 = pid("n1");

    let harvest = engine.farm(&n1, t0()).await.unwrap();
    assert!(harvest.produced.food >= 1);
    assert_eq!(harvest.population_gain, harvest.produced.food);

    let blocked = engine.mine(&n1, t0() + Duration::seconds(1)).await;
    assert!(matches!(
        blocked,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Player,
            remaining_ms: 4000,
        }))
    ));

    engine.mine(&n1, t0() + Duration::seconds(5)).await.unwrap();
    let player = engine.player(&n1).await.unwrap();
    assert_eq!(player.exp.economist, 4);

    let nation = engine.nation(&nid("north")).await.unwrap();
    assert_eq!(nation.resources.food, harvest.produced.food);
    assert_eq!(nation.population, 1000 + harvest.produced.food);
    assert_eq!(
        nation.leadership.finance_minister.as_ref().map(|m| m.player.clone()),
        Some(n1)
    );
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, WorldEvent::LeadershipChanged { .. })));
}

#[tokio::test]
async fn failed_command_leaves_world_untouched() {
    let (engine, mut rx) = engine_with(border_world(), GameConfig::default());
    let before = engine.snapshot().await;

    let result = engine.build(&pid("n1"), BuildingKind::Bank, t0()).await;
    assert!(matches!(result, Err(EngineError::Economy(_))));
    let result = engine.deploy(&pid("n1"), Unit::Jets, t0()).await;
    assert!(matches!(
        result,
        Err(EngineError::Economy(EconomyError::ResearchRequired {
            research: ResearchKind::Flight
        }))
    ));

    assert_eq!(engine.snapshot().await, before);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn concurrent_farms_are_serialized() {
    let (engine, _rx) = engine_with(border_world(), GameConfig::default());
    engine.join(pid("n2"), &nid("north")).await.unwrap();
    engine.join(pid("n3"), &nid("north")).await.unwrap();
    let (p1, p2, p3) = (pid("n1"), pid("n2"), pid("n3"));

    let (a, b, c) = tokio::join!(
        engine.farm(&p1, t0()),
        engine.farm(&p2, t0()),
        engine.farm(&p3, t0()),
    );
    let total = a.unwrap().produced.food + b.unwrap().produced.food + c.unwrap().produced.food;

    let nation = engine.nation(&nid("north")).await.unwrap();
    assert_eq!(nation.resources.food, total);
    assert_eq!(nation.population, 1000 + total);
}

#[tokio::test]
async fn token_launch_needs_research_and_cooldowns() {
    let mut world = border_world();
    world.nations.get_mut(&nid("north")).unwrap().resources.gold = 1000;
    let (engine, mut rx) = engine_with(world, GameConfig::default());
    let n1 = pid("n1");

    let early = engine.launch_token(&n1, t0()).await;
    assert!(matches!(
        early,
        Err(EngineError::Economy(EconomyError::ResearchRequired {
            research: ResearchKind::ShitCoins
        }))
    ));

    engine.research(&n1, ResearchKind::ShitCoins).await.unwrap();
    let launch = engine.launch_token(&n1, t0()).await.unwrap();
    let nation = engine.nation(&nid("north")).await.unwrap();
    assert_eq!(nation.resources.gold, 1000 - 400 - 30 + launch.payout);

    let again = engine.launch_token(&n1, t0() + Duration::seconds(10)).await;
    assert!(matches!(
        again,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Nation(NationAction::LaunchShitcoin),
            ..
        }))
    ));
    assert!(drain(&mut rx).contains(&WorldEvent::TokenLaunched {
        nation: nid("north"),
        payout: launch.payout,
    }));
}

// ---------------------------------------------------------------------------
// Territory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn survey_then_settle() {
    let mut world = GameWorld::new();
    let mut nation = make_nation("a");
    nation.population = 2500;
    nation.resources.gold = 1000;
    nation.resources.steel = 1000;
    nation.tiles_discovered = 2;
    world.put_tile(city_tile(1, &nation, &[]));
    world.put_player(player("pa", &nation));
    world.put_nation(nation);
    let (engine, mut rx) = engine_with(world, GameConfig::default());
    let pa = pid("pa");

    let tile = engine.survey(&pa, t0()).await.unwrap();
    assert!(tile.is_surveyed_by(&nid("a")));
    assert!(tile.city.is_none());

    let settlement = engine
        .settle(&pa, tile.id, "Port Royal", t0() + Duration::seconds(5))
        .await
        .unwrap();
    assert_eq!(settlement.tile, tile.id);
    assert!(settlement.observers.is_empty());

    let nation = engine.nation(&nid("a")).await.unwrap();
    assert_eq!(nation.city_count(), 2);
    assert_eq!(nation.resources.gold, 200);
    assert_eq!(nation.resources.steel, 0);
    assert_eq!(engine.player(&pa).await.unwrap().exp.scout, 30);

    let exhausted = engine.survey(&pa, t0() + Duration::seconds(10)).await;
    assert!(matches!(
        exhausted,
        Err(EngineError::Economy(EconomyError::NothingToSurvey {
            discovered: 2,
            surveyed: 2
        }))
    ));
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, WorldEvent::CitySettled { city_name, .. } if city_name == "Port Royal")));
}

#[tokio::test]
async fn exploring_a_small_world_reveals_rivals() {
    let mut config = GameConfig::default();
    config.world.world_tiles = 4;
    let (engine, mut rx) = engine_with(border_world(), config);
    let n1 = pid("n1");

    let mut discovered = false;
    for i in 0..60 {
        let report = engine
            .explore(&n1, t0() + Duration::seconds(5 * i))
            .await
            .unwrap();
        if !report.discoveries.is_empty() {
            discovered = true;
            break;
        }
    }
    assert!(discovered);

    let world = engine.snapshot().await;
    let north = world.nation(&nid("north")).unwrap();
    assert!(!north.discovered_cities.is_empty());
    let intel = world.intel.get(&(nid("north"), nid("south"))).unwrap();
    assert!(!intel.known_cities.is_empty());
    for city in &intel.known_cities {
        assert!(world.tile(city.tile).unwrap().is_surveyed_by(&nid("north")));
    }
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, WorldEvent::CityDiscovered { owner, .. } if *owner == nid("south"))));
}

#[tokio::test]
async fn envoy_uses_nation_cooldown() {
    let (engine, mut rx) = engine_with(border_world(), GameConfig::default());
    let n1 = pid("n1");

    let own = engine.envoy(&n1, &nid("north"), "hello", t0()).await;
    assert!(matches!(own, Err(EngineError::Diplomacy(DiplomacyError::SelfTarget))));
    let unknown = engine.envoy(&n1, &nid("atlantis"), "hello", t0()).await;
    assert!(matches!(unknown, Err(EngineError::NationNotFound(_))));

    engine
        .envoy(&n1, &nid("south"), "We come in peace.", t0())
        .await
        .unwrap();
    let again = engine
        .envoy(&n1, &nid("south"), "Still here.", t0() + Duration::minutes(1))
        .await;
    assert!(matches!(
        again,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Nation(NationAction::Envoy),
            ..
        }))
    ));
    engine
        .envoy(&n1, &nid("south"), "Open your ports.", t0() + Duration::minutes(15))
        .await
        .unwrap();
    assert_eq!(engine.player(&n1).await.unwrap().exp.diplomat, 30);

    let messages: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            WorldEvent::EnvoySent {
                from,
                to,
                player,
                message,
            } => {
                assert_eq!((from, to, player), (nid("north"), nid("south"), n1.clone()));
                Some(message)
            }
            _ => None,
        })
        .collect();
    assert_eq!(messages, vec!["We come in peace.", "Open your ports."]);
}

// ---------------------------------------------------------------------------
// Conflict
// ---------------------------------------------------------------------------

#[tokio::test]
async fn undefended_city_falls_and_pays_prize() {
    let mut config = GameConfig::default();
    config.prize_pool.enabled = true;
    let mut world = border_world();
    let mut intel = nationstate_types::Intel::new(nid("north"), nid("south"), "Nation south");
    intel.remember_city(TileId(2), "City 2");
    intel.remember_city(TileId(3), "City 3");
    world.put_intel(intel);
    let (engine, mut rx) = engine_with(world, config);
    engine.pool().deposit(&nid("south"), "AVAX", dec!(10)).await;
    let n1 = pid("n1");

    let summary = engine.attack(&n1, TileId(2), t0()).await.unwrap();
    let fallen = summary.report.fallen.clone().unwrap();
    assert_eq!(fallen.tile, TileId(2));
    assert_eq!(fallen.cities_before, 2);
    assert_eq!(fallen.gold_looted, 50);
    assert_eq!(summary.prize.unwrap().amount, dec!(5));

    let world = engine.snapshot().await;
    assert!(world.tile(TileId(2)).unwrap().city.is_none());
    let south = world.nation(&nid("south")).unwrap();
    assert_eq!(south.city_count(), 1);
    assert_eq!(south.resources.gold, 50);
    assert_eq!(south.peak_population, Some(south.population));
    let north = world.nation(&nid("north")).unwrap();
    assert_eq!(north.resources.gold, 50);
    assert!(north.cooldowns.contains_key(&NationAction::Attack));
    assert_eq!(world.player(&n1).unwrap().exp.military, 10);

    let intel = world.intel.get(&(nid("north"), nid("south"))).unwrap();
    let known: Vec<TileId> = intel.known_cities.iter().map(|c| c.tile).collect();
    assert_eq!(known, vec![TileId(3)]);

    assert_eq!(engine.pool().balance(&nid("north"), "AVAX").await.unwrap(), dec!(5));
    assert_eq!(engine.pool().balance(&nid("south"), "AVAX").await.unwrap(), dec!(5));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, WorldEvent::Attacked { .. })));
    assert!(events.contains(&WorldEvent::CityFallen {
        attacker: nid("north"),
        defender: nid("south"),
        tile: TileId(2),
        city_name: String::from("City 2"),
    }));

    let ruined = engine.attack(&n1, TileId(2), t0() + Duration::days(2)).await;
    assert!(matches!(
        ruined,
        Err(EngineError::Conflict(ConflictError::TileHasNoCity(TileId(2))))
    ));
    let cooling = engine.attack(&n1, TileId(3), t0() + Duration::hours(1)).await;
    assert!(matches!(
        cooling,
        Err(EngineError::Conflict(ConflictError::Diplomacy(
            DiplomacyError::CooldownActive {
                scope: CooldownScope::Nation(NationAction::Attack),
                ..
            }
        )))
    ));
}

#[tokio::test]
async fn attack_respects_player_cooldown() {
    let mut world = border_world();
    let mut south = world.nation(&nid("south")).unwrap().clone();
    south.military.troops = 10_000;
    south.population = 10_000;
    world.put_nation(south);
    let (engine, _rx) = engine_with(world, GameConfig::default());
    let n1 = pid("n1");

    let first = engine.attack(&n1, TileId(2), t0()).await.unwrap();
    assert!(first.report.fallen.is_none());
    let army = engine.nation(&nid("south")).await.unwrap().military;

    let second = engine.attack(&n1, TileId(3), t0() + Duration::seconds(2)).await;
    assert!(matches!(
        second,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Player,
            ..
        }))
    ));
    assert_eq!(engine.nation(&nid("south")).await.unwrap().military, army);
}

#[tokio::test]
async fn attack_on_own_city_is_rejected() {
    let (engine, _rx) = engine_with(border_world(), GameConfig::default());
    let result = engine.attack(&pid("n1"), TileId(1), t0()).await;
    assert!(matches!(
        result,
        Err(EngineError::Conflict(ConflictError::OwnCity(TileId(1))))
    ));
}

#[tokio::test]
async fn truce_blocks_attacks_until_it_ends() {
    let (engine, mut rx) = engine_with(border_world(), GameConfig::default());
    let (n1, s1) = (pid("n1"), pid("s1"));

    let id = engine
        .propose_truce(&s1, &nid("north"), Some(24), None, t0())
        .await
        .unwrap();
    let wrong_side = engine.respond_truce(&s1, id, true, t0()).await;
    assert!(matches!(
        wrong_side,
        Err(EngineError::Diplomacy(DiplomacyError::NotAuthorized(_)))
    ));
    let resolution = engine.respond_truce(&n1, id, true, t0()).await.unwrap();
    assert!(matches!(resolution, TruceResolution::Accepted { .. }));

    let blocked = engine.attack(&n1, TileId(2), t0() + Duration::hours(1)).await;
    assert!(matches!(
        blocked,
        Err(EngineError::Conflict(ConflictError::TruceActive { .. }))
    ));

    engine
        .attack(&n1, TileId(2), t0() + Duration::hours(25))
        .await
        .unwrap();

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        WorldEvent::TruceResolved {
            status: TruceStatus::Accepted,
            ends_at: Some(_),
            ..
        }
    )));
}

#[tokio::test]
async fn espionage_checks_both_cooldowns() {
    let (engine, _rx) = engine_with(border_world(), GameConfig::default());
    let n1 = pid("n1");

    let outcome = engine.spy(&n1, TileId(2), t0()).await.unwrap();
    if let EspionageOutcome::Spied { snapshot } = &outcome {
        assert_eq!(snapshot.resources.gold, 100);
    }

    let player_blocked = engine.spy(&n1, TileId(2), t0() + Duration::seconds(1)).await;
    assert!(matches!(
        player_blocked,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Player,
            ..
        }))
    ));
    let nation_blocked = engine.spy(&n1, TileId(2), t0() + Duration::seconds(10)).await;
    assert!(matches!(
        nation_blocked,
        Err(EngineError::Diplomacy(DiplomacyError::CooldownActive {
            scope: CooldownScope::Nation(NationAction::Spy),
            ..
        }))
    ));

    // Spying does not block sabotage.
    engine
        .sabotage(&n1, TileId(3), t0() + Duration::seconds(10))
        .await
        .unwrap();

    let world = engine.snapshot().await;
    let intel = world.intel.get(&(nid("north"), nid("south"))).unwrap();
    assert_eq!(intel.spy.last_attempt_at, Some(t0()));
    assert_eq!(
        intel.sabotage.last_attempt_at,
        Some(t0() + Duration::seconds(10))
    );
    assert_eq!(world.player(&n1).unwrap().exp.diplomat, 30);
}

#[tokio::test]
async fn unsurveyed_city_cannot_be_hacked() {
    let mut world = border_world();
    world
        .tiles
        .get_mut(&TileId(3))
        .unwrap()
        .surveyed_by
        .remove(&nid("north"));
    let (engine, _rx) = engine_with(world, GameConfig::default());
    let before = engine.snapshot().await;

    let result = engine.hack(&pid("n1"), TileId(3), t0()).await;
    assert!(matches!(
        result,
        Err(EngineError::Conflict(ConflictError::NotSurveyed(TileId(3))))
    ));
    assert_eq!(engine.snapshot().await, before);
}

// ---------------------------------------------------------------------------
// Agreements
// ---------------------------------------------------------------------------

fn trading_world() -> GameWorld {
    let mut a = make_nation("a");
    a.resources.food = 20;
    a.resources.gold = 5;
    let mut b = make_nation("b");
    b.resources.steel = 10;

    let mut world = GameWorld::new();
    world.put_player(player("pa", &a));
    world.put_player(player("pb", &b));
    world.put_nation(a);
    world.put_nation(b);
    world
}

fn terms(item: impl Into<Commodity>, amount: u64) -> TradeTerms {
    TradeTerms {
        item: item.into(),
        amount,
    }
}

#[tokio::test]
async fn trade_accept_applies_once() {
    let (engine, mut rx) = engine_with(trading_world(), GameConfig::default());
    let (pa, pb) = (pid("pa"), pid("pb"));

    let id = engine
        .propose_trade(&pa, &nid("b"), terms(Resource::Steel, 10), Some(terms(Resource::Food, 20)), t0())
        .await
        .unwrap();
    let own_answer = engine.respond_trade(&pa, id, true, t0()).await;
    assert!(matches!(
        own_answer,
        Err(EngineError::Diplomacy(DiplomacyError::NotAuthorized(_)))
    ));

    let accepted = engine.respond_trade(&pb, id, true, t0()).await.unwrap();
    assert_eq!(
        accepted,
        TradeResolution::Accepted {
            requester_gave: terms(Resource::Food, 20),
            target_gave: terms(Resource::Steel, 10),
        }
    );

    let again = engine.respond_trade(&pb, id, true, t0()).await;
    assert!(matches!(
        again,
        Err(EngineError::Diplomacy(DiplomacyError::TradeNotOpen(TradeStatus::Accepted)))
    ));

    let world = engine.snapshot().await;
    let a = world.nation(&nid("a")).unwrap();
    let b = world.nation(&nid("b")).unwrap();
    assert_eq!((a.resources.food, a.resources.steel), (0, 10));
    assert_eq!((b.resources.food, b.resources.steel), (20, 0));

    let events = drain(&mut rx);
    assert!(events.contains(&WorldEvent::TradeResolved {
        trade: id,
        status: TradeStatus::Accepted,
    }));
}

#[tokio::test]
async fn open_trade_goes_through_counter() {
    let (engine, mut rx) = engine_with(trading_world(), GameConfig::default());
    let (pa, pb) = (pid("pa"), pid("pb"));

    let id = engine
        .propose_trade(&pa, &nid("b"), terms(Resource::Steel, 10), None, t0())
        .await
        .unwrap();
    let direct = engine.respond_trade(&pb, id, true, t0()).await;
    assert!(matches!(
        direct,
        Err(EngineError::Diplomacy(DiplomacyError::OpenTradeNeedsCounter))
    ));

    let countered = engine
        .counter_trade(&pb, id, terms(Resource::Gold, 5), t0())
        .await
        .unwrap();
    assert!(matches!(countered, TradeResolution::Countered { .. }));
    let self_accept = engine.respond_trade(&pb, id, true, t0()).await;
    assert!(matches!(
        self_accept,
        Err(EngineError::Diplomacy(DiplomacyError::NotAuthorized(_)))
    ));

    engine.respond_trade(&pa, id, true, t0()).await.unwrap();
    let world = engine.snapshot().await;
    let a = world.nation(&nid("a")).unwrap();
    let b = world.nation(&nid("b")).unwrap();
    assert_eq!((a.resources.gold, a.resources.steel), (0, 10));
    assert_eq!((b.resources.gold, b.resources.steel), (5, 0));

    let statuses: Vec<TradeStatus> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            WorldEvent::TradeResolved { status, .. } => Some(status),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, vec![TradeStatus::PendingCounter, TradeStatus::Accepted]);
}

#[tokio::test]
async fn stale_truce_expires_and_renews_in_place() {
    let (engine, mut rx) = engine_with(trading_world(), GameConfig::default());
    let pa = pid("pa");

    let first = engine
        .propose_truce(&pa, &nid("b"), None, None, t0())
        .await
        .unwrap();
    let pending = engine.propose_truce(&pa, &nid("b"), None, None, t0()).await;
    assert!(matches!(
        pending,
        Err(EngineError::Diplomacy(DiplomacyError::TruceOfferPending))
    ));

    let (truces, trades) = engine.expire_stale(t0() + Duration::hours(5)).await;
    assert_eq!(truces, vec![first]);
    assert!(trades.is_empty());
    let world = engine.snapshot().await;
    assert_eq!(world.truces.get(first).unwrap().status, TruceStatus::Expired);

    let renewed = engine
        .propose_truce(&pa, &nid("b"), None, None, t0() + Duration::hours(6))
        .await
        .unwrap();
    assert_eq!(renewed, first);
    assert_eq!(engine.snapshot().await.truces.records().count(), 1);

    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        WorldEvent::TruceResolved {
            status: TruceStatus::Expired,
            ..
        }
    )));
}

#[tokio::test]
async fn boosts_extend_from_current_end() {
    let (engine, _rx) = engine_with(trading_world(), GameConfig::default());
    let first = engine
        .apply_boost(&nid("a"), Resource::Food, 2, 2, t0())
        .await
        .unwrap();
    assert_eq!(first, t0() + Duration::hours(2));
    let extended = engine
        .apply_boost(&nid("a"), Resource::Food, 3, 2, t0() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(extended, t0() + Duration::hours(5));
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[tokio::test]
async fn last_nation_standing_ends_the_game() {
    let (engine, mut rx) = engine_with(border_world(), GameConfig::default());
    let n1 = pid("n1");
    assert!(engine.check_game_end(t0()).await.is_none());

    let first = engine.attack(&n1, TileId(2), t0()).await.unwrap();
    assert!(first.report.fallen.is_some());
    assert!(engine.check_game_end(t0()).await.is_none());

    let later = t0() + Duration::hours(25);
    let second = engine.attack(&n1, TileId(3), later).await.unwrap();
    assert!(second.report.fallen.is_some());
    assert_eq!(engine.nation(&nid("south")).await.unwrap().city_count(), 0);

    let end = engine.check_game_end(later).await.unwrap();
    assert_eq!(
        end,
        GameEnd::LastNationStanding {
            winner: nid("north")
        }
    );
    assert_eq!(engine.check_game_end(later).await, Some(end));

    let endings: Vec<WorldEvent> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, WorldEvent::SeasonEnded { .. }))
        .collect();
    assert_eq!(
        endings,
        vec![WorldEvent::SeasonEnded {
            winner: Some(nid("north"))
        }]
    );
}

#[tokio::test]
async fn seasonal_game_ranks_at_the_deadline() {
    let mut config = GameConfig::default();
    config.game.game_type = GameType::Seasonal;
    config.game.victory = VictoryType::Gold;
    config.game.season_end = Some(t0() + Duration::days(1));
    let mut world = border_world();
    let mut north = world.nation(&nid("north")).unwrap().clone();
    north.resources.gold = 40;
    world.put_nation(north);
    let (engine, mut rx) = engine_with(world, config);

    let standings = engine.standings().await;
    let order: Vec<NationId> = standings.iter().map(|s| s.nation.clone()).collect();
    assert_eq!(order, vec![nid("south"), nid("north")]);
    assert_eq!(standings.first().unwrap().score, 100);

    assert!(engine.check_game_end(t0()).await.is_none());
    let end = engine.check_game_end(t0() + Duration::days(1)).await.unwrap();
    assert_eq!(end.winner(), Some(&nid("south")));
    assert!(matches!(
        end,
        GameEnd::SeasonOver {
            victory: VictoryType::Gold,
            ..
        }
    ));
    assert!(drain(&mut rx).contains(&WorldEvent::SeasonEnded {
        winner: Some(nid("south"))
    }));
}
