//! The command engine.
//!
//! [`Engine`] owns the world store behind a single async mutex, so every
//! command runs as one serialized unit: concurrent attacks on the same
//! nation cannot read the same defender and double-apply losses.
//!
//! Each command follows the same shape:
//!
//! 1. Clone the documents it touches out of the store.
//! 2. Check cooldowns, then run the resolver against the clones.
//! 3. Grant experience and start cooldowns on the clones.
//! 4. Write every clone back and emit [`WorldEvent`]s.
//!
//! Any error before step 4 leaves the store untouched. The prize pool
//! transfer after a city falls runs once the lock is released, and its
//! failure never affects the committed result.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info};

use nationstate_conflict::combat::AttackReport;
use nationstate_conflict::victory::{self, GameEnd, Standing};
use nationstate_conflict::{Battlefield, ConflictError, EspionageOutcome, attempt, resolve_attack};
use nationstate_diplomacy::cooldown::{check_nation, check_player, mark_nation, mark_player};
use nationstate_diplomacy::{DiplomacyError, TradeResolution, TruceResolution};
use nationstate_economy::construction::{BuildReceipt, attempt_build, purchase_research};
use nationstate_economy::deployment::{Deployment, deploy};
use nationstate_economy::experience::grant_exp;
use nationstate_economy::gathering::{Harvest, drill, farm, mine};
use nationstate_economy::market::{SaleReceipt, sell};
use nationstate_economy::tables::Cost;
use nationstate_economy::territory::{
    ExploreReport, Settlement, explore, first_free_tile, found_capital, settle, survey,
};
use nationstate_economy::ventures::{TokenLaunch, launch_token};
use nationstate_economy::{EconomyError, boosts};
use nationstate_types::{
    BuildingKind, CovertAction, Nation, NationAction, NationId, NationTrait, Player, PlayerId,
    ResearchKind, Resource, SkillTrack, Tile, TileId, TradeId, TradeTerms, Tribute, TruceId, Unit,
};

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::events::{self, EventReceiver, EventSender, WorldEvent};
use crate::prize_pool::{PrizePool, TransferReceipt, settle_city_fall};
use crate::world::GameWorld;

/// Signature shared by the gathering resolvers.
type GatherFn = fn(&mut Nation, u64, &[Tile], DateTime<Utc>) -> Result<Harvest, EconomyError>;

/// The result of an attack, including any prize pool transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackSummary {
    /// What happened on the battlefield.
    pub report: AttackReport,
    /// The prize pool transfer made after a city fell.
    pub prize: Option<TransferReceipt>,
}

struct EngineState {
    world: GameWorld,
    rng: StdRng,
    game_over: bool,
}

/// Runs player commands against the world, one at a time.
pub struct Engine<P> {
    state: Mutex<EngineState>,
    config: GameConfig,
    events: EventSender,
    pool: P,
}

impl<P: PrizePool> Engine<P> {
    /// Create an engine over an empty world with an OS-seeded RNG.
    ///
    /// Returns the receiver for [`WorldEvent`]s.
    pub fn new(config: GameConfig, pool: P) -> (Self, EventReceiver) {
        Self::assemble(config, pool, GameWorld::new(), StdRng::from_os_rng())
    }

    /// Create an engine over an existing world with a fixed RNG seed.
    pub fn with_world(config: GameConfig, pool: P, world: GameWorld, seed: u64) -> (Self, EventReceiver) {
        Self::assemble(config, pool, world, StdRng::seed_from_u64(seed))
    }

    fn assemble(config: GameConfig, pool: P, world: GameWorld, rng: StdRng) -> (Self, EventReceiver) {
        let (events, receiver) = events::channel();
        let engine = Self {
            state: Mutex::new(EngineState {
                world,
                rng,
                game_over: false,
            }),
            config,
            events,
            pool,
        };
        (engine, receiver)
    }

    /// The configuration the engine runs with.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The prize pool port.
    pub const fn pool(&self) -> &P {
        &self.pool
    }

    /// A copy of the whole world.
    pub async fn snapshot(&self) -> GameWorld {
        self.state.lock().await.world.clone()
    }

    /// A copy of one nation.
    pub async fn nation(&self, id: &NationId) -> Result<Nation, EngineError> {
        self.state.lock().await.world.nation(id).cloned()
    }

    /// A copy of one player.
    pub async fn player(&self, id: &PlayerId) -> Result<Player, EngineError> {
        self.state.lock().await.world.player(id).cloned()
    }

    // -----------------------------------------------------------------------
    // Nations and players
    // -----------------------------------------------------------------------

    /// Found a nation on the first free tile, with `founder` as its first
    /// player. Returns the capital tile.
    pub async fn found_nation(
        &self,
        id: NationId,
        name: &str,
        nation_trait: Option<NationTrait>,
        founder: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<TileId, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        if world.nations.contains_key(&id) {
            return Err(EngineError::AlreadyExists(format!("nation {id}")));
        }
        if world.players.contains_key(&founder) {
            return Err(EngineError::AlreadyExists(format!("player {founder}")));
        }

        let mut nation = Nation::new(id, name, nation_trait, now);
        let tile_id = first_free_tile(&world.used_tile_ids(), self.config.world.world_tiles)?;
        let capital = found_capital(&nation, tile_id, rng, now);
        nation.player_count = 1;
        let player = Player::new(founder, nation.id.clone());
        info!(nation = %nation.id, name, capital = %tile_id, trait_ = ?nation_trait, "nation founded");

        let events = vec![
            WorldEvent::NationFounded {
                nation: nation.id.clone(),
                capital: tile_id,
            },
            WorldEvent::PlayerJoined {
                player: player.id.clone(),
                nation: nation.id.clone(),
            },
        ];
        world.put_tile(capital);
        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(tile_id)
    }

    /// Enlist a new player in an existing nation.
    pub async fn join(&self, player: PlayerId, nation: &NationId) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        if world.players.contains_key(&player) {
            return Err(EngineError::AlreadyExists(format!("player {player}")));
        }
        if world.is_exiled(nation, &player) {
            return Err(EngineError::Exiled {
                player,
                nation: nation.clone(),
            });
        }
        let mut joined = world.nation(nation)?.clone();
        joined.player_count = joined.player_count.saturating_add(1);
        let player = Player::new(player, joined.id.clone());
        info!(player = %player.id, nation = %joined.id, "player joined");

        let event = WorldEvent::PlayerJoined {
            player: player.id.clone(),
            nation: joined.id.clone(),
        };
        world.put_nation(joined);
        world.put_player(player);
        self.emit(vec![event]);
        Ok(())
    }

    /// Leave the player's nation. The player may join any nation afterwards.
    pub async fn retire(&self, player: &PlayerId) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (player, nation) = world.actor(player)?;
        self.depart(world, &player, nation, false);
        Ok(())
    }

    /// Remove `player` from `nation` and bar them from rejoining it.
    pub async fn exile(&self, nation: &NationId, player: &PlayerId) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (member, home) = world.actor(player)?;
        if &home.id != nation {
            return Err(EngineError::NotAMember {
                player: member.id,
                nation: nation.clone(),
            });
        }
        world.exiled.insert((home.id.clone(), member.id.clone()));
        self.depart(world, &member, home, true);
        Ok(())
    }

    /// Lift an exile so the player may join `nation` again.
    pub async fn return_exiled(&self, nation: &NationId, player: &PlayerId) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        if !state.world.exiled.remove(&(nation.clone(), player.clone())) {
            return Err(EngineError::NotExiled {
                player: player.clone(),
                nation: nation.clone(),
            });
        }
        info!(%player, %nation, "exile lifted");
        Ok(())
    }

    /// Drop the player, shrink the head count and vacate any minister slot
    /// they held.
    fn depart(&self, world: &mut GameWorld, player: &Player, mut nation: Nation, exiled: bool) {
        nation.player_count = nation.player_count.saturating_sub(1);
        for track in SkillTrack::ALL {
            let slot = nation.leadership.slot_mut(track);
            if slot.as_ref().is_some_and(|m| m.player == player.id) {
                *slot = None;
            }
        }
        info!(player = %player.id, nation = %nation.id, exiled, "player left");

        let event = WorldEvent::PlayerLeft {
            player: player.id.clone(),
            nation: nation.id.clone(),
            exiled,
        };
        world.players.remove(&player.id);
        world.put_nation(nation);
        self.emit(vec![event]);
    }

    // -----------------------------------------------------------------------
    // Season
    // -----------------------------------------------------------------------

    /// Every nation ranked by the configured victory type, best first.
    pub async fn standings(&self) -> Vec<Standing> {
        let state = self.state.lock().await;
        let nations: Vec<&Nation> = state.world.nations.values().collect();
        victory::rank(&nations, self.config.game.victory)
    }

    /// Whether the game is over at `now`.
    ///
    /// [`WorldEvent::SeasonEnded`] is emitted the first time an end is
    /// found. Later calls still return the end but emit nothing.
    pub async fn check_game_end(&self, now: DateTime<Utc>) -> Option<GameEnd> {
        let mut state = self.state.lock().await;
        let nations: Vec<&Nation> = state.world.nations.values().collect();
        let owners = state.world.city_owners();
        let end = victory::check_game_end(&nations, &owners, &self.config.season(), now)?;

        if !state.game_over {
            state.game_over = true;
            info!(winner = ?end.winner(), "game over");
            self.emit(vec![WorldEvent::SeasonEnded {
                winner: end.winner().cloned(),
            }]);
        }
        Some(end)
    }

    // -----------------------------------------------------------------------
    // Economy
    // -----------------------------------------------------------------------

    /// Farm food for the player's nation.
    pub async fn farm(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<Harvest, EngineError> {
        self.gather(player, farm, now).await
    }

    /// Mine steel and gold for the player's nation.
    pub async fn mine(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<Harvest, EngineError> {
        self.gather(player, mine, now).await
    }

    /// Drill oil for the player's nation.
    pub async fn drill(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<Harvest, EngineError> {
        self.gather(player, drill, now).await
    }

    async fn gather(
        &self,
        player: &PlayerId,
        action: GatherFn,
        now: DateTime<Utc>,
    ) -> Result<Harvest, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let owned = world.owned_tiles(&nation.id);
        let harvest = action(&mut nation, player.exp.economist, &owned, now)?;
        let mut events = Vec::new();
        self.grant(&mut player, &mut nation, SkillTrack::Economist, &mut events)?;
        mark_player(&mut player, now);

        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(harvest)
    }

    /// Sell a resource for gold.
    pub async fn sell(
        &self,
        player: &PlayerId,
        resource: Resource,
        amount: u64,
        now: DateTime<Utc>,
    ) -> Result<SaleReceipt, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let receipt = sell(&mut nation, resource, amount)?;
        mark_player(&mut player, now);

        world.put_nation(nation);
        world.put_player(player);
        Ok(receipt)
    }

    /// Construct one building.
    pub async fn build(
        &self,
        player: &PlayerId,
        kind: BuildingKind,
        now: DateTime<Utc>,
    ) -> Result<BuildReceipt, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let receipt = attempt_build(&mut nation, kind)?;
        let mut events = Vec::new();
        self.grant(&mut player, &mut nation, SkillTrack::Economist, &mut events)?;
        mark_player(&mut player, now);

        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(receipt)
    }

    /// Buy a research flag. Research has no cooldown.
    pub async fn research(&self, player: &PlayerId, kind: ResearchKind) -> Result<Cost, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, mut nation) = world.actor(player)?;
        let cost = purchase_research(&mut nation, kind)?;
        world.put_nation(nation);
        Ok(cost)
    }

    /// Deploy units.
    pub async fn deploy(
        &self,
        player: &PlayerId,
        unit: Unit,
        now: DateTime<Utc>,
    ) -> Result<Deployment, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let deployment = deploy(&mut nation, player.exp.military, unit, &self.config.economy(), now)?;
        let mut events = Vec::new();
        self.grant(&mut player, &mut nation, SkillTrack::Military, &mut events)?;
        mark_player(&mut player, now);

        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(deployment)
    }

    /// Open or extend a yield boost. Returns when it ends.
    pub async fn apply_boost(
        &self,
        nation: &NationId,
        resource: Resource,
        hours: u32,
        multiplier: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let mut boosted = world.nation(nation)?.clone();
        let ends = boosts::apply_boost(&mut boosted, resource, hours, multiplier, now);
        info!(nation = %boosted.id, %resource, multiplier, %ends, "boost applied");
        world.put_nation(boosted);
        Ok(ends)
    }

    /// Launch a nation token.
    pub async fn launch_token(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<TokenLaunch, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        let (mut player, mut nation) = world.actor(player)?;
        let cooldowns = self.config.cooldowns();
        check_player(&player, &cooldowns, now)?;
        check_nation(&nation, NationAction::LaunchShitcoin, &cooldowns, now)?;

        let launch = launch_token(&mut nation, rng)?;
        let mut events = vec![WorldEvent::TokenLaunched {
            nation: nation.id.clone(),
            payout: launch.payout,
        }];
        self.grant(&mut player, &mut nation, SkillTrack::Economist, &mut events)?;
        mark_player(&mut player, now);
        mark_nation(&mut nation, NationAction::LaunchShitcoin, now);

        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(launch)
    }

    // -----------------------------------------------------------------------
    // Territory
    // -----------------------------------------------------------------------

    /// Survey a fresh tile. Returns the new tile.
    pub async fn survey(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<Tile, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let tile = survey(
            &nation,
            world.surveyed_count(&nation.id),
            &world.used_tile_ids(),
            self.config.world.world_tiles,
            rng,
        )?;
        let mut events = Vec::new();
        self.grant(&mut player, &mut nation, SkillTrack::Scout, &mut events)?;
        mark_player(&mut player, now);

        world.put_tile(tile.clone());
        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(tile)
    }

    /// Found a city on a surveyed tile.
    pub async fn settle(
        &self,
        player: &PlayerId,
        tile: TileId,
        city_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Settlement, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let mut tile = world.tile(tile)?.clone();
        let settlement = settle(&mut nation, &mut tile, city_name, &self.config.economy(), now)?;
        let mut events = vec![WorldEvent::CitySettled {
            nation: nation.id.clone(),
            tile: settlement.tile,
            city_name: settlement.city_name.clone(),
            observers: settlement.observers.clone(),
        }];
        self.grant(&mut player, &mut nation, SkillTrack::Scout, &mut events)?;
        mark_player(&mut player, now);

        world.put_tile(tile);
        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(settlement)
    }

    /// Explore for treasure and rival cities.
    ///
    /// Each revealed city is surveyed by the explorer and recorded in its
    /// intel on the owner.
    pub async fn explore(&self, player: &PlayerId, now: DateTime<Utc>) -> Result<ExploreReport, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        let (mut player, mut nation) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;

        let candidates = world.city_candidates();
        let report = explore(&mut nation, &candidates, self.config.world.world_tiles, rng);

        let mut events = Vec::new();
        let mut tiles = Vec::new();
        let mut intel = Vec::new();
        for found in &report.discoveries {
            let mut tile = world.tile(found.tile)?.clone();
            tile.surveyed_by.insert(nation.id.clone());
            tiles.push(tile);

            let mut record = world.intel_on(&nation.id, &found.owner, &found.owner_name);
            record.remember_city(found.tile, found.city_name.clone());
            intel.push(record);

            events.push(WorldEvent::CityDiscovered {
                discoverer: nation.id.clone(),
                owner: found.owner.clone(),
                tile: found.tile,
            });
        }
        self.grant(&mut player, &mut nation, SkillTrack::Scout, &mut events)?;
        mark_player(&mut player, now);

        for tile in tiles {
            world.put_tile(tile);
        }
        for record in intel {
            world.put_intel(record);
        }
        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(report)
    }

    /// Send an envoy carrying `message` to another nation.
    pub async fn envoy(
        &self,
        player: &PlayerId,
        to: &NationId,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (mut player, mut nation) = world.actor(player)?;
        if &nation.id == to {
            return Err(DiplomacyError::SelfTarget.into());
        }
        world.nation(to)?;
        check_nation(&nation, NationAction::Envoy, &self.config.cooldowns(), now)?;

        mark_nation(&mut nation, NationAction::Envoy, now);
        let mut events = vec![WorldEvent::EnvoySent {
            from: nation.id.clone(),
            to: to.clone(),
            player: player.id.clone(),
            message: message.to_owned(),
        }];
        self.grant(&mut player, &mut nation, SkillTrack::Diplomat, &mut events)?;
        info!(from = %nation.id, %to, "envoy sent");

        world.put_nation(nation);
        world.put_player(player);
        self.emit(events);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Conflict
    // -----------------------------------------------------------------------

    /// Attack the city on `tile`.
    ///
    /// When the city falls and the prize pool is enabled, the loser's share
    /// is transferred after the attack is committed.
    pub async fn attack(
        &self,
        player: &PlayerId,
        tile: TileId,
        now: DateTime<Utc>,
    ) -> Result<AttackSummary, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        let (mut player, mut attacker) = world.actor(player)?;
        check_player(&player, &self.config.cooldowns(), now)?;
        let mut tile = world.tile(tile)?.clone();
        let mut defender = Self::city_owner(world, &tile, &attacker)?;
        let mut defender_intel = world.intel_targeting(&defender.id);

        let field = Battlefield {
            attacker: &mut attacker,
            defender: &mut defender,
            tile: &mut tile,
            truces: &world.truces,
            defender_intel: &mut defender_intel,
        };
        let report = resolve_attack(field, &self.config.combat(), rng, now)?;

        let mut events = vec![WorldEvent::Attacked {
            attacker: attacker.id.clone(),
            defender: defender.id.clone(),
            tile: tile.id,
            defender_losses: report.defender_losses,
            defense_percent: report.defense_percent,
        }];
        if let Some(fallen) = &report.fallen {
            events.push(WorldEvent::CityFallen {
                attacker: attacker.id.clone(),
                defender: defender.id.clone(),
                tile: fallen.tile,
                city_name: fallen.name.clone(),
            });
        }
        self.grant(&mut player, &mut attacker, SkillTrack::Military, &mut events)?;
        mark_player(&mut player, now);

        let (winner, loser) = (attacker.id.clone(), defender.id.clone());
        world.put_tile(tile);
        for record in defender_intel {
            world.put_intel(record);
        }
        world.put_nation(attacker);
        world.put_nation(defender);
        world.put_player(player);
        self.emit(events);
        drop(state);

        let prize = match &report.fallen {
            Some(fallen) => {
                settle_city_fall(&self.pool, &self.config.prize_pool, &winner, &loser, fallen.cities_before).await
            }
            None => None,
        };
        Ok(AttackSummary { report, prize })
    }

    /// Spy on the owner of the city on `tile`.
    pub async fn spy(&self, player: &PlayerId, tile: TileId, now: DateTime<Utc>) -> Result<EspionageOutcome, EngineError> {
        self.covert(player, CovertAction::Spy, tile, now).await
    }

    /// Sabotage the owner of the city on `tile`.
    pub async fn sabotage(
        &self,
        player: &PlayerId,
        tile: TileId,
        now: DateTime<Utc>,
    ) -> Result<EspionageOutcome, EngineError> {
        self.covert(player, CovertAction::Sabotage, tile, now).await
    }

    /// Hack the owner of the city on `tile`.
    pub async fn hack(&self, player: &PlayerId, tile: TileId, now: DateTime<Utc>) -> Result<EspionageOutcome, EngineError> {
        self.covert(player, CovertAction::Hack, tile, now).await
    }

    async fn covert(
        &self,
        player: &PlayerId,
        action: CovertAction,
        tile: TileId,
        now: DateTime<Utc>,
    ) -> Result<EspionageOutcome, EngineError> {
        let mut state = self.state.lock().await;
        let EngineState { world, rng, .. } = &mut *state;
        let (mut player, mut attacker) = world.actor(player)?;
        let cooldowns = self.config.cooldowns();
        check_player(&player, &cooldowns, now)?;
        check_nation(&attacker, action.nation_action(), &cooldowns, now)?;

        let tile = world.tile(tile)?.clone();
        let mut defender = Self::city_owner(world, &tile, &attacker)?;
        let mut intel = world.intel_on(&attacker.id, &defender.id, &defender.name);
        let outcome = attempt(
            action,
            &mut attacker,
            &mut defender,
            &tile,
            &mut intel,
            &self.config.espionage(),
            rng,
            now,
        )?;

        let mut events = Vec::new();
        if let EspionageOutcome::Failed { alerted: true, .. } = outcome {
            events.push(WorldEvent::EspionageAlert {
                spying: attacker.id.clone(),
                target: defender.id.clone(),
                action,
                caught: action == CovertAction::Sabotage,
            });
        }
        self.grant(&mut player, &mut attacker, SkillTrack::Diplomat, &mut events)?;
        mark_player(&mut player, now);
        mark_nation(&mut attacker, action.nation_action(), now);

        world.put_intel(intel);
        world.put_nation(attacker);
        world.put_nation(defender);
        world.put_player(player);
        self.emit(events);
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Agreements
    // -----------------------------------------------------------------------

    /// Offer a truce to another nation.
    pub async fn propose_truce(
        &self,
        player: &PlayerId,
        target: &NationId,
        hours: Option<u32>,
        tribute: Option<Tribute>,
        now: DateTime<Utc>,
    ) -> Result<TruceId, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, requester) = world.actor(player)?;
        let target = world.nation(target)?.clone();
        let id = world
            .truces
            .propose(&requester, &target, hours, tribute, &self.config.agreements(), now)?;
        self.emit(vec![WorldEvent::TruceProposed {
            truce: id,
            requester: requester.id,
            target: target.id,
        }]);
        Ok(id)
    }

    /// Accept or reject a truce on behalf of the player's nation.
    pub async fn respond_truce(
        &self,
        player: &PlayerId,
        truce: TruceId,
        accept: bool,
        now: DateTime<Utc>,
    ) -> Result<TruceResolution, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, responder) = world.actor(player)?;
        let record = world
            .truces
            .get(truce)
            .ok_or(DiplomacyError::TruceNotFound(truce))?;
        let mut requester = world.nation(&record.requester)?.clone();
        let mut target = world.nation(&record.target)?.clone();

        let resolution = world
            .truces
            .respond(truce, &responder.id, accept, &mut requester, &mut target, now)?;
        let event = world.truces.get(truce).map(|t| WorldEvent::TruceResolved {
            truce,
            status: t.status,
            ends_at: t.end_time,
        });

        world.put_nation(requester);
        world.put_nation(target);
        self.emit(event.into_iter().collect());
        Ok(resolution)
    }

    /// Offer a trade. `offer: None` opens the trade for a counter-offer.
    pub async fn propose_trade(
        &self,
        player: &PlayerId,
        target: &NationId,
        request: TradeTerms,
        offer: Option<TradeTerms>,
        now: DateTime<Utc>,
    ) -> Result<TradeId, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, requester) = world.actor(player)?;
        let target = world.nation(target)?.clone();
        let id = world
            .trades
            .propose(&requester, &target, request, offer, &self.config.agreements(), now)?;
        self.emit(vec![WorldEvent::TradeProposed {
            trade: id,
            requester: requester.id,
            target: target.id,
        }]);
        Ok(id)
    }

    /// Replace a pending trade's offer on behalf of the target.
    pub async fn counter_trade(
        &self,
        player: &PlayerId,
        trade: TradeId,
        counter: TradeTerms,
        now: DateTime<Utc>,
    ) -> Result<TradeResolution, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, responder) = world.actor(player)?;
        let record = world
            .trades
            .get(trade)
            .ok_or(DiplomacyError::TradeNotFound(trade))?;
        let target = world.nation(&record.target)?.clone();

        let resolution = world.trades.counter(trade, &responder.id, counter, &target, now)?;
        self.emit_trade_status(world, trade);
        Ok(resolution)
    }

    /// Accept or reject a trade on behalf of the player's nation.
    pub async fn respond_trade(
        &self,
        player: &PlayerId,
        trade: TradeId,
        accept: bool,
        now: DateTime<Utc>,
    ) -> Result<TradeResolution, EngineError> {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let (_, responder) = world.actor(player)?;
        let record = world
            .trades
            .get(trade)
            .ok_or(DiplomacyError::TradeNotFound(trade))?;
        let mut requester = world.nation(&record.requester)?.clone();
        let mut target = world.nation(&record.target)?.clone();

        let resolution = world
            .trades
            .respond(trade, &responder.id, accept, &mut requester, &mut target, now)?;
        world.put_nation(requester);
        world.put_nation(target);
        self.emit_trade_status(world, trade);
        Ok(resolution)
    }

    /// Expire every truce and trade offer whose window has passed.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> (Vec<TruceId>, Vec<TradeId>) {
        let mut state = self.state.lock().await;
        let world = &mut state.world;
        let truces = world.truces.expire_stale(now);
        let trades = world.trades.expire_stale(now);

        let mut events: Vec<WorldEvent> = truces
            .iter()
            .filter_map(|&id| world.truces.get(id))
            .map(|t| WorldEvent::TruceResolved {
                truce: t.id,
                status: t.status,
                ends_at: t.end_time,
            })
            .collect();
        events.extend(trades.iter().filter_map(|&id| world.trades.get(id)).map(|t| {
            WorldEvent::TradeResolved {
                trade: t.id,
                status: t.status,
            }
        }));
        if !events.is_empty() {
            debug!(truces = truces.len(), trades = trades.len(), "stale offers expired");
        }
        self.emit(events);
        (truces, trades)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Clone the nation owning the city on `tile`, which must not be
    /// `attacker`.
    fn city_owner(world: &GameWorld, tile: &Tile, attacker: &Nation) -> Result<Nation, EngineError> {
        let city = tile.city.as_ref().ok_or(ConflictError::TileHasNoCity(tile.id))?;
        if city.owner == attacker.id {
            return Err(ConflictError::OwnCity(tile.id).into());
        }
        Ok(world.nation(&city.owner)?.clone())
    }

    /// Grant the configured experience for `track` and queue the events it
    /// caused.
    fn grant(
        &self,
        player: &mut Player,
        nation: &mut Nation,
        track: SkillTrack,
        events: &mut Vec<WorldEvent>,
    ) -> Result<(), EngineError> {
        let amount = self.config.economy().exp.for_track(track);
        let grant = grant_exp(player, track, amount, nation)?;
        if let Some(rank) = grant.rank_up {
            events.push(WorldEvent::RankUp {
                player: player.id.clone(),
                track: rank.track,
                title: rank.to,
            });
        }
        if let Some(change) = grant.leadership {
            events.push(WorldEvent::LeadershipChanged {
                nation: nation.id.clone(),
                change,
            });
        }
        Ok(())
    }

    fn emit_trade_status(&self, world: &GameWorld, trade: TradeId) {
        if let Some(t) = world.trades.get(trade) {
            self.emit(vec![WorldEvent::TradeResolved {
                trade,
                status: t.status,
            }]);
        }
    }

    fn emit(&self, events: Vec<WorldEvent>) {
        for event in events {
            if self.events.send(event).is_err() {
                debug!("world event receiver dropped");
                return;
            }
        }
    }
}
