//! Demo binary for the nationstate engine.
//!
//! Loads configuration, starts the engine over an empty world backed by an
//! in-memory prize pool, plays a scripted skirmish and logs every world
//! event as it is emitted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `nationstate.yaml` (or `NATIONSTATE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the engine and start the event logger
//! 4. Seed the prize pool
//! 5. Run the skirmish
//! 6. Log the result

mod error;
mod skirmish;

use std::path::PathBuf;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nationstate_core::config::{GameConfig, LoggingSettings};
use nationstate_core::events::EventReceiver;
use nationstate_core::{Engine, LedgerPool};
use nationstate_types::NationId;

use crate::error::AppError;

/// Rounds played by the skirmish.
const SKIRMISH_ROUNDS: u32 = 60;

/// Balance each nation's prize pool starts with.
const STARTING_POOL_BALANCE: u32 = 1_000;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the skirmish
/// cannot be set up.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let path = config_path();
    let found = path.exists();
    let config = load_config(&path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("nationstate-engine starting");
    if found {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        world_tiles = config.world.world_tiles,
        population_per_city = config.world.population_per_city,
        prize_pool = config.prize_pool.enabled,
        "World settings"
    );

    // 3. Create the engine and start the event logger.
    let ticker = config.prize_pool.ticker.clone();
    let (engine, events) = Engine::new(config, LedgerPool::new());
    let logger = tokio::spawn(log_events(events));

    // 4. Seed the prize pool.
    for nation in ["north", "south"] {
        engine
            .pool()
            .deposit(&NationId::new(nation), &ticker, Decimal::from(STARTING_POOL_BALANCE))
            .await;
    }

    // 5. Run the skirmish.
    let report = skirmish::run(&engine, Utc::now(), SKIRMISH_ROUNDS).await?;

    // 6. Log the result.
    let victory = engine.config().game.victory;
    for (place, standing) in engine.standings().await.iter().enumerate() {
        info!(
            place = place.saturating_add(1),
            nation = %standing.nation,
            name = %standing.name,
            ?victory,
            score = standing.score,
            tiebreak = standing.tiebreak,
            "Final standing"
        );
    }
    if let Some(end) = engine.check_game_end(Utc::now()).await {
        info!(winner = ?end.winner(), "Game over");
    }
    info!(
        commands = report.commands,
        rejected = report.rejected,
        attacks = report.attacks,
        cities_fallen = report.cities_fallen,
        "Skirmish complete"
    );

    drop(engine);
    let logged = logger.await.map_err(|e| AppError::EventLogger {
        message: format!("{e}"),
    })?;
    info!(events = logged, "nationstate-engine shutdown complete");

    Ok(())
}

/// Location of the configuration file.
fn config_path() -> PathBuf {
    std::env::var_os("NATIONSTATE_CONFIG").map_or_else(|| PathBuf::from("nationstate.yaml"), PathBuf::from)
}

/// Load the game configuration, falling back to defaults when the file is
/// absent. Environment overrides apply either way.
fn load_config(path: &std::path::Path) -> Result<GameConfig, AppError> {
    if path.exists() {
        Ok(GameConfig::from_file(path)?)
    } else {
        let mut config = GameConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Log world events until the engine is dropped. Returns how many were seen.
async fn log_events(mut events: EventReceiver) -> u64 {
    let mut seen: u64 = 0;
    while let Some(event) = events.recv().await {
        seen = seen.saturating_add(1);
        info!(?event, "world event");
    }
    if seen == 0 {
        warn!("no world events were emitted");
    }
    seen
}
