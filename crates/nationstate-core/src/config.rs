//! Configuration loading and typed config structures for the nationstate engine.
//!
//! The canonical configuration lives in `nationstate.yaml`. Every section
//! and field is optional and falls back to the game's stock values, so an
//! empty file is a valid configuration. Environment variables override
//! selected YAML values after parsing (see [`GameConfig::apply_env_overrides`]).
//!
//! Resolver crates take small typed configs of their own; the projection
//! methods on [`GameConfig`] build them.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use nationstate_conflict::{CombatConfig, EspionageConfig, SeasonRules};
use nationstate_diplomacy::{AgreementConfig, CooldownConfig};
use nationstate_economy::{EconomyConfig, ExpGrants};
use nationstate_types::{GameType, VictoryType};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// World size and per-city scaling.
    #[serde(default)]
    pub world: WorldSettings,

    /// Cooldown durations in milliseconds.
    #[serde(default)]
    pub cooldowns: CooldownSettings,

    /// Covert action chances and thresholds.
    #[serde(default)]
    pub espionage: EspionageSettings,

    /// Experience granted per action.
    #[serde(default)]
    pub experience: ExperienceSettings,

    /// Truce and trade timing.
    #[serde(default)]
    pub agreements: AgreementSettings,

    /// External prize pool settings.
    #[serde(default)]
    pub prize_pool: PrizePoolSettings,

    /// Game mode and victory conditions.
    #[serde(default)]
    pub game: GameSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values from the process environment.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `WORLD_TILES` | `world.world_tiles` |
    /// | `POPULATION_PER_CITY` | `world.population_per_city` |
    /// | `MIN_MILITARY_POWER_PER_CITY` | `world.min_military_power_per_city` |
    /// | `ATTACK_COOLDOWN_MS` | `cooldowns.attack` |
    /// | `SPY_COOLDOWN_MS` | `cooldowns.spy` |
    /// | `SABOTAGE_COOLDOWN_MS` | `cooldowns.sabotage` |
    /// | `HACK_COOLDOWN_MS` | `cooldowns.hack` |
    /// | `ENVOY_COOLDOWN_MS` | `cooldowns.envoy` |
    /// | `SHITCOIN_COOLDOWN_MS` | `cooldowns.launch_shitcoin` |
    /// | `HACK_DURATION_MS` | `espionage.hack_duration_ms` |
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override values from an arbitrary lookup, keyed like the environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = lookup("WORLD_TILES").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.world.world_tiles = v;
        }
        if let Some(v) = read("POPULATION_PER_CITY") {
            self.world.population_per_city = v;
        }
        if let Some(v) = read("MIN_MILITARY_POWER_PER_CITY") {
            self.world.min_military_power_per_city = v;
        }
        let cooldowns = [
            ("ATTACK_COOLDOWN_MS", &mut self.cooldowns.attack),
            ("SPY_COOLDOWN_MS", &mut self.cooldowns.spy),
            ("SABOTAGE_COOLDOWN_MS", &mut self.cooldowns.sabotage),
            ("HACK_COOLDOWN_MS", &mut self.cooldowns.hack),
            ("ENVOY_COOLDOWN_MS", &mut self.cooldowns.envoy),
            ("SHITCOIN_COOLDOWN_MS", &mut self.cooldowns.launch_shitcoin),
            ("HACK_DURATION_MS", &mut self.espionage.hack_duration_ms),
        ];
        for (key, field) in cooldowns {
            if let Some(v) = read(key) {
                *field = v;
            }
        }
    }

    /// Economy resolver parameters.
    pub const fn economy(&self) -> EconomyConfig {
        EconomyConfig {
            world_tiles: self.world.world_tiles,
            population_per_city: self.world.population_per_city,
            exp: ExpGrants {
                military: self.experience.military,
                economist: self.experience.economist,
                scout: self.experience.scout,
                diplomat: self.experience.diplomat,
            },
        }
    }

    /// Cooldown durations.
    pub const fn cooldowns(&self) -> CooldownConfig {
        let c = &self.cooldowns;
        CooldownConfig {
            resource_ms: c.resource,
            attack_ms: c.attack,
            spy_ms: c.spy,
            sabotage_ms: c.sabotage,
            hack_ms: c.hack,
            envoy_ms: c.envoy,
            launch_shitcoin_ms: c.launch_shitcoin,
        }
    }

    /// Combat resolver parameters.
    pub const fn combat(&self) -> CombatConfig {
        CombatConfig {
            population_per_city: self.world.population_per_city,
            min_military_power_per_city: self.world.min_military_power_per_city,
            cooldowns: self.cooldowns(),
        }
    }

    /// Espionage resolver parameters.
    pub const fn espionage(&self) -> EspionageConfig {
        let e = &self.espionage;
        EspionageConfig {
            spy_success_bps: e.spy_success_bps,
            sabotage_success_bps: e.sabotage_success_bps,
            hack_success_bps: e.hack_success_bps,
            spy_alert_threshold: e.spy_alert_threshold,
            sabotage_alert_threshold: e.sabotage_alert_threshold,
            hack_alert_threshold: e.hack_alert_threshold,
            hack_duration_ms: e.hack_duration_ms,
        }
    }

    /// Truce and trade timing.
    pub const fn agreements(&self) -> AgreementConfig {
        AgreementConfig {
            offer_window_ms: self.agreements.offer_window_ms,
            default_truce_hours: self.agreements.default_truce_hours,
        }
    }

    /// Game-end rules.
    pub const fn season(&self) -> SeasonRules {
        SeasonRules {
            game_type: self.game.game_type,
            victory: self.game.victory,
            season_end: self.game.season_end,
            min_nations: self.game.min_nations,
        }
    }
}

/// World size and per-city scaling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldSettings {
    /// Number of tiles on the map.
    #[serde(default = "default_world_tiles")]
    pub world_tiles: u32,

    /// Population backing one city.
    #[serde(default = "default_population_per_city")]
    pub population_per_city: u64,

    /// Power per city an attacker needs, and a defender's full strength.
    #[serde(default = "default_min_military_power_per_city")]
    pub min_military_power_per_city: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            world_tiles: default_world_tiles(),
            population_per_city: default_population_per_city(),
            min_military_power_per_city: default_min_military_power_per_city(),
        }
    }
}

/// Cooldown durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CooldownSettings {
    /// Shared player cooldown between resource commands.
    #[serde(default = "default_resource_cooldown")]
    pub resource: u64,

    /// Nation attack cooldown.
    #[serde(default = "default_attack_cooldown")]
    pub attack: u64,

    /// Nation spy cooldown.
    #[serde(default = "default_spy_cooldown")]
    pub spy: u64,

    /// Nation sabotage cooldown.
    #[serde(default = "default_sabotage_cooldown")]
    pub sabotage: u64,

    /// Nation hack cooldown.
    #[serde(default = "default_hack_cooldown")]
    pub hack: u64,

    /// Nation envoy cooldown.
    #[serde(default = "default_envoy_cooldown")]
    pub envoy: u64,

    /// Nation token launch cooldown.
    #[serde(default = "default_launch_shitcoin_cooldown")]
    pub launch_shitcoin: u64,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            resource: default_resource_cooldown(),
            attack: default_attack_cooldown(),
            spy: default_spy_cooldown(),
            sabotage: default_sabotage_cooldown(),
            hack: default_hack_cooldown(),
            envoy: default_envoy_cooldown(),
            launch_shitcoin: default_launch_shitcoin_cooldown(),
        }
    }
}

/// Covert action chances (basis points) and alert thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EspionageSettings {
    /// Spy success chance.
    #[serde(default = "default_spy_success_bps")]
    pub spy_success_bps: u32,

    /// Sabotage success chance.
    #[serde(default = "default_sabotage_success_bps")]
    pub sabotage_success_bps: u32,

    /// Hack success chance.
    #[serde(default = "default_hack_success_bps")]
    pub hack_success_bps: u32,

    /// Failed spies before the target is alerted.
    #[serde(default = "default_spy_alert_threshold")]
    pub spy_alert_threshold: u32,

    /// Failed sabotages before the operative is caught.
    #[serde(default = "default_sabotage_alert_threshold")]
    pub sabotage_alert_threshold: u32,

    /// Failed hacks before the target is alerted.
    #[serde(default = "default_hack_alert_threshold")]
    pub hack_alert_threshold: u32,

    /// How long a successful hack disables banks.
    #[serde(default = "default_hack_duration_ms")]
    pub hack_duration_ms: u64,
}

impl Default for EspionageSettings {
    fn default() -> Self {
        Self {
            spy_success_bps: default_spy_success_bps(),
            sabotage_success_bps: default_sabotage_success_bps(),
            hack_success_bps: default_hack_success_bps(),
            spy_alert_threshold: default_spy_alert_threshold(),
            sabotage_alert_threshold: default_sabotage_alert_threshold(),
            hack_alert_threshold: default_hack_alert_threshold(),
            hack_duration_ms: default_hack_duration_ms(),
        }
    }
}

/// Experience granted per action, by track.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExperienceSettings {
    /// Attacks and deployments.
    #[serde(default = "default_military_exp")]
    pub military: u64,

    /// Gathering, construction and token launches.
    #[serde(default = "default_economist_exp")]
    pub economist: u64,

    /// Surveying, settling and exploring.
    #[serde(default = "default_scout_exp")]
    pub scout: u64,

    /// Espionage and envoys.
    #[serde(default = "default_diplomat_exp")]
    pub diplomat: u64,
}

impl Default for ExperienceSettings {
    fn default() -> Self {
        Self {
            military: default_military_exp(),
            economist: default_economist_exp(),
            scout: default_scout_exp(),
            diplomat: default_diplomat_exp(),
        }
    }
}

/// Truce and trade timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgreementSettings {
    /// How long a proposal stays open, in milliseconds.
    #[serde(default = "default_offer_window_ms")]
    pub offer_window_ms: u64,

    /// Truce length when the proposer names none.
    #[serde(default = "default_truce_hours")]
    pub default_truce_hours: u32,
}

impl Default for AgreementSettings {
    fn default() -> Self {
        Self {
            offer_window_ms: default_offer_window_ms(),
            default_truce_hours: default_truce_hours(),
        }
    }
}

/// External prize pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrizePoolSettings {
    /// Transfer a share of the loser's pool when a city falls.
    #[serde(default)]
    pub enabled: bool,

    /// Token moved between pools.
    #[serde(default = "default_ticker")]
    pub ticker: String,
}

impl Default for PrizePoolSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ticker: default_ticker(),
        }
    }
}

/// Game mode and victory conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSettings {
    /// `sandbox` or `seasonal` (alias `conquest`).
    #[serde(default)]
    pub game_type: GameType,

    /// `military` (alias `power`), `cities` or `gold`.
    #[serde(default)]
    pub victory: VictoryType,

    /// RFC 3339 time a seasonal game ends.
    #[serde(default)]
    pub season_end: Option<DateTime<Utc>>,

    /// Nations required before the game can end.
    #[serde(default = "default_min_nations")]
    pub min_nations: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            game_type: GameType::default(),
            victory: VictoryType::default(),
            season_end: None,
            min_nations: default_min_nations(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_world_tiles() -> u32 {
    1000
}

const fn default_population_per_city() -> u64 {
    1000
}

const fn default_min_military_power_per_city() -> u64 {
    100
}

const fn default_resource_cooldown() -> u64 {
    5_000
}

const fn default_attack_cooldown() -> u64 {
    86_400_000
}

const fn default_spy_cooldown() -> u64 {
    14_400_000
}

const fn default_sabotage_cooldown() -> u64 {
    3_600_000
}

const fn default_hack_cooldown() -> u64 {
    14_400_000
}

const fn default_envoy_cooldown() -> u64 {
    900_000
}

const fn default_launch_shitcoin_cooldown() -> u64 {
    14_400_000
}

const fn default_spy_success_bps() -> u32 {
    2500
}

const fn default_sabotage_success_bps() -> u32 {
    2500
}

const fn default_hack_success_bps() -> u32 {
    2000
}

const fn default_spy_alert_threshold() -> u32 {
    4
}

const fn default_sabotage_alert_threshold() -> u32 {
    5
}

const fn default_hack_alert_threshold() -> u32 {
    5
}

const fn default_hack_duration_ms() -> u64 {
    14_400_000
}

const fn default_military_exp() -> u64 {
    10
}

const fn default_economist_exp() -> u64 {
    2
}

const fn default_scout_exp() -> u64 {
    15
}

const fn default_diplomat_exp() -> u64 {
    15
}

const fn default_offer_window_ms() -> u64 {
    14_400_000
}

const fn default_truce_hours() -> u32 {
    24
}

const fn default_min_nations() -> usize {
    2
}

fn default_ticker() -> String {
    String::from("AVAX")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn parse_without_env(yaml: &str) -> GameConfig {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn defaults_match_resolver_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.economy(), EconomyConfig::default());
        assert_eq!(config.cooldowns(), CooldownConfig::default());
        assert_eq!(config.combat(), CombatConfig::default());
        assert_eq!(config.espionage(), EspionageConfig::default());
        assert_eq!(config.agreements(), AgreementConfig::default());
        assert_eq!(config.season(), SeasonRules::default());
        assert!(!config.prize_pool.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(parse_without_env("{}"), GameConfig::default());
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
world:
  world_tiles: 250
  population_per_city: 500

cooldowns:
  attack: 60000

espionage:
  spy_success_bps: 5000

prize_pool:
  enabled: true
  ticker: GOLD
";
        let config = parse_without_env(yaml);
        assert_eq!(config.world.world_tiles, 250);
        assert_eq!(config.world.min_military_power_per_city, 100);
        assert_eq!(config.cooldowns.attack, 60_000);
        assert_eq!(config.cooldowns.spy, 14_400_000);
        assert_eq!(config.espionage().spy_success_bps, 5000);
        assert_eq!(config.combat().population_per_city, 500);
        assert!(config.prize_pool.enabled);
        assert_eq!(config.prize_pool.ticker, "GOLD");
    }

    #[test]
    fn parse_seasonal_game() {
        let yaml = r#"
game:
  game_type: conquest
  victory: cities
  season_end: "2026-12-31T00:00:00Z"
"#;
        let season = parse_without_env(yaml).season();
        assert_eq!(season.game_type, GameType::Seasonal);
        assert_eq!(season.victory, VictoryType::Cities);
        assert_eq!(
            season.season_end.map(|end| end.to_rfc3339()),
            Some(String::from("2026-12-31T00:00:00+00:00"))
        );
        assert_eq!(season.min_nations, 2);
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = GameConfig::parse("world: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_values() {
        let vars = BTreeMap::from([
            ("WORLD_TILES", "42"),
            ("POPULATION_PER_CITY", " 500 "),
            ("ATTACK_COOLDOWN_MS", "1000"),
            ("HACK_DURATION_MS", "60000"),
            ("SPY_COOLDOWN_MS", "soon"),
        ]);
        let mut config = GameConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.world.world_tiles, 42);
        assert_eq!(config.world.population_per_city, 500);
        assert_eq!(config.cooldowns.attack, 1000);
        assert_eq!(config.espionage.hack_duration_ms, 60_000);
        // Unparseable values leave the default in place.
        assert_eq!(config.cooldowns.spy, 14_400_000);
    }

    #[test]
    fn shipped_config_parses() {
        let config = parse_without_env(include_str!("../../../nationstate.yaml"));
        assert_eq!(config.world.world_tiles, 40);
        assert!(config.prize_pool.enabled);
        assert_eq!(config.cooldowns, CooldownSettings::default());
        assert_eq!(config.experience, ExperienceSettings::default());
        assert_eq!(config.game, GameSettings::default());
    }
}
