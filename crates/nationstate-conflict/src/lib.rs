//! Conflict resolution between nations.
//!
//! Attacks and covert actions take the nations, tile and intel records they
//! touch as mutable references. Preconditions are checked before anything
//! is rolled or written, so an error always leaves every entity untouched.
//!
//! # Modules
//!
//! - [`targeting`] -- Shared tile and ownership checks
//! - [`losses`] -- Expensive-first military loss allocation
//! - [`combat`] -- Attack resolution, collateral damage and city falls
//! - [`espionage`] -- Spy, sabotage and hack attempts
//! - [`victory`] -- Season standings and the game-end check
//! - [`config`] -- Combat and espionage parameters
//! - [`error`] -- Error types

pub mod combat;
pub mod config;
pub mod error;
pub mod espionage;
pub mod losses;
pub mod targeting;
pub mod victory;

pub use combat::{AttackReport, Battlefield, CombatOutcome, resolve_attack};
pub use config::{CombatConfig, EspionageConfig};
pub use error::ConflictError;
pub use espionage::{EspionageOutcome, attempt};
pub use victory::{GameEnd, SeasonRules, Standing, check_game_end, rank};
