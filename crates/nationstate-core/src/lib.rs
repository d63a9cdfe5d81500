//! World store, command engine and configuration for the nationstate engine.
//!
//! This crate ties the resolver crates together. It loads the game
//! configuration, keeps every document in memory, runs each player command
//! as one serialized unit against that store, and reports what happened as
//! [`WorldEvent`]s.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `nationstate.yaml` into
//!   strongly-typed structs.
//! - [`world`] -- [`GameWorld`], the in-memory document store.
//! - [`engine`] -- [`Engine`], the serialized command runner.
//! - [`events`] -- [`WorldEvent`] and its channel.
//! - [`prize_pool`] -- [`PrizePool`] port and the city-fall transfer.
//! - [`error`] -- Error types.
//!
//! [`WorldEvent`]: events::WorldEvent
//! [`GameWorld`]: world::GameWorld
//! [`Engine`]: engine::Engine
//! [`PrizePool`]: prize_pool::PrizePool

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod prize_pool;
pub mod world;

pub use config::GameConfig;
pub use engine::{AttackSummary, Engine};
pub use error::EngineError;
pub use events::WorldEvent;
pub use prize_pool::{LedgerPool, NoPrizePool, PrizePool};
pub use world::GameWorld;
