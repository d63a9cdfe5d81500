//! Economic and progression rules for the nationstate engine.
//!
//! Every function here operates on in-memory entities from
//! `nationstate-types` and either mutates them in place or returns a typed
//! error without touching them. Persistence, permissions and message
//! formatting belong to the caller.
//!
//! # Modules
//!
//! - [`tiers`] -- Experience thresholds and rank titles per skill track
//! - [`tables`] -- Building, research, deployment and market constants
//! - [`traits`] -- Founding trait bonuses
//! - [`yields`] -- Yield calculator and trait/boost multipliers
//! - [`gathering`] -- Farm, mine and drill
//! - [`construction`] -- Building and research purchases
//! - [`deployment`] -- Unit deployment
//! - [`market`] -- Selling resources for gold
//! - [`boosts`] -- Paid yield multiplier windows
//! - [`territory`] -- Founding, surveying, settling and exploring
//! - [`ventures`] -- Token launches
//! - [`experience`] -- Experience grants and minister contests
//! - [`config`] -- Tunable economy parameters
//! - [`error`] -- Error types

pub mod boosts;
pub mod config;
pub mod construction;
pub mod deployment;
pub mod error;
pub mod experience;
pub mod gathering;
pub mod market;
pub mod tables;
pub mod territory;
pub mod tiers;
pub mod traits;
pub mod ventures;
pub mod yields;

pub use config::{EconomyConfig, ExpGrants};
pub use error::EconomyError;
