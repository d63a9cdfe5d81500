//! Time-boxed gates between nations.
//!
//! Cooldowns throttle repeatable actions per player and per nation. Truces
//! and trades are bilateral agreements that move through explicit states,
//! with the answering side enforced at every step.
//!
//! # Modules
//!
//! - [`cooldown`] -- Player and nation cooldown checks
//! - [`truce`] -- Truce proposals, answers and active windows
//! - [`trade`] -- Trade proposals, counter-offers and exchanges
//! - [`config`] -- Cooldown durations and offer windows
//! - [`error`] -- Error types

pub mod config;
pub mod cooldown;
pub mod error;
pub mod trade;
pub mod truce;

pub use config::{AgreementConfig, CooldownConfig};
pub use error::DiplomacyError;
pub use trade::{TradeBook, TradeResolution};
pub use truce::{TruceBook, TruceResolution};
