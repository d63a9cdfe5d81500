//! Tunable parameters for economy and progression rules.
//!
//! The engine builds an [`EconomyConfig`] from its YAML configuration and
//! passes it into the resolvers that need world-scale constants.

use nationstate_types::SkillTrack;

/// Experience granted per action, by skill track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpGrants {
    /// Attacks and deployments (default: 10).
    pub military: u64,
    /// Gathering, building and selling (default: 2).
    pub economist: u64,
    /// Exploring, surveying and settling (default: 15).
    pub scout: u64,
    /// Espionage and envoys (default: 15).
    pub diplomat: u64,
}

impl ExpGrants {
    /// Grant for one track.
    pub const fn for_track(&self, track: SkillTrack) -> u64 {
        match track {
            SkillTrack::Military => self.military,
            SkillTrack::Economist => self.economist,
            SkillTrack::Scout => self.scout,
            SkillTrack::Diplomat => self.diplomat,
        }
    }
}

impl Default for ExpGrants {
    fn default() -> Self {
        Self {
            military: 10,
            economist: 2,
            scout: 15,
            diplomat: 15,
        }
    }
}

/// Parameters shared by economic resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EconomyConfig {
    /// Number of tiles in the world (default: 1000).
    pub world_tiles: u32,
    /// Population each city supports (default: 1000).
    pub population_per_city: u64,
    /// Experience grants per track.
    pub exp: ExpGrants,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            world_tiles: 1000,
            population_per_city: 1000,
            exp: ExpGrants::default(),
        }
    }
}
