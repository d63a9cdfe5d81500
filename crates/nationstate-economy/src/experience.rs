//! Experience grants and minister contests.
//!
//! Every completed action grants experience on one skill track. The grant
//! may move the player into a new rank on that track, and may win the
//! track's minister slot: the slot belongs to whichever player has shown
//! the most track experience, re-contested on every grant.
//!
//! # Slot rules
//!
//! | Slot state                 | Effect of a grant                    |
//! |----------------------------|--------------------------------------|
//! | unclaimed                  | acting player claims it              |
//! | held by the acting player  | stored experience is refreshed       |
//! | held by someone else       | replaced if acting exp is now higher |

use tracing::info;

use nationstate_types::{Minister, Nation, Player, PlayerId, SkillTrack};

use crate::error::EconomyError;
use crate::tiers::{tier_table, tier_title};

/// A change of rank title on one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankUp {
    /// The track.
    pub track: SkillTrack,
    /// Previous title.
    pub from: &'static str,
    /// New title.
    pub to: &'static str,
}

/// A change of minister slot holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadershipChange {
    /// The slot was empty and is now held.
    Claimed {
        /// The track whose slot was claimed.
        track: SkillTrack,
        /// The new holder.
        player: PlayerId,
    },
    /// The slot passed from one player to another.
    Replaced {
        /// The track whose slot changed hands.
        track: SkillTrack,
        /// The new holder.
        player: PlayerId,
        /// The previous holder.
        previous: PlayerId,
    },
}

/// Everything a grant changed beyond the raw experience.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpGrant {
    /// Set when the grant crossed a rank threshold.
    pub rank_up: Option<RankUp>,
    /// Set when the minister slot changed holder.
    pub leadership: Option<LeadershipChange>,
}

/// Grant `amount` experience on `track` and re-contest the track's slot.
pub fn grant_exp(
    player: &mut Player,
    track: SkillTrack,
    amount: u64,
    nation: &mut Nation,
) -> Result<ExpGrant, EconomyError> {
    let tiers = tier_table(track);
    let before = player.exp.get(track);
    let after = before
        .checked_add(amount)
        .ok_or_else(|| EconomyError::overflow("player experience"))?;
    *player.exp.get_mut(track) = after;

    let from = tier_title(before, tiers);
    let to = tier_title(after, tiers);
    let rank_up = (from != to).then_some(RankUp { track, from, to });
    if rank_up.is_some() {
        info!(player = %player.id, ?track, from, to, "rank up");
    }

    let leadership = contest_slot(nation, &player.id, track, after);
    if let Some(change) = &leadership {
        info!(nation = %nation.id, ?change, "leadership changed");
    }

    Ok(ExpGrant {
        rank_up,
        leadership,
    })
}

/// Apply the slot rules for one player's new track experience.
fn contest_slot(
    nation: &mut Nation,
    player: &PlayerId,
    track: SkillTrack,
    exp: u64,
) -> Option<LeadershipChange> {
    let slot = nation.leadership.slot_mut(track);
    if let Some(holder) = slot.as_mut() {
        if &holder.player == player {
            holder.exp = exp;
            return None;
        }
        if exp <= holder.exp {
            return None;
        }
        let previous = core::mem::replace(&mut holder.player, player.clone());
        holder.exp = exp;
        return Some(LeadershipChange::Replaced {
            track,
            player: player.clone(),
            previous,
        });
    }

    *slot = Some(Minister {
        player: player.clone(),
        exp,
    });
    Some(LeadershipChange::Claimed {
        track,
        player: player.clone(),
    })
}
