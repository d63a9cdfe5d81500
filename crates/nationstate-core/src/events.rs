//! World events produced by committed commands.
//!
//! The engine pushes a [`WorldEvent`] onto an unbounded channel after each
//! successful commit. Whoever holds the receiver decides how to deliver
//! them. Events are never sent for a command that failed.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use nationstate_economy::experience::LeadershipChange;
use nationstate_types::{
    CovertAction, Military, NationId, PlayerId, SkillTrack, TileId, TradeId, TradeStatus, TruceId,
    TruceStatus,
};

/// Sending half of the world event channel.
pub type EventSender = mpsc::UnboundedSender<WorldEvent>;

/// Receiving half of the world event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<WorldEvent>;

/// Something other nations or players should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    /// A new nation took its capital.
    NationFounded {
        /// The new nation.
        nation: NationId,
        /// Its capital tile.
        capital: TileId,
    },

    /// A player enlisted in a nation.
    PlayerJoined {
        /// The player.
        player: PlayerId,
        /// The nation joined.
        nation: NationId,
    },

    /// A player left a nation.
    PlayerLeft {
        /// The player.
        player: PlayerId,
        /// The nation left.
        nation: NationId,
        /// Whether the nation exiled them.
        exiled: bool,
    },

    /// A player's title changed on one track.
    RankUp {
        /// The player.
        player: PlayerId,
        /// The track.
        track: SkillTrack,
        /// New title.
        title: &'static str,
    },

    /// A minister slot changed holder.
    LeadershipChanged {
        /// The nation whose slot changed.
        nation: NationId,
        /// What changed.
        change: LeadershipChange,
    },

    /// A city was attacked.
    Attacked {
        /// The attacking nation.
        attacker: NationId,
        /// The defending nation.
        defender: NationId,
        /// The targeted city's tile.
        tile: TileId,
        /// Units the defender lost.
        defender_losses: Military,
        /// The defender's weaker of morale and power, 0..=100.
        defense_percent: u64,
    },

    /// A city changed from standing to ruined.
    CityFallen {
        /// The attacking nation.
        attacker: NationId,
        /// The nation that lost it.
        defender: NationId,
        /// Where it stood.
        tile: TileId,
        /// Its name.
        city_name: String,
    },

    /// Repeated covert failures alerted the target.
    EspionageAlert {
        /// The nation whose operatives failed.
        spying: NationId,
        /// The alerted nation.
        target: NationId,
        /// The action that failed.
        action: CovertAction,
        /// The operative was caught (sabotage).
        caught: bool,
    },

    /// Exploring revealed a rival city.
    CityDiscovered {
        /// The exploring nation.
        discoverer: NationId,
        /// The city's owner.
        owner: NationId,
        /// Where it stands.
        tile: TileId,
    },

    /// A city was founded on surveyed land.
    CitySettled {
        /// The settling nation.
        nation: NationId,
        /// Where it was founded.
        tile: TileId,
        /// City name.
        city_name: String,
        /// Other nations that had surveyed the tile.
        observers: Vec<NationId>,
    },

    /// An envoy was dispatched.
    EnvoySent {
        /// The sending nation.
        from: NationId,
        /// The receiving nation.
        to: NationId,
        /// The dispatching player.
        player: PlayerId,
        /// The text the envoy delivers.
        message: String,
    },

    /// A truce was offered.
    TruceProposed {
        /// The record.
        truce: TruceId,
        /// The proposing nation.
        requester: NationId,
        /// The nation asked.
        target: NationId,
    },

    /// A truce left the pending state.
    TruceResolved {
        /// The record.
        truce: TruceId,
        /// Its new status.
        status: TruceStatus,
        /// End of the window when accepted.
        ends_at: Option<DateTime<Utc>>,
    },

    /// A trade was offered.
    TradeProposed {
        /// The record.
        trade: TradeId,
        /// The proposing nation.
        requester: NationId,
        /// The nation asked.
        target: NationId,
    },

    /// A trade changed state after an answer or counter-offer.
    TradeResolved {
        /// The record.
        trade: TradeId,
        /// Its new status.
        status: TradeStatus,
    },

    /// A nation launched a token.
    TokenLaunched {
        /// The launching nation.
        nation: NationId,
        /// Gold received, zero on a flop.
        payout: u64,
    },

    /// The game is over.
    SeasonEnded {
        /// The winning nation, if any nation was ranked.
        winner: Option<NationId>,
    },
}

/// Create the world event channel.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
