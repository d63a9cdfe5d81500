//! Season standings and the game-end check.
//!
//! A game ends once a single nation holds every city. Seasonal games also
//! end when the season clock runs out, and the winner is whoever tops the
//! standings for the configured [`VictoryType`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use nationstate_types::{GameType, Nation, NationId, VictoryType};

/// Rules deciding when and how a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRules {
    /// Sandbox or seasonal play (default: sandbox).
    pub game_type: GameType,
    /// Ranking used at season end (default: military).
    pub victory: VictoryType,
    /// When a seasonal game stops; `None` never stops on the clock.
    pub season_end: Option<DateTime<Utc>>,
    /// Nations required before the game can end (default: 2).
    pub min_nations: usize,
}

impl Default for SeasonRules {
    fn default() -> Self {
        Self {
            game_type: GameType::Sandbox,
            victory: VictoryType::Military,
            season_end: None,
            min_nations: 2,
        }
    }
}

/// One nation's place in the standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// The ranked nation.
    pub nation: NationId,
    /// Its display name.
    pub name: String,
    /// Power, city count or gold.
    pub score: u64,
    /// Population under [`VictoryType::Cities`], otherwise zero.
    pub tiebreak: u64,
}

/// Why a game ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEnd {
    /// One nation owns every remaining city.
    LastNationStanding {
        /// The sole city owner.
        winner: NationId,
    },
    /// The season clock ran out.
    SeasonOver {
        /// Ranking that decided the winner.
        victory: VictoryType,
        /// Every nation, best first.
        standings: Vec<Standing>,
    },
}

impl GameEnd {
    /// The winning nation, if any nation was ranked.
    pub fn winner(&self) -> Option<&NationId> {
        match self {
            Self::LastNationStanding { winner } => Some(winner),
            Self::SeasonOver { standings, .. } => standings.first().map(|s| &s.nation),
        }
    }
}

/// Rank nations best first.
///
/// Ties on score (and tiebreak) fall back to nation id order.
pub fn rank(nations: &[&Nation], victory: VictoryType) -> Vec<Standing> {
    let mut standings: Vec<Standing> = nations
        .iter()
        .map(|nation| {
            let (score, tiebreak) = match victory {
                VictoryType::Military => (nation.military.power(), 0),
                VictoryType::Cities => (nation.city_count(), nation.population),
                VictoryType::Gold => (nation.resources.gold, 0),
            };
            Standing {
                nation: nation.id.clone(),
                name: nation.name.clone(),
                score,
                tiebreak,
            }
        })
        .collect();
    standings.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.tiebreak.cmp(&a.tiebreak))
            .then_with(|| a.nation.cmp(&b.nation))
    });
    standings
}

/// Decide whether the game is over.
///
/// `city_owners` is the set of nations holding at least one city tile.
pub fn check_game_end(
    nations: &[&Nation],
    city_owners: &BTreeSet<NationId>,
    rules: &SeasonRules,
    now: DateTime<Utc>,
) -> Option<GameEnd> {
    if nations.len() < rules.min_nations {
        return None;
    }

    if city_owners.len() == 1 {
        let winner = city_owners.first()?.clone();
        debug!(%winner, "last nation standing");
        return Some(GameEnd::LastNationStanding { winner });
    }

    match rules.game_type {
        GameType::Sandbox => None,
        GameType::Seasonal => {
            let end = rules.season_end?;
            if now < end {
                return None;
            }
            debug!(victory = ?rules.victory, "season clock ran out");
            Some(GameEnd::SeasonOver {
                victory: rules.victory,
                standings: rank(nations, rules.victory),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use nationstate_types::BuildingKind;

    use super::*;

    fn make_nation(id: &str, troops: u64, cities: u64, population: u64, gold: u64) -> Nation {
        let mut nation = Nation::new(NationId::new(id), format!("Nation {id}"), None, Utc::now());
        nation.military.troops = troops;
        nation.buildings.insert(BuildingKind::City, cities);
        nation.population = population;
        nation.resources.gold = gold;
        nation
    }

    fn order(standings: &[Standing]) -> Vec<&str> {
        standings.iter().map(|s| s.nation.as_str()).collect()
    }

    fn owners(ids: &[&str]) -> BTreeSet<NationId> {
        ids.iter().map(|id| NationId::new(*id)).collect()
    }

    fn season_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn seasonal(victory: VictoryType) -> SeasonRules {
        SeasonRules {
            game_type: GameType::Seasonal,
            victory,
            season_end: Some(season_end()),
            min_nations: 2,
        }
    }

    // -----------------------------------------------------------------------
    // Ranking
    // -----------------------------------------------------------------------

    #[test]
    fn military_ranks_by_power() {
        let a = make_nation("a", 100, 5, 5000, 900);
        let b = make_nation("b", 300, 1, 100, 0);
        let c = make_nation("c", 200, 2, 100, 0);
        let standings = rank(&[&a, &b, &c], VictoryType::Military);
        assert_eq!(order(&standings), vec!["b", "c", "a"]);
        assert_eq!(standings.first().unwrap().score, 300);
    }

    #[test]
    fn military_tie_falls_back_to_id() {
        let b = make_nation("b", 100, 1, 100, 0);
        let a = make_nation("a", 100, 1, 100, 0);
        let standings = rank(&[&b, &a], VictoryType::Military);
        assert_eq!(order(&standings), vec!["a", "b"]);
    }

    #[test]
    fn cities_rank_by_count_then_population() {
        let a = make_nation("a", 0, 2, 1500, 0);
        let b = make_nation("b", 0, 3, 100, 0);
        let c = make_nation("c", 0, 2, 2500, 0);
        let standings = rank(&[&a, &b, &c], VictoryType::Cities);
        assert_eq!(order(&standings), vec!["b", "c", "a"]);
        let c_standing = standings.get(1).unwrap();
        assert_eq!((c_standing.score, c_standing.tiebreak), (2, 2500));
    }

    #[test]
    fn gold_ranks_by_treasury() {
        let a = make_nation("a", 900, 9, 9000, 10);
        let b = make_nation("b", 0, 1, 100, 500);
        let standings = rank(&[&a, &b], VictoryType::Gold);
        assert_eq!(order(&standings), vec!["b", "a"]);
        assert_eq!(standings.first().unwrap().tiebreak, 0);
    }

    // -----------------------------------------------------------------------
    // Game end
    // -----------------------------------------------------------------------

    #[test]
    fn sole_city_owner_wins_sandbox() {
        let a = make_nation("a", 10, 2, 2000, 0);
        let b = make_nation("b", 0, 0, 0, 0);
        let end = check_game_end(&[&a, &b], &owners(&["a"]), &SeasonRules::default(), season_end());
        assert_eq!(
            end,
            Some(GameEnd::LastNationStanding {
                winner: NationId::new("a")
            })
        );
    }

    #[test]
    fn sandbox_never_ends_on_the_clock() {
        let a = make_nation("a", 10, 1, 1000, 0);
        let b = make_nation("b", 20, 1, 1000, 0);
        let rules = SeasonRules {
            season_end: Some(season_end()),
            ..SeasonRules::default()
        };
        let later = season_end() + Duration::days(30);
        assert_eq!(check_game_end(&[&a, &b], &owners(&["a", "b"]), &rules, later), None);
    }

    #[test]
    fn too_few_nations_never_end() {
        let a = make_nation("a", 10, 1, 1000, 0);
        assert_eq!(
            check_game_end(&[&a], &owners(&["a"]), &SeasonRules::default(), season_end()),
            None
        );
    }

    #[test]
    fn season_ends_at_the_deadline() {
        let a = make_nation("a", 10, 1, 1000, 0);
        let b = make_nation("b", 20, 1, 1000, 0);
        let rules = seasonal(VictoryType::Military);
        let before = season_end() - Duration::seconds(1);
        assert_eq!(check_game_end(&[&a, &b], &owners(&["a", "b"]), &rules, before), None);

        let end = check_game_end(&[&a, &b], &owners(&["a", "b"]), &rules, season_end()).unwrap();
        assert_eq!(end.winner(), Some(&NationId::new("b")));
        assert!(matches!(
            &end,
            GameEnd::SeasonOver {
                victory: VictoryType::Military,
                standings,
            } if order(standings) == vec!["b", "a"]
        ));
    }

    #[test]
    fn season_without_deadline_runs_on() {
        let a = make_nation("a", 10, 1, 1000, 0);
        let b = make_nation("b", 20, 1, 1000, 0);
        let rules = SeasonRules {
            season_end: None,
            ..seasonal(VictoryType::Gold)
        };
        let far = season_end() + Duration::days(365);
        assert_eq!(check_game_end(&[&a, &b], &owners(&["a", "b"]), &rules, far), None);
    }
}
