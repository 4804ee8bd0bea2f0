//! Group variants (league / crossover / knockout) and their configuration.

use crate::error::CompetitionError;
use crate::logic::standings::StandingsTable;
use crate::models::matches::{GroupMatch, MatchEntry};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// How a single match is scored in this group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// One running score per side.
    Continuous,
    /// An array of set scores per side.
    Sets,
}

/// Which kind of group this is (for display and serialization hints).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroupType {
    League,
    Crossover,
    Knockout,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::League => write!(f, "league"),
            GroupType::Crossover => write!(f, "crossover"),
            GroupType::Knockout => write!(f, "knockout"),
        }
    }
}

/// A scoring unit within a stage. Closed union: exactly these three kinds exist.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Group {
    League(League),
    Crossover(Crossover),
    Knockout(Knockout),
}

/// Round-robin group with a computed standings table.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<SetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draws_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<LeagueConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchEntry>>,
    /// Computed during load; never serialized.
    #[serde(skip)]
    pub table: Option<StandingsTable>,
    #[serde(skip)]
    pub(crate) caches: GroupCaches,
}

/// One-off pairing round between groups; no table, no draws.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crossover {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<SetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchEntry>>,
    #[serde(skip)]
    pub(crate) caches: GroupCaches,
}

/// Elimination round; optionally carries display-only final standing labels.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knockout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<SetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockout: Option<KnockoutConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchEntry>>,
    #[serde(skip)]
    pub(crate) caches: GroupCaches,
}

impl Group {
    pub fn id(&self) -> &str {
        match self {
            Group::League(g) => &g.id,
            Group::Crossover(g) => &g.id,
            Group::Knockout(g) => &g.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Group::League(g) => g.name.as_deref(),
            Group::Crossover(g) => g.name.as_deref(),
            Group::Knockout(g) => g.name.as_deref(),
        }
    }

    pub fn group_type(&self) -> GroupType {
        match self {
            Group::League(_) => GroupType::League,
            Group::Crossover(_) => GroupType::Crossover,
            Group::Knockout(_) => GroupType::Knockout,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            Group::League(g) => g.match_type,
            Group::Crossover(g) => g.match_type,
            Group::Knockout(g) => g.match_type,
        }
    }

    /// The group's set-scoring parameters (defaults where the document is silent).
    pub fn sets_config(&self) -> SetConfig {
        let sets = match self {
            Group::League(g) => &g.sets,
            Group::Crossover(g) => &g.sets,
            Group::Knockout(g) => &g.sets,
        };
        sets.clone().unwrap_or_default()
    }

    /// Draws are configurable for leagues only; never allowed elsewhere.
    pub fn draws_allowed(&self) -> bool {
        match self {
            Group::League(g) => g.draws_allowed.unwrap_or(false),
            Group::Crossover(_) | Group::Knockout(_) => false,
        }
    }

    pub fn matches(&self) -> &[MatchEntry] {
        let matches = match self {
            Group::League(g) => &g.matches,
            Group::Crossover(g) => &g.matches,
            Group::Knockout(g) => &g.matches,
        };
        matches.as_deref().unwrap_or_default()
    }

    pub fn matches_mut(&mut self) -> &mut [MatchEntry] {
        let matches = match self {
            Group::League(g) => &mut g.matches,
            Group::Crossover(g) => &mut g.matches,
            Group::Knockout(g) => &mut g.matches,
        };
        matches.as_deref_mut().unwrap_or(&mut [])
    }

    /// The computed standings table; `Some` for every loaded league group.
    pub fn standings(&self) -> Option<&StandingsTable> {
        match self {
            Group::League(g) => g.table.as_ref(),
            Group::Crossover(_) | Group::Knockout(_) => None,
        }
    }

    /// A group is complete when every real match in it is complete.
    pub fn is_complete(&self) -> bool {
        self.matches()
            .iter()
            .filter_map(MatchEntry::as_match)
            .all(GroupMatch::is_complete)
    }

    pub fn group_match(&self, match_id: &str) -> Result<&GroupMatch, CompetitionError> {
        self.matches()
            .iter()
            .filter_map(MatchEntry::as_match)
            .find(|m| m.id == match_id)
            .ok_or(CompetitionError::NotFound {
                kind: "match",
                id: match_id.to_string(),
            })
    }

    pub fn group_match_mut(&mut self, match_id: &str) -> Result<&mut GroupMatch, CompetitionError> {
        self.matches_mut()
            .iter_mut()
            .filter_map(MatchEntry::as_match_mut)
            .find(|m| m.id == match_id)
            .ok_or(CompetitionError::NotFound {
                kind: "match",
                id: match_id.to_string(),
            })
    }

    pub(crate) fn caches(&self) -> &GroupCaches {
        match self {
            Group::League(g) => &g.caches,
            Group::Crossover(g) => &g.caches,
            Group::Knockout(g) => &g.caches,
        }
    }
}

/// Set-scoring parameters for a group. All fields optional in the document;
/// getters supply standard volleyball defaults.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_to_win: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_to_win: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_set_points_to_win: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_set_max_points: Option<u32>,
}

impl SetConfig {
    pub fn max_sets(&self) -> u32 {
        self.max_sets.unwrap_or(5)
    }

    pub fn sets_to_win(&self) -> u32 {
        self.sets_to_win.unwrap_or(3)
    }

    pub fn clear_points(&self) -> u32 {
        self.clear_points.unwrap_or(2)
    }

    pub fn min_points(&self) -> u32 {
        self.min_points.unwrap_or(1)
    }

    pub fn points_to_win(&self) -> u32 {
        self.points_to_win.unwrap_or(25)
    }

    pub fn last_set_points_to_win(&self) -> u32 {
        self.last_set_points_to_win.unwrap_or(15)
    }

    pub fn max_points(&self) -> u32 {
        self.max_points.unwrap_or(1000)
    }

    pub fn last_set_max_points(&self) -> u32 {
        self.last_set_max_points.unwrap_or(1000)
    }
}

/// Ordering and points configuration for a league group.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<Vec<OrderingCriterion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<LeaguePoints>,
}

impl LeagueConfig {
    /// The tie-break criteria, left to right. League points then points
    /// difference when the document does not say.
    pub fn criteria(&self) -> Vec<OrderingCriterion> {
        match self.ordering.as_deref() {
            Some(ordering) if !ordering.is_empty() => ordering.to_vec(),
            _ => vec![
                OrderingCriterion::LeaguePoints,
                OrderingCriterion::PointsDifference,
            ],
        }
    }
}

/// One standings tie-break criterion, in document notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderingCriterion {
    #[serde(rename = "PTS")]
    LeaguePoints,
    #[serde(rename = "WINS")]
    Wins,
    #[serde(rename = "LOSSES")]
    Losses,
    #[serde(rename = "H2H")]
    HeadToHead,
    #[serde(rename = "PF")]
    PointsFor,
    #[serde(rename = "PA")]
    PointsAgainst,
    #[serde(rename = "PD")]
    PointsDifference,
    #[serde(rename = "SF")]
    SetsFor,
    #[serde(rename = "SA")]
    SetsAgainst,
    #[serde(rename = "SD")]
    SetsDifference,
}

/// League points awarded per match. Defaults follow the common volleyball
/// scheme: 3 for a win, 2/1 split when the set margin is one.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaguePoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_set: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_by_one: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lose: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lose_by_one: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forfeit: Option<i64>,
}

impl LeaguePoints {
    pub fn played(&self) -> i64 {
        self.played.unwrap_or(0)
    }

    pub fn per_set(&self) -> i64 {
        self.per_set.unwrap_or(0)
    }

    pub fn win(&self) -> i64 {
        self.win.unwrap_or(3)
    }

    pub fn win_by_one(&self) -> i64 {
        self.win_by_one.unwrap_or(2)
    }

    pub fn lose(&self) -> i64 {
        self.lose.unwrap_or(0)
    }

    pub fn lose_by_one(&self) -> i64 {
        self.lose_by_one.unwrap_or(1)
    }

    pub fn forfeit(&self) -> i64 {
        self.forfeit.unwrap_or(0)
    }
}

/// Display-only final placement labels for a knockout group.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KnockoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standing: Option<Vec<StandingLabel>>,
}

/// Position label mapped to a team reference (not computed, only displayed).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandingLabel {
    pub position: String,
    pub id: String,
}

/// Memoized query state: computed on first use, valid for the load's lifetime.
#[derive(Debug, Default)]
pub(crate) struct GroupCaches {
    pub has_matches: RefCell<HashMap<String, bool>>,
    pub has_officiating: RefCell<HashMap<String, bool>>,
    pub may_have_matches: RefCell<HashMap<String, bool>>,
}

impl Clone for GroupCaches {
    // Caches never travel with a clone; the clone is rebuilt and re-queried.
    fn clone(&self) -> Self {
        GroupCaches::default()
    }
}
