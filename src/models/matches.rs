//! Match and break entries of a group's match list, plus per-side data.

use crate::logic::result::MatchResult;
use serde::{Deserialize, Serialize};

/// One entry in a group's ordered match list: a playable match or a scheduled break.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MatchEntry {
    Match(GroupMatch),
    Break(GroupBreak),
}

impl MatchEntry {
    pub fn as_match(&self) -> Option<&GroupMatch> {
        match self {
            MatchEntry::Match(m) => Some(m),
            MatchEntry::Break(_) => None,
        }
    }

    pub fn as_match_mut(&mut self) -> Option<&mut GroupMatch> {
        match self {
            MatchEntry::Match(m) => Some(m),
            MatchEntry::Break(_) => None,
        }
    }
}

/// A real, scoreable match between two sides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMatch {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Explicit completeness flag from the document. Distinct from the
    /// computed result: see [`GroupMatch::is_complete`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    pub home_team: MatchTeam,
    pub away_team: MatchTeam,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub officials: Option<Officials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Manager>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Computed during load; never serialized.
    #[serde(skip)]
    pub result: Option<MatchResult>,
}

impl GroupMatch {
    /// Calculated completion (not the raw document flag).
    pub fn is_complete(&self) -> bool {
        self.result.as_ref().map_or(false, |r| r.complete)
    }

    pub fn is_draw(&self) -> bool {
        self.result.as_ref().map_or(false, |r| r.draw)
    }

    /// The officiating team reference, when officials are a team.
    pub fn officiating_team_ref(&self) -> Option<&str> {
        self.officials.as_ref().and_then(Officials::team_ref)
    }
}

/// One side of a match: a team reference plus its scores and extras.
/// Optional fields keep their document presence: an explicitly written
/// default (empty scores, `"forfeit": false`) serializes back as written.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    /// A literal team ID or a team-reference expression.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forfeit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mvp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<String>>,
}

impl MatchTeam {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scores: None,
            forfeit: None,
            bonus_points: None,
            penalty_points: None,
            mvp: None,
            notes: None,
            players: None,
        }
    }

    pub fn scores(&self) -> &[u32] {
        self.scores.as_deref().unwrap_or_default()
    }

    pub fn is_forfeit(&self) -> bool {
        self.forfeit.unwrap_or(false)
    }

    pub fn bonus_points(&self) -> i64 {
        self.bonus_points.unwrap_or(0)
    }

    pub fn penalty_points(&self) -> i64 {
        self.penalty_points.unwrap_or(0)
    }
}

/// How a score update treats the explicit completeness flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompleteFlag {
    /// Leave whatever the document has.
    Keep,
    /// Set the flag explicitly.
    Set(bool),
    /// Remove the flag so completion is derived again (sets matches).
    Clear,
}

/// Match officials: either a whole team officiates, or named people per role.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Officials {
    Team { team: String },
    Named(NamedOfficials),
}

impl Officials {
    pub fn team_ref(&self) -> Option<&str> {
        match self {
            Officials::Team { team } => Some(team),
            Officials::Named(_) => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedOfficials {
    pub first: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_challenge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_scorer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linespersons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_crew: Option<Vec<String>>,
}

/// Courtside manager: a team reference or a named person.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Manager {
    Team { team: String },
    Name(String),
}

impl Manager {
    pub fn team_ref(&self) -> Option<&str> {
        match self {
            Manager::Team { team } => Some(team),
            Manager::Name(_) => None,
        }
    }
}

/// A non-match entry in the match list: used for schedule output only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBreak {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
