//! Data structures for a competition document: teams, stages, groups, matches.

pub mod competition;
pub mod group;
pub mod matches;
pub mod stage;
pub mod team;

pub use competition::{Competition, SUPPORTED_VERSION};
pub use group::{
    Group, GroupType, KnockoutConfig, League, LeagueConfig, LeaguePoints, MatchType,
    OrderingCriterion, SetConfig, StandingLabel,
};
pub use matches::{
    CompleteFlag, GroupBreak, GroupMatch, Manager, MatchEntry, MatchTeam, NamedOfficials,
    Officials,
};
pub use stage::{IfUnknown, Stage};
pub use team::{validate_team_id, validate_team_name, Team, UNKNOWN_TEAM_ID};
