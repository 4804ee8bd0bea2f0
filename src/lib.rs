//! Volleyball competition manager: document model, standings, and team
//! references. Load a JSON competition document, query teams, groups, match
//! results and league tables, update scores, and write the document back.

pub mod error;
pub mod logic;
pub mod models;
pub mod schema;

pub use error::CompetitionError;
pub use logic::{
    parse_team_ref, GroupRef, MatchResult, Outcome, RefEntity, RefTable, Side, StandingsEntry,
    StandingsTable, TeamRef, TEAMS_ALL, TEAMS_FIXED_ID, TEAMS_KNOWN, TEAMS_MAYBE,
    TEAMS_OFFICIATING, TEAMS_PLAYING,
};
pub use models::{
    CompleteFlag, Competition, Group, GroupBreak, GroupMatch, GroupType, IfUnknown,
    KnockoutConfig, League, LeagueConfig, LeaguePoints, Manager, MatchEntry, MatchTeam, MatchType,
    NamedOfficials, Officials, OrderingCriterion, SetConfig, Stage, StandingLabel, Team,
    SUPPORTED_VERSION, UNKNOWN_TEAM_ID,
};
