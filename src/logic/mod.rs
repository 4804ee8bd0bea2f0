//! Behaviour over the document model: reference resolution, match results,
//! league standings, and team-reachability queries.

pub mod queries;
pub mod refs;
pub mod result;
pub mod standings;

pub use queries::{
    TEAMS_ALL, TEAMS_FIXED_ID, TEAMS_KNOWN, TEAMS_MAYBE, TEAMS_OFFICIATING, TEAMS_PLAYING,
};
pub use refs::{parse_team_ref, validate_team_ref, GroupRef, Outcome, RefEntity, RefTable, TeamRef};
pub use result::{MatchResult, Side};
pub use standings::{StandingsEntry, StandingsTable};
