//! Team entity and team-ID validation.

use crate::error::CompetitionError;
use serde::{Deserialize, Serialize};

/// ID of the sentinel team every competition carries for unresolved references.
pub const UNKNOWN_TEAM_ID: &str = "UNKNOWN";

/// A competing team. Identity (`id`) is immutable once created; the name is not.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            notes: None,
        }
    }

    /// The sentinel team unresolved references resolve to.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_TEAM_ID, UNKNOWN_TEAM_ID)
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_TEAM_ID
    }
}

/// Characters reserved by the team-reference grammar; never valid in a team ID.
const RESERVED: &[char] = &['"', ':', '{', '}', '?', '='];

/// Check the charset/length rules for a team ID: 1-100 printable ASCII
/// characters, excluding the reference-grammar characters.
pub fn validate_team_id(id: &str) -> Result<(), CompetitionError> {
    if id.is_empty() || id.len() > 100 {
        return Err(CompetitionError::InvalidId {
            kind: "team",
            id: id.to_string(),
            reason: "must be between 1 and 100 characters".to_string(),
        });
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(' '..='~').contains(c) || RESERVED.contains(c))
    {
        return Err(CompetitionError::InvalidId {
            kind: "team",
            id: id.to_string(),
            reason: format!("character {:?} is not allowed", c),
        });
    }
    Ok(())
}

/// Check the length rule for a team name: 1-1000 characters.
pub fn validate_team_name(id: &str, name: &str) -> Result<(), CompetitionError> {
    if name.is_empty() || name.chars().count() > 1000 {
        return Err(CompetitionError::InvalidId {
            kind: "team",
            id: id.to_string(),
            reason: "name must be between 1 and 1000 characters".to_string(),
        });
    }
    Ok(())
}
