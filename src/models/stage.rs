//! Stage: an ordered phase of the competition owning its groups.

use crate::error::CompetitionError;
use crate::models::group::Group;
use crate::models::matches::MatchEntry;
use serde::{Deserialize, Serialize};

/// An ordered phase of a competition (e.g. pools, then knockout).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_unknown: Option<IfUnknown>,
}

impl Stage {
    pub fn groups(&self) -> &[Group] {
        self.groups.as_deref().unwrap_or_default()
    }

    pub fn group(&self, group_id: &str) -> Result<&Group, CompetitionError> {
        self.groups()
            .iter()
            .find(|g| g.id() == group_id)
            .ok_or(CompetitionError::NotFound {
                kind: "group",
                id: group_id.to_string(),
            })
    }

    pub fn group_mut(&mut self, group_id: &str) -> Result<&mut Group, CompetitionError> {
        self.groups
            .iter_mut()
            .flatten()
            .find(|g| g.id() == group_id)
            .ok_or(CompetitionError::NotFound {
                kind: "group",
                id: group_id.to_string(),
            })
    }

    /// A stage is complete when all its groups are. The `ifUnknown` block
    /// describes a hypothetical round and never counts.
    pub fn is_complete(&self) -> bool {
        self.groups().iter().all(Group::is_complete)
    }
}

/// Placeholder for matches whose participants cannot be expressed yet.
/// Its entries are inert: never scored, never complete.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfUnknown {
    pub description: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchEntry>>,
}
