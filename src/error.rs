//! Crate-wide error type covering document, structural, score, and lookup failures.

use std::fmt;

/// Errors that can occur while loading, validating, or querying a competition.
#[derive(Debug)]
pub enum CompetitionError {
    /// The document cannot be loaded: malformed JSON, schema violations, or
    /// aggregated structural/reference failures collected during the load pass.
    Document {
        message: String,
        errors: Vec<String>,
    },
    /// The document declares a version this implementation does not support.
    UnsupportedVersion(String),
    /// Two entities of the same kind share an ID.
    DuplicateId { kind: &'static str, id: String },
    /// An ID violates the charset or length rules.
    InvalidId {
        kind: &'static str,
        id: String,
        reason: String,
    },
    /// A team appears as a playing participant in two groups of one stage.
    TeamInMultipleGroups { team_id: String, stage_id: String },
    /// A team reference failed structural validation.
    InvalidTeamReference { reference: String, reason: String },
    /// A reference key is already bound to a different team.
    ReferenceConflict {
        key: String,
        bound: String,
        attempted: String,
    },
    /// Score arrays have the wrong shape for the match's scoring mode.
    ScoreShape { match_path: String, reason: String },
    /// A set's scores violate the set-scoring rules (1-based set index).
    InvalidSetScores {
        match_path: String,
        set: usize,
        reason: String,
    },
    /// The match ended level but the group does not allow draws.
    DrawNotAllowed { match_path: String },
    /// The match requires an explicit completeness flag and none is set.
    CompleteFlagMissing {
        match_path: String,
        reason: &'static str,
    },
    /// Winner or loser was asked of a match that has neither.
    NoWinner {
        match_path: String,
        reason: &'static str,
    },
    /// Direct lookup of an entity that does not exist.
    NotFound { kind: &'static str, id: String },
    /// A nested validation failure wrapped with the field/match it came from.
    Context {
        context: String,
        source: Box<CompetitionError>,
    },
    /// JSON (de)serialization failure.
    Json(serde_json::Error),
    /// File read/write failure.
    Io(std::io::Error),
}

impl CompetitionError {
    /// Wrap this error with the field/match it was detected in.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CompetitionError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl fmt::Display for CompetitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetitionError::Document { message, errors } => {
                write!(f, "{}", message)?;
                for e in errors {
                    write!(f, "\n  - {}", e)?;
                }
                Ok(())
            }
            CompetitionError::UnsupportedVersion(v) => {
                write!(f, "Unsupported document version \"{}\" (expected \"1.0.0\")", v)
            }
            CompetitionError::DuplicateId { kind, id } => {
                write!(f, "Duplicate {} ID \"{}\"", kind, id)
            }
            CompetitionError::InvalidId { kind, id, reason } => {
                write!(f, "Invalid {} ID \"{}\": {}", kind, id, reason)
            }
            CompetitionError::TeamInMultipleGroups { team_id, stage_id } => {
                write!(
                    f,
                    "Team \"{}\" plays in two groups of stage \"{}\"",
                    team_id, stage_id
                )
            }
            CompetitionError::InvalidTeamReference { reference, reason } => {
                write!(f, "Invalid team reference \"{}\": {}", reference, reason)
            }
            CompetitionError::ReferenceConflict {
                key,
                bound,
                attempted,
            } => {
                write!(
                    f,
                    "Reference \"{}\" is already bound to team \"{}\" (attempted rebind to \"{}\")",
                    key, bound, attempted
                )
            }
            CompetitionError::ScoreShape { match_path, reason } => {
                write!(f, "Invalid scores for {}: {}", match_path, reason)
            }
            CompetitionError::InvalidSetScores {
                match_path,
                set,
                reason,
            } => {
                write!(f, "Invalid set {} scores for {}: {}", set, match_path, reason)
            }
            CompetitionError::DrawNotAllowed { match_path } => {
                write!(f, "{} is drawn but the group does not allow draws", match_path)
            }
            CompetitionError::CompleteFlagMissing { match_path, reason } => {
                write!(f, "{}: {}", match_path, reason)
            }
            CompetitionError::NoWinner { match_path, reason } => {
                write!(f, "{} has no winner: {}", match_path, reason)
            }
            CompetitionError::NotFound { kind, id } => {
                write!(f, "No {} with ID \"{}\"", kind, id)
            }
            CompetitionError::Context { context, .. } => {
                write!(f, "Validation failed for {}", context)
            }
            CompetitionError::Json(e) => write!(f, "JSON error: {}", e),
            CompetitionError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CompetitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompetitionError::Context { source, .. } => Some(source.as_ref()),
            CompetitionError::Json(e) => Some(e),
            CompetitionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CompetitionError {
    fn from(err: serde_json::Error) -> Self {
        CompetitionError::Json(err)
    }
}

impl From<std::io::Error> for CompetitionError {
    fn from(err: std::io::Error) -> Self {
        CompetitionError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, CompetitionError>;
