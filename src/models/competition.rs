//! Competition root: the document model, the load pipeline, lookups, and the
//! score-update entry point.

use crate::error::{CompetitionError, Result};
use crate::logic::refs::{self, RefTable, StructureIndex};
use crate::logic::result::{self, Side};
use crate::logic::standings;
use crate::models::group::{Group, MatchType};
use crate::models::matches::{CompleteFlag, GroupMatch, MatchEntry};
use crate::models::stage::Stage;
use crate::models::team::{self, Team};
use crate::schema;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// The only document version this implementation accepts.
pub const SUPPORTED_VERSION: &str = "1.0.0";

// Structural/reference failures reported per document before truncation.
const MAX_REPORTED_ERRORS: usize = 20;

/// A whole competition: teams, stages, and the reference-resolution state
/// built up while loading. Serializes back to the document it came from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Competition {
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub teams: Vec<Team>,
    pub stages: Vec<Stage>,
    /// Reference table grown during the load pass; never serialized.
    #[serde(skip)]
    pub(crate) refs: RefTable,
    #[serde(skip)]
    unknown: Team,
    #[serde(skip)]
    filename: Option<PathBuf>,
}

impl Competition {
    /// Load a competition from JSON text: parse, schema-validate, then run
    /// the semantic build pass.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| CompetitionError::Document {
            message: "document is not valid JSON".to_string(),
            errors: vec![e.to_string()],
        })?;
        Self::from_value(value)
    }

    /// Load from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        schema::validate_document(&value)?;
        let mut competition: Competition = serde_json::from_value(value)?;
        competition.build()?;
        Ok(competition)
    }

    /// Read and load a competition file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading competition from {}", path.display());
        let json = fs::read_to_string(path)?;
        let mut competition = Self::from_json(&json)?;
        competition.filename = Some(path.to_path_buf());
        Ok(competition)
    }

    /// Serialize the document (pretty-printed, computed state excluded).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Re-validate against the schema and replace the whole file on disk.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let value = serde_json::to_value(self)?;
        schema::validate_document(&value)?;
        let json = serde_json::to_string_pretty(&value)?;
        fs::write(path.as_ref(), json)?;
        log::info!("saved competition to {}", path.as_ref().display());
        Ok(())
    }

    /// Save back to the file the competition was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self.filename.clone().ok_or(CompetitionError::NotFound {
            kind: "filename",
            id: "competition was not loaded from a file".to_string(),
        })?;
        self.save_file(path)
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Resolve a team ID or reference expression. Never fails: anything
    /// unknown resolves to the sentinel UNKNOWN team.
    pub fn get_team(&self, id_or_ref: &str) -> &Team {
        match self.refs.resolve(id_or_ref) {
            Some(team_id) => self
                .teams
                .iter()
                .find(|t| t.id == team_id)
                .unwrap_or(&self.unknown),
            None => &self.unknown,
        }
    }

    pub fn has_team(&self, team_id: &str) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }

    pub fn stage(&self, stage_id: &str) -> Result<&Stage> {
        self.stages
            .iter()
            .find(|s| s.id == stage_id)
            .ok_or(CompetitionError::NotFound {
                kind: "stage",
                id: stage_id.to_string(),
            })
    }

    pub fn stage_mut(&mut self, stage_id: &str) -> Result<&mut Stage> {
        self.stages
            .iter_mut()
            .find(|s| s.id == stage_id)
            .ok_or(CompetitionError::NotFound {
                kind: "stage",
                id: stage_id.to_string(),
            })
    }

    pub fn group(&self, stage_id: &str, group_id: &str) -> Result<&Group> {
        self.stage(stage_id)?.group(group_id)
    }

    pub fn group_match(&self, stage_id: &str, group_id: &str, match_id: &str) -> Result<&GroupMatch> {
        self.group(stage_id, group_id)?.group_match(match_id)
    }

    pub fn is_complete(&self) -> bool {
        self.stages.iter().all(Stage::is_complete)
    }

    /// The winning team of a decided match.
    pub fn match_winner(&self, stage_id: &str, group_id: &str, match_id: &str) -> Result<&Team> {
        self.match_outcome(stage_id, group_id, match_id, Side::Home)
    }

    /// The losing team of a decided match.
    pub fn match_loser(&self, stage_id: &str, group_id: &str, match_id: &str) -> Result<&Team> {
        self.match_outcome(stage_id, group_id, match_id, Side::Away)
    }

    // `which` selects winner (Home) or loser (Away); the sides themselves
    // come from the computed result.
    fn match_outcome(
        &self,
        stage_id: &str,
        group_id: &str,
        match_id: &str,
        which: Side,
    ) -> Result<&Team> {
        let m = self.group_match(stage_id, group_id, match_id)?;
        let path = result::match_path(stage_id, group_id, match_id);
        let Some(res) = &m.result else {
            return Err(CompetitionError::NoWinner {
                match_path: path,
                reason: "match result has not been computed",
            });
        };
        if !res.complete {
            return Err(CompetitionError::NoWinner {
                match_path: path,
                reason: "match is not complete",
            });
        }
        let Some(winner) = res.winner else {
            return Err(CompetitionError::NoWinner {
                match_path: path,
                reason: "match is drawn",
            });
        };
        let side = match which {
            Side::Home => winner,
            Side::Away => winner.other(),
        };
        let expr = match side {
            Side::Home => &m.home_team.id,
            Side::Away => &m.away_team.id,
        };
        Ok(self.get_team(expr))
    }

    /// Update one match's scores: shape-check against the scoring mode,
    /// apply, then re-validate the whole document. The loaded state is only
    /// replaced when the updated document passes every check. `complete`
    /// keeps, sets, or removes the explicit completeness flag.
    pub fn update_match_scores(
        &mut self,
        stage_id: &str,
        group_id: &str,
        match_id: &str,
        home_scores: Vec<u32>,
        away_scores: Vec<u32>,
        complete: CompleteFlag,
    ) -> Result<()> {
        {
            let group = self.group(stage_id, group_id)?;
            let path = result::match_path(stage_id, group_id, match_id);
            group.group_match(match_id)?;
            match group.match_type() {
                MatchType::Continuous => {
                    if home_scores.len() != 1 || away_scores.len() != 1 {
                        return Err(CompetitionError::ScoreShape {
                            match_path: path,
                            reason: "a continuous match takes exactly one score per side"
                                .to_string(),
                        });
                    }
                }
                MatchType::Sets => {
                    let max_sets = group.sets_config().max_sets() as usize;
                    if home_scores.len() != away_scores.len() {
                        return Err(CompetitionError::ScoreShape {
                            match_path: path,
                            reason: "both sides must record the same number of sets".to_string(),
                        });
                    }
                    if home_scores.len() > max_sets {
                        return Err(CompetitionError::ScoreShape {
                            match_path: path,
                            reason: format!("at most {} set(s) can be recorded", max_sets),
                        });
                    }
                }
            }
        }

        // Apply to a copy and rebuild; the current state survives a failure.
        let mut updated = self.clone();
        {
            let m = updated
                .stage_mut(stage_id)?
                .group_mut(group_id)?
                .group_match_mut(match_id)?;
            m.home_team.scores = Some(home_scores);
            m.away_team.scores = Some(away_scores);
            match complete {
                CompleteFlag::Keep => {}
                CompleteFlag::Set(value) => m.complete = Some(value),
                CompleteFlag::Clear => m.complete = None,
            }
        }
        let value = serde_json::to_value(&updated)?;
        let mut rebuilt = Competition::from_value(value)?;
        rebuilt.filename = self.filename.clone();
        *self = rebuilt;
        Ok(())
    }

    /// The semantic build pass: teams first, then stages in document order so
    /// references registered by earlier groups are available to later ones.
    fn build(&mut self) -> Result<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(CompetitionError::UnsupportedVersion(self.version.clone()));
        }
        self.unknown = Team::unknown();
        let mut errors: Vec<String> = Vec::new();

        let mut team_ids: HashSet<String> = HashSet::new();
        for t in &self.teams {
            if let Err(e) = team::validate_team_id(&t.id) {
                errors.push(e.to_string());
            }
            if let Err(e) = team::validate_team_name(&t.id, &t.name) {
                errors.push(e.to_string());
            }
            if !team_ids.insert(t.id.clone()) {
                errors.push(
                    CompetitionError::DuplicateId {
                        kind: "team",
                        id: t.id.clone(),
                    }
                    .to_string(),
                );
            }
            self.refs.seed_team(&t.id);
        }

        let mut index = StructureIndex::build(&self.stages, &mut errors);
        let team_names: HashMap<String, String> = self
            .teams
            .iter()
            .map(|t| (t.id.clone(), t.name.clone()))
            .collect();

        let refs = &mut self.refs;
        for stage in &mut self.stages {
            for group in stage.groups.iter_mut().flatten() {
                process_group(group, &stage.id, refs, &mut index, &team_ids, &team_names, &mut errors)?;
            }
            check_stage_team_overlap(stage, refs, &mut errors);
        }

        if !errors.is_empty() {
            errors.truncate(MAX_REPORTED_ERRORS);
            return Err(CompetitionError::Document {
                message: "competition document failed validation".to_string(),
                errors,
            });
        }
        log::debug!(
            "loaded competition \"{}\": {} team(s), {} stage(s)",
            self.name,
            self.teams.len(),
            self.stages.len()
        );
        Ok(())
    }
}

/// Validate one group's references and schedule fields, compute its match
/// results (registering winner/loser references), and, for leagues, compute
/// the standings table and register final positions once complete.
fn process_group(
    group: &mut Group,
    stage_id: &str,
    refs: &mut RefTable,
    index: &mut StructureIndex,
    team_ids: &HashSet<String>,
    team_names: &HashMap<String, String>,
    errors: &mut Vec<String>,
) -> Result<()> {
    let group_id = group.id().to_string();
    let match_type = group.match_type();
    let cfg = group.sets_config();
    let draws_allowed = group.draws_allowed();

    for entry in group.matches_mut() {
        match entry {
            MatchEntry::Match(m) => {
                let path = result::match_path(stage_id, &group_id, &m.id);
                validate_match_refs(m, &path, team_ids, index, errors);
                validate_match_schedule(m, &path, errors);
                // Score errors are fatal for the load, not aggregated.
                let res = result::compute_match_result(m, match_type, &cfg, draws_allowed, &path)?;
                m.result = Some(res);
                result::register_match_outcome(refs, stage_id, &group_id, m)?;
            }
            MatchEntry::Break(b) => {
                let context = format!("break in group \"{}\" of stage \"{}\"", group_id, stage_id);
                validate_schedule_fields(&context, b.date.as_deref(), b.start.as_deref(), None, b.duration.as_deref(), errors);
            }
        }
    }

    if let Group::Knockout(k) = &*group {
        if let Some(config) = &k.knockout {
            for label in config.standing.iter().flatten() {
                let context = format!(
                    "standing position \"{}\" of group \"{}\" in stage \"{}\"",
                    label.position, group_id, stage_id
                );
                if let Err(e) = refs::validate_team_ref(&label.id, team_ids, index, &context) {
                    errors.push(chained(&e));
                }
            }
        }
    }

    let complete = group.is_complete();
    if let Group::League(league) = group {
        let table = standings::compute_standings(league, refs, team_names);
        if complete {
            index.mark_complete(stage_id, &group_id, table.entries.len());
            for (i, entry) in table.entries.iter().enumerate() {
                let key = format!("{{{}:{}:league:{}}}", stage_id, group_id, i + 1);
                refs.add_reference(&key, &entry.team_id)?;
            }
            log::debug!(
                "league {}:{} complete, registered {} position(s)",
                stage_id,
                group_id,
                table.entries.len()
            );
        }
        league.table = Some(table);
    } else if complete {
        index.mark_complete(stage_id, &group_id, 0);
    }
    Ok(())
}

fn validate_match_refs(
    m: &GroupMatch,
    path: &str,
    team_ids: &HashSet<String>,
    index: &StructureIndex,
    errors: &mut Vec<String>,
) {
    check_ref(&m.home_team.id, "homeTeam", path, team_ids, index, errors);
    check_ref(&m.away_team.id, "awayTeam", path, team_ids, index, errors);
    if let Some(team) = m.officiating_team_ref() {
        check_ref(team, "officials", path, team_ids, index, errors);
        // The same side may not play and officiate one match.
        if team == m.home_team.id || team == m.away_team.id {
            errors.push(format!(
                "officiating team \"{}\" is also playing in {}",
                team, path
            ));
        }
    }
    if let Some(team) = m.manager.as_ref().and_then(|mg| mg.team_ref()) {
        check_ref(team, "manager", path, team_ids, index, errors);
    }
}

fn check_ref(
    expr: &str,
    field: &str,
    path: &str,
    team_ids: &HashSet<String>,
    index: &StructureIndex,
    errors: &mut Vec<String>,
) {
    let context = format!("{} of {}", field, path);
    if let Err(e) = refs::validate_team_ref(expr, team_ids, index, &context) {
        errors.push(chained(&e));
    }
}

fn validate_match_schedule(m: &GroupMatch, path: &str, errors: &mut Vec<String>) {
    validate_schedule_fields(
        path,
        m.date.as_deref(),
        m.start.as_deref(),
        m.warmup.as_deref(),
        m.duration.as_deref(),
        errors,
    );
}

fn validate_schedule_fields(
    context: &str,
    date: Option<&str>,
    start: Option<&str>,
    warmup: Option<&str>,
    duration: Option<&str>,
    errors: &mut Vec<String>,
) {
    if let Some(d) = date {
        if NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
            errors.push(format!("{}: date \"{}\" is not a valid YYYY-MM-DD date", context, d));
        }
    }
    for (field, value) in [("start", start), ("warmup", warmup), ("duration", duration)] {
        if let Some(v) = value {
            if NaiveTime::parse_from_str(v, "%H:%M").is_err() {
                errors.push(format!("{}: {} \"{}\" is not a valid H:MM time", context, field, v));
            }
        }
    }
}

// No team may appear as a known playing participant in two groups of a stage.
fn check_stage_team_overlap(stage: &Stage, refs: &RefTable, errors: &mut Vec<String>) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for group in stage.groups() {
        let mut in_this_group: HashSet<String> = HashSet::new();
        for entry in group.matches() {
            let Some(m) = entry.as_match() else { continue };
            for expr in [&m.home_team.id, &m.away_team.id] {
                if let Some(team_id) = refs.resolve(expr) {
                    in_this_group.insert(team_id.to_string());
                }
            }
        }
        for team_id in in_this_group {
            match seen.get(&team_id) {
                Some(other) if *other != group.id() => {
                    errors.push(
                        CompetitionError::TeamInMultipleGroups {
                            team_id: team_id.clone(),
                            stage_id: stage.id.clone(),
                        }
                        .to_string(),
                    );
                }
                _ => {
                    seen.insert(team_id, group.id());
                }
            }
        }
    }
}

// Flatten a context-wrapped error into "context: cause" for the aggregate report.
fn chained(error: &CompetitionError) -> String {
    use std::error::Error;
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
