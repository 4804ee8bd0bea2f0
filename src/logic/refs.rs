//! Team-reference grammar: parsing, structural validation, and lazy resolution.
//!
//! A team identifier in the document is either a literal team ID, a reference
//! `{STAGE:GROUP:TYPE:ENTITY}` to another group's outcome, or a one-level
//! ternary `LEFT==RIGHT?TRUE:FALSE` over two references. Resolution is a table
//! lookup that never fails; validation is the strict load-time check.

use crate::error::CompetitionError;
use crate::models::group::Group;
use crate::models::matches::MatchEntry;
use crate::models::stage::Stage;
use std::collections::{HashMap, HashSet};

/// Outcome selector in a match reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Winner,
    Loser,
}

/// What a `{STAGE:GROUP:TYPE:ENTITY}` reference points at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RefEntity {
    /// `TYPE` is `league`: a 1-based final position.
    LeaguePosition(u32),
    /// `TYPE` is a match ID: that match's winner or loser.
    MatchOutcome { match_id: String, outcome: Outcome },
}

/// A parsed `{STAGE:GROUP:TYPE:ENTITY}` reference. `raw` (braces included)
/// is the key the resolution table is indexed by.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupRef {
    pub stage_id: String,
    pub group_id: String,
    pub entity: RefEntity,
    pub raw: String,
}

/// A parsed team-identifier expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TeamRef {
    Literal(String),
    Reference(GroupRef),
    /// The branches are plain references or literals, never ternaries.
    Ternary {
        left: GroupRef,
        right: GroupRef,
        if_true: Box<TeamRef>,
        if_false: Box<TeamRef>,
    },
}

impl TeamRef {
    /// Every `{...}` reference appearing anywhere in the expression.
    pub fn group_refs(&self) -> Vec<&GroupRef> {
        match self {
            TeamRef::Literal(_) => Vec::new(),
            TeamRef::Reference(r) => vec![r],
            TeamRef::Ternary {
                left,
                right,
                if_true,
                if_false,
            } => {
                let mut refs = vec![left, right];
                refs.extend(if_true.group_refs());
                refs.extend(if_false.group_refs());
                refs
            }
        }
    }
}

/// Parse a team-identifier expression. Anything not starting with `{` is a
/// literal and always parses.
pub fn parse_team_ref(expr: &str) -> Result<TeamRef, CompetitionError> {
    if !expr.starts_with('{') {
        if expr.is_empty() {
            return Err(invalid(expr, "empty team identifier"));
        }
        return Ok(TeamRef::Literal(expr.to_string()));
    }
    if let Some(eq) = expr.find("==") {
        return parse_ternary(expr, eq);
    }
    parse_group_ref(expr).map(TeamRef::Reference)
}

fn parse_ternary(expr: &str, eq: usize) -> Result<TeamRef, CompetitionError> {
    let left = parse_group_ref(&expr[..eq])
        .map_err(|e| e.with_context(format!("left side of ternary \"{}\"", expr)))?;
    let rest = &expr[eq + 2..];
    if !rest.starts_with('{') {
        return Err(invalid(expr, "right side of == must be a {...} reference"));
    }
    let close = rest
        .find('}')
        .ok_or_else(|| invalid(expr, "unterminated reference on the right side of =="))?;
    let right = parse_group_ref(&rest[..=close])
        .map_err(|e| e.with_context(format!("right side of ternary \"{}\"", expr)))?;
    let after = &rest[close + 1..];
    let branches = after
        .strip_prefix('?')
        .ok_or_else(|| invalid(expr, "expected ? after the ternary condition"))?;
    let colon = colon_outside_braces(branches)
        .ok_or_else(|| invalid(expr, "expected : between the ternary branches"))?;
    let if_true = parse_branch(&branches[..colon])
        .map_err(|e| e.with_context(format!("true branch of ternary \"{}\"", expr)))?;
    let if_false = parse_branch(&branches[colon + 1..])
        .map_err(|e| e.with_context(format!("false branch of ternary \"{}\"", expr)))?;
    Ok(TeamRef::Ternary {
        left,
        right,
        if_true: Box::new(if_true),
        if_false: Box::new(if_false),
    })
}

// One level only: a branch is a reference or a literal, not another ternary.
fn parse_branch(expr: &str) -> Result<TeamRef, CompetitionError> {
    if expr.starts_with('{') {
        parse_group_ref(expr).map(TeamRef::Reference)
    } else if expr.is_empty() {
        Err(invalid(expr, "empty ternary branch"))
    } else {
        Ok(TeamRef::Literal(expr.to_string()))
    }
}

fn parse_group_ref(expr: &str) -> Result<GroupRef, CompetitionError> {
    let inner = expr
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| invalid(expr, "reference must be enclosed in { and }"))?;
    let parts: Vec<&str> = inner.split(':').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid(expr, "reference must have the form {STAGE:GROUP:TYPE:ENTITY}"));
    }
    let entity = if parts[2] == "league" {
        let position: u32 = parts[3]
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid(expr, "league position must be a positive integer"))?;
        RefEntity::LeaguePosition(position)
    } else {
        let outcome = match parts[3] {
            "winner" => Outcome::Winner,
            "loser" => Outcome::Loser,
            other => {
                return Err(invalid(
                    expr,
                    &format!("match entity must be \"winner\" or \"loser\", not \"{}\"", other),
                ))
            }
        };
        RefEntity::MatchOutcome {
            match_id: parts[2].to_string(),
            outcome,
        }
    };
    Ok(GroupRef {
        stage_id: parts[0].to_string(),
        group_id: parts[1].to_string(),
        entity,
        raw: expr.to_string(),
    })
}

fn colon_outside_braces(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn invalid(reference: &str, reason: &str) -> CompetitionError {
    CompetitionError::InvalidTeamReference {
        reference: reference.to_string(),
        reason: reason.to_string(),
    }
}

/// The resolution table: reference string to canonical team ID, pre-seeded
/// with every literal team ID and grown as matches and league groups complete.
#[derive(Clone, Debug, Default)]
pub struct RefTable {
    entries: HashMap<String, String>,
}

impl RefTable {
    /// Seed a literal team ID so that `resolve(id)` returns the team itself.
    pub(crate) fn seed_team(&mut self, team_id: &str) {
        self.entries.insert(team_id.to_string(), team_id.to_string());
    }

    /// Bind a reference key to a team. Error on rebind to a different team;
    /// rebinding the same team is a no-op.
    pub fn add_reference(&mut self, key: &str, team_id: &str) -> Result<(), CompetitionError> {
        match self.entries.get(key) {
            Some(bound) if bound != team_id => Err(CompetitionError::ReferenceConflict {
                key: key.to_string(),
                bound: bound.clone(),
                attempted: team_id.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                log::debug!("reference {} -> {}", key, team_id);
                self.entries.insert(key.to_string(), team_id.to_string());
                Ok(())
            }
        }
    }

    /// Raw table lookup; `None` means not registered yet.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Resolve an expression to a team ID. Never fails: unregistered or
    /// malformed expressions resolve to `None` (the UNKNOWN team).
    pub fn resolve(&self, expr: &str) -> Option<&str> {
        match parse_team_ref(expr) {
            Ok(TeamRef::Ternary {
                left,
                right,
                if_true,
                if_false,
            }) => {
                // A decision needs both inputs: an unresolved side means UNKNOWN.
                let l = self.lookup(&left.raw)?;
                let r = self.lookup(&right.raw)?;
                let branch = if l == r { &if_true } else { &if_false };
                match branch.as_ref() {
                    TeamRef::Literal(id) => self.lookup(id),
                    TeamRef::Reference(gr) => self.lookup(&gr.raw),
                    TeamRef::Ternary { .. } => None,
                }
            }
            Ok(_) | Err(_) => self.lookup(expr),
        }
    }
}

/// Structural index over the parsed document: which stages, groups, and
/// matches exist, and how many teams a completed group finished with.
#[derive(Clone, Debug, Default)]
pub struct StructureIndex {
    // stage -> group -> match IDs
    stages: HashMap<String, HashMap<String, HashSet<String>>>,
    // (stage, group) -> final team count, inserted once the group completes
    completed: HashMap<(String, String), usize>,
}

impl StructureIndex {
    /// Index the document and report duplicate stage/group/match IDs into
    /// `errors` as it goes.
    pub fn build(stages: &[Stage], errors: &mut Vec<String>) -> Self {
        let mut index = StructureIndex::default();
        for stage in stages {
            if index.stages.contains_key(&stage.id) {
                errors.push(
                    CompetitionError::DuplicateId {
                        kind: "stage",
                        id: stage.id.clone(),
                    }
                    .to_string(),
                );
                continue;
            }
            let groups = index.stages.entry(stage.id.clone()).or_default();
            for group in stage.groups() {
                if groups.contains_key(group.id()) {
                    errors.push(
                        CompetitionError::DuplicateId {
                            kind: "group",
                            id: format!("{}:{}", stage.id, group.id()),
                        }
                        .to_string(),
                    );
                    continue;
                }
                let matches = groups.entry(group.id().to_string()).or_default();
                for m in group.matches().iter().filter_map(MatchEntry::as_match) {
                    if !matches.insert(m.id.clone()) {
                        errors.push(
                            CompetitionError::DuplicateId {
                                kind: "match",
                                id: format!("{}:{}:{}", stage.id, group.id(), m.id),
                            }
                            .to_string(),
                        );
                    }
                }
            }
        }
        index
    }

    pub fn has_stage(&self, stage_id: &str) -> bool {
        self.stages.contains_key(stage_id)
    }

    pub fn has_group(&self, stage_id: &str, group_id: &str) -> bool {
        self.stages
            .get(stage_id)
            .map_or(false, |g| g.contains_key(group_id))
    }

    pub fn has_match(&self, stage_id: &str, group_id: &str, match_id: &str) -> bool {
        self.stages
            .get(stage_id)
            .and_then(|g| g.get(group_id))
            .map_or(false, |m| m.contains(match_id))
    }

    pub fn mark_complete(&mut self, stage_id: &str, group_id: &str, team_count: usize) {
        self.completed
            .insert((stage_id.to_string(), group_id.to_string()), team_count);
    }

    pub fn completed_team_count(&self, stage_id: &str, group_id: &str) -> Option<usize> {
        self.completed
            .get(&(stage_id.to_string(), group_id.to_string()))
            .copied()
    }
}

/// Load-time structural validation of a team identifier. Fails on unknown
/// literals, bad grammar, or dangling stage/group/match references; the error
/// is wrapped with `context` (which field of which match it came from).
pub fn validate_team_ref(
    expr: &str,
    team_ids: &HashSet<String>,
    index: &StructureIndex,
    context: &str,
) -> Result<(), CompetitionError> {
    let parsed = parse_team_ref(expr).map_err(|e| e.with_context(context.to_string()))?;
    validate_parsed(&parsed, team_ids, index).map_err(|e| e.with_context(context.to_string()))
}

fn validate_parsed(
    team_ref: &TeamRef,
    team_ids: &HashSet<String>,
    index: &StructureIndex,
) -> Result<(), CompetitionError> {
    match team_ref {
        TeamRef::Literal(id) => {
            if team_ids.contains(id) {
                Ok(())
            } else {
                Err(invalid(id, "team does not exist"))
            }
        }
        TeamRef::Reference(group_ref) => validate_group_ref(group_ref, index),
        TeamRef::Ternary {
            left,
            right,
            if_true,
            if_false,
        } => {
            validate_group_ref(left, index)?;
            validate_group_ref(right, index)?;
            validate_parsed(if_true, team_ids, index)?;
            validate_parsed(if_false, team_ids, index)
        }
    }
}

fn validate_group_ref(group_ref: &GroupRef, index: &StructureIndex) -> Result<(), CompetitionError> {
    if !index.has_stage(&group_ref.stage_id) {
        return Err(invalid(
            &group_ref.raw,
            &format!("stage \"{}\" does not exist", group_ref.stage_id),
        ));
    }
    if !index.has_group(&group_ref.stage_id, &group_ref.group_id) {
        return Err(invalid(
            &group_ref.raw,
            &format!(
                "group \"{}\" does not exist in stage \"{}\"",
                group_ref.group_id, group_ref.stage_id
            ),
        ));
    }
    match &group_ref.entity {
        RefEntity::LeaguePosition(position) => {
            // The final team count is only knowable once the group completed.
            if let Some(count) =
                index.completed_team_count(&group_ref.stage_id, &group_ref.group_id)
            {
                if *position as usize > count {
                    return Err(invalid(
                        &group_ref.raw,
                        &format!(
                            "league position {} exceeds the {} team(s) in the group",
                            position, count
                        ),
                    ));
                }
            }
            Ok(())
        }
        RefEntity::MatchOutcome { match_id, .. } => {
            if index.has_match(&group_ref.stage_id, &group_ref.group_id, match_id) {
                Ok(())
            } else {
                Err(invalid(
                    &group_ref.raw,
                    &format!(
                        "match \"{}\" does not exist in group \"{}:{}\"",
                        match_id, group_ref.stage_id, group_ref.group_id
                    ),
                ))
            }
        }
    }
}

/// Collect the team-identifier expressions a group's real matches use, split
/// into playing and officiating roles.
pub(crate) fn group_expressions(group: &Group) -> (Vec<&str>, Vec<&str>) {
    let mut playing = Vec::new();
    let mut officiating = Vec::new();
    for m in group.matches().iter().filter_map(MatchEntry::as_match) {
        playing.push(m.home_team.id.as_str());
        playing.push(m.away_team.id.as_str());
        if let Some(team) = m.officiating_team_ref() {
            officiating.push(team);
        }
    }
    (playing, officiating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals_and_references() {
        assert_eq!(
            parse_team_ref("TM1").unwrap(),
            TeamRef::Literal("TM1".to_string())
        );
        let r = parse_team_ref("{P:A:league:2}").unwrap();
        match r {
            TeamRef::Reference(gr) => {
                assert_eq!(gr.stage_id, "P");
                assert_eq!(gr.group_id, "A");
                assert_eq!(gr.entity, RefEntity::LeaguePosition(2));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn parses_match_outcomes() {
        let r = parse_team_ref("{P:A:M1:loser}").unwrap();
        match r {
            TeamRef::Reference(gr) => assert_eq!(
                gr.entity,
                RefEntity::MatchOutcome {
                    match_id: "M1".to_string(),
                    outcome: Outcome::Loser,
                }
            ),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn parses_ternaries() {
        let expr = "{P:A:league:1}=={P:B:M1:winner}?{P:A:league:2}:TM9";
        match parse_team_ref(expr).unwrap() {
            TeamRef::Ternary {
                left,
                right,
                if_true,
                if_false,
            } => {
                assert_eq!(left.raw, "{P:A:league:1}");
                assert_eq!(right.raw, "{P:B:M1:winner}");
                assert_eq!(*if_true, TeamRef::Reference(parse_expect("{P:A:league:2}")));
                assert_eq!(*if_false, TeamRef::Literal("TM9".to_string()));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    fn parse_expect(expr: &str) -> GroupRef {
        match parse_team_ref(expr).unwrap() {
            TeamRef::Reference(gr) => gr,
            other => panic!("expected a reference, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_grammar() {
        for bad in [
            "{P:A:league}",
            "{P:A:league:0}",
            "{P:A:league:two}",
            "{P:A:M1:victor}",
            "{P::M1:winner}",
            "{P:A:M1:winner",
        ] {
            assert!(parse_team_ref(bad).is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn resolve_never_fails() {
        let mut table = RefTable::default();
        table.seed_team("TM1");
        assert_eq!(table.resolve("TM1"), Some("TM1"));
        assert_eq!(table.resolve("{P:A:league:1}"), None);
        assert_eq!(table.resolve("{not even close"), None);
    }

    #[test]
    fn ternary_resolution_picks_a_branch() {
        let mut table = RefTable::default();
        table.seed_team("TM1");
        table.seed_team("TM2");
        table.add_reference("{P:A:league:1}", "TM1").unwrap();
        table.add_reference("{P:B:M1:winner}", "TM1").unwrap();
        table.add_reference("{P:A:league:2}", "TM2").unwrap();

        let expr = "{P:A:league:1}=={P:B:M1:winner}?{P:A:league:2}:TM1";
        assert_eq!(table.resolve(expr), Some("TM2"));

        let expr_ne = "{P:A:league:2}=={P:B:M1:winner}?{P:A:league:1}:TM2";
        assert_eq!(table.resolve(expr_ne), Some("TM2"));
    }

    #[test]
    fn ternary_with_unresolved_side_is_unknown() {
        let mut table = RefTable::default();
        table.seed_team("TM1");
        table.add_reference("{P:A:league:1}", "TM1").unwrap();
        let expr = "{P:A:league:1}=={P:B:M1:winner}?TM1:TM1";
        assert_eq!(table.resolve(expr), None);
    }

    #[test]
    fn add_reference_rebind_rules() {
        let mut table = RefTable::default();
        table.add_reference("{P:A:M1:winner}", "TM1").unwrap();
        assert!(table.add_reference("{P:A:M1:winner}", "TM1").is_ok());
        assert!(table.add_reference("{P:A:M1:winner}", "TM2").is_err());
    }
}
