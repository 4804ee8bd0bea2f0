//! Team-reachability queries over groups and stages: who plays, who
//! officiates, and who might still end up playing through unresolved
//! references. Answers are memoized per group for the loaded document's
//! lifetime.

use crate::error::Result;
use crate::logic::refs::{group_expressions, parse_team_ref, GroupRef, RefTable};
use crate::models::competition::Competition;
use crate::models::group::Group;
use crate::models::team::UNKNOWN_TEAM_ID;
use std::collections::HashSet;

/// Selection flags for [`Competition::group_team_ids`] /
/// [`Competition::stage_team_ids`]. Combine one ID-kind flag with optional
/// role flags (no role flag means both roles).
pub const TEAMS_FIXED_ID: u8 = 1;
pub const TEAMS_KNOWN: u8 = 2;
pub const TEAMS_MAYBE: u8 = 4;
pub const TEAMS_ALL: u8 = 8;
pub const TEAMS_PLAYING: u8 = 16;
pub const TEAMS_OFFICIATING: u8 = 32;

impl Competition {
    /// Does some real match in the group resolve to this team as a player?
    pub fn team_has_matches(&self, stage_id: &str, group_id: &str, team_id: &str) -> Result<bool> {
        let group = self.stage(stage_id)?.group(group_id)?;
        Ok(group_team_has_matches(group, &self.refs, team_id))
    }

    /// Does some real match in the group resolve to this team as officials?
    pub fn team_has_officiating(
        &self,
        stage_id: &str,
        group_id: &str,
        team_id: &str,
    ) -> Result<bool> {
        let group = self.stage(stage_id)?.group(group_id)?;
        Ok(group_team_has_officiating(group, &self.refs, team_id))
    }

    /// Might this team still end up playing in the group? Structural
    /// reachability through unresolved references only; always false once the
    /// group is complete.
    pub fn team_may_have_matches(
        &self,
        stage_id: &str,
        group_id: &str,
        team_id: &str,
    ) -> Result<bool> {
        let group = self.stage(stage_id)?.group(group_id)?;
        if let Some(cached) = group.caches().may_have_matches.borrow().get(team_id) {
            return Ok(*cached);
        }
        let mut visited = HashSet::new();
        visited.insert((stage_id.to_string(), group_id.to_string()));
        let answer = group_may_have_matches(self, group, team_id, &mut visited);
        group
            .caches()
            .may_have_matches
            .borrow_mut()
            .insert(team_id.to_string(), answer);
        Ok(answer)
    }

    /// Stage-level aggregates of the group queries.
    pub fn stage_team_has_matches(&self, stage_id: &str, team_id: &str) -> Result<bool> {
        let stage = self.stage(stage_id)?;
        Ok(stage
            .groups()
            .iter()
            .any(|g| group_team_has_matches(g, &self.refs, team_id)))
    }

    pub fn stage_team_has_officiating(&self, stage_id: &str, team_id: &str) -> Result<bool> {
        let stage = self.stage(stage_id)?;
        Ok(stage
            .groups()
            .iter()
            .any(|g| group_team_has_officiating(g, &self.refs, team_id)))
    }

    pub fn stage_team_may_have_matches(&self, stage_id: &str, team_id: &str) -> Result<bool> {
        let stage = self.stage(stage_id)?;
        for group in stage.groups() {
            if self.team_may_have_matches(stage_id, group.id(), team_id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Team IDs appearing in the group, filtered by the `TEAMS_*` flags.
    /// FIXED and KNOWN results are sorted by resolved team name; ALL and
    /// MAYBE are unordered.
    pub fn group_team_ids(&self, stage_id: &str, group_id: &str, flags: u8) -> Result<Vec<String>> {
        let group = self.stage(stage_id)?.group(group_id)?;
        Ok(self.collect_team_ids(group, flags))
    }

    /// Union of [`Competition::group_team_ids`] over the stage's groups.
    pub fn stage_team_ids(&self, stage_id: &str, flags: u8) -> Result<Vec<String>> {
        let stage = self.stage(stage_id)?;
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for group in stage.groups() {
            for id in self.collect_team_ids(group, flags) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        if flags & (TEAMS_FIXED_ID | TEAMS_KNOWN) != 0 {
            self.sort_by_team_name(&mut ids);
        }
        Ok(ids)
    }

    fn collect_team_ids(&self, group: &Group, flags: u8) -> Vec<String> {
        let (playing, officiating) = group_expressions(group);
        let want_playing = flags & TEAMS_PLAYING != 0;
        let want_officiating = flags & TEAMS_OFFICIATING != 0;
        let both = !want_playing && !want_officiating;
        let mut exprs: Vec<&str> = Vec::new();
        if want_playing || both {
            exprs.extend(playing);
        }
        if want_officiating || both {
            exprs.extend(officiating);
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        if flags & TEAMS_MAYBE != 0 {
            let mut visited = HashSet::new();
            for id in maybe_team_ids(self, &exprs, &mut visited) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
            return ids;
        }
        for expr in exprs {
            if flags & TEAMS_FIXED_ID != 0 {
                if expr.starts_with('{') {
                    continue;
                }
            } else if flags & TEAMS_KNOWN != 0 {
                match self.refs.resolve(expr) {
                    Some(resolved) => {
                        if seen.insert(resolved.to_string()) {
                            ids.push(resolved.to_string());
                        }
                        continue;
                    }
                    None => continue,
                }
            }
            // FIXED keeps the literal as-is; ALL (and no-kind) keeps the raw
            // expression, unresolved references included.
            if seen.insert(expr.to_string()) {
                ids.push(expr.to_string());
            }
        }
        if flags & (TEAMS_FIXED_ID | TEAMS_KNOWN) != 0 {
            self.sort_by_team_name(&mut ids);
        }
        ids
    }

    fn sort_by_team_name(&self, ids: &mut [String]) {
        ids.sort_by_key(|id| {
            let team = self.get_team(id);
            if team.is_unknown() {
                id.clone()
            } else {
                team.name.clone()
            }
        });
    }
}

pub(crate) fn group_team_has_matches(group: &Group, refs: &RefTable, team_id: &str) -> bool {
    if let Some(cached) = group.caches().has_matches.borrow().get(team_id) {
        return *cached;
    }
    let (playing, _) = group_expressions(group);
    let answer = playing
        .iter()
        .any(|expr| refs.resolve(expr) == Some(team_id));
    group
        .caches()
        .has_matches
        .borrow_mut()
        .insert(team_id.to_string(), answer);
    answer
}

pub(crate) fn group_team_has_officiating(group: &Group, refs: &RefTable, team_id: &str) -> bool {
    if let Some(cached) = group.caches().has_officiating.borrow().get(team_id) {
        return *cached;
    }
    let (_, officiating) = group_expressions(group);
    let answer = officiating
        .iter()
        .any(|expr| refs.resolve(expr) == Some(team_id));
    group
        .caches()
        .has_officiating
        .borrow_mut()
        .insert(team_id.to_string(), answer);
    answer
}

// Reachability: an unresolved reference in this (incomplete) group whose
// target group either already has the team or may still produce it.
fn group_may_have_matches(
    comp: &Competition,
    group: &Group,
    team_id: &str,
    visited: &mut HashSet<(String, String)>,
) -> bool {
    if team_id == UNKNOWN_TEAM_ID || group.is_complete() {
        return false;
    }
    let (playing, _) = group_expressions(group);
    for expr in playing {
        let Ok(parsed) = parse_team_ref(expr) else { continue };
        for group_ref in parsed.group_refs() {
            if comp.refs.resolve(&group_ref.raw).is_some() {
                continue;
            }
            if reaches_team(comp, group_ref, team_id, visited) {
                return true;
            }
        }
    }
    false
}

fn reaches_team(
    comp: &Competition,
    group_ref: &GroupRef,
    team_id: &str,
    visited: &mut HashSet<(String, String)>,
) -> bool {
    if !visited.insert((group_ref.stage_id.clone(), group_ref.group_id.clone())) {
        return false;
    }
    let Ok(stage) = comp.stage(&group_ref.stage_id) else {
        return false;
    };
    let Ok(target) = stage.group(&group_ref.group_id) else {
        return false;
    };
    group_team_has_matches(target, &comp.refs, team_id)
        || group_may_have_matches(comp, target, team_id, visited)
}

// The "maybe" ID set: known and maybe teams of every group an unresolved
// reference in `exprs` points into.
fn maybe_team_ids(
    comp: &Competition,
    exprs: &[&str],
    visited: &mut HashSet<(String, String)>,
) -> Vec<String> {
    let mut ids = Vec::new();
    for expr in exprs {
        let Ok(parsed) = parse_team_ref(expr) else { continue };
        for group_ref in parsed.group_refs() {
            if comp.refs.resolve(&group_ref.raw).is_some() {
                continue;
            }
            if !visited.insert((group_ref.stage_id.clone(), group_ref.group_id.clone())) {
                continue;
            }
            let Ok(stage) = comp.stage(&group_ref.stage_id) else { continue };
            let Ok(target) = stage.group(&group_ref.group_id) else { continue };
            if target.is_complete() {
                continue;
            }
            let (playing, _) = group_expressions(target);
            for inner in &playing {
                if let Some(resolved) = comp.refs.resolve(inner) {
                    ids.push(resolved.to_string());
                }
            }
            ids.extend(maybe_team_ids(comp, &playing, visited));
        }
    }
    ids
}
