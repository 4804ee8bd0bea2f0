//! Match completion and scoring: the continuous and set-based state machines.

use crate::error::CompetitionError;
use crate::logic::refs::RefTable;
use crate::models::group::{MatchType, SetConfig};
use crate::models::matches::GroupMatch;

/// One side of a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Computed state of a match: completion, outcome, and per-side tallies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchResult {
    pub complete: bool,
    pub draw: bool,
    pub winner: Option<Side>,
    pub home_sets: u32,
    pub away_sets: u32,
    /// Point totals over played sets (or the single continuous score).
    pub home_points: u32,
    pub away_points: u32,
}

impl MatchResult {
    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::other)
    }

    fn incomplete() -> Self {
        MatchResult {
            complete: false,
            draw: false,
            winner: None,
            home_sets: 0,
            away_sets: 0,
            home_points: 0,
            away_points: 0,
        }
    }
}

/// Human-readable location of a match, used in score errors.
pub(crate) fn match_path(stage_id: &str, group_id: &str, match_id: &str) -> String {
    format!(
        "match \"{}\" in group \"{}\" of stage \"{}\"",
        match_id, group_id, stage_id
    )
}

/// Compute the result of one match from its score arrays and the group's
/// configuration. Fails on any score-shape or set-scoring violation.
pub fn compute_match_result(
    m: &GroupMatch,
    match_type: MatchType,
    cfg: &SetConfig,
    draws_allowed: bool,
    path: &str,
) -> Result<MatchResult, CompetitionError> {
    match match_type {
        MatchType::Continuous => continuous_result(m, draws_allowed, path),
        MatchType::Sets => sets_result(m, cfg, draws_allowed, path),
    }
}

fn continuous_result(
    m: &GroupMatch,
    draws_allowed: bool,
    path: &str,
) -> Result<MatchResult, CompetitionError> {
    let home = m.home_team.scores();
    let away = m.away_team.scores();
    match (home.len(), away.len()) {
        (0, 0) | (1, 1) => {}
        _ => {
            return Err(CompetitionError::ScoreShape {
                match_path: path.to_string(),
                reason: "a continuous match records exactly one score per side".to_string(),
            })
        }
    }
    // Continuous matches have no derived completion; the flag is the state.
    let complete = m.complete.ok_or(CompetitionError::CompleteFlagMissing {
        match_path: path.to_string(),
        reason: "a continuous match requires an explicit complete flag",
    })?;

    let mut result = MatchResult::incomplete();
    result.home_points = home.first().copied().unwrap_or(0);
    result.away_points = away.first().copied().unwrap_or(0);
    if !complete {
        return Ok(result);
    }
    result.complete = true;
    if result.home_points == result.away_points {
        // A 0-0 finish (double forfeit) is a draw even where draws are banned.
        if !draws_allowed && result.home_points != 0 {
            return Err(CompetitionError::DrawNotAllowed {
                match_path: path.to_string(),
            });
        }
        result.draw = true;
    } else if result.home_points > result.away_points {
        result.winner = Some(Side::Home);
    } else {
        result.winner = Some(Side::Away);
    }
    Ok(result)
}

fn sets_result(
    m: &GroupMatch,
    cfg: &SetConfig,
    draws_allowed: bool,
    path: &str,
) -> Result<MatchResult, CompetitionError> {
    let home = m.home_team.scores();
    let away = m.away_team.scores();
    if home.len() != away.len() {
        return Err(CompetitionError::ScoreShape {
            match_path: path.to_string(),
            reason: format!(
                "home records {} set(s) but away records {}",
                home.len(),
                away.len()
            ),
        });
    }
    let max_sets = cfg.max_sets() as usize;
    if home.len() > max_sets {
        return Err(CompetitionError::ScoreShape {
            match_path: path.to_string(),
            reason: format!("{} set(s) recorded but maxSets is {}", home.len(), max_sets),
        });
    }

    let mut played = vec![false; home.len()];
    let mut finished = vec![false; home.len()];
    for i in 0..home.len() {
        let (h, a) = (home[i], away[i]);
        let decider = i + 1 == max_sets;
        let (to_win, cap) = if decider {
            (cfg.last_set_points_to_win(), cfg.last_set_max_points())
        } else {
            (cfg.points_to_win(), cfg.max_points())
        };
        let (hi, lo) = (h.max(a), h.min(a));
        if hi > cap {
            return Err(CompetitionError::InvalidSetScores {
                match_path: path.to_string(),
                set: i + 1,
                reason: format!("score {} exceeds the maximum of {}", hi, cap),
            });
        }
        if decider && hi > to_win && hi != cap && hi - lo > cfg.clear_points() {
            return Err(CompetitionError::InvalidSetScores {
                match_path: path.to_string(),
                set: i + 1,
                reason: "more points scored than necessary to win the deciding set".to_string(),
            });
        }
        played[i] = h >= cfg.min_points() || a >= cfg.min_points();
        finished[i] = played[i] && ((hi >= to_win && hi - lo >= cfg.clear_points()) || hi == cap);
    }
    // Scores may not appear in a set following an unfinished one.
    for i in 1..home.len() {
        if played[i] && !finished[i - 1] {
            return Err(CompetitionError::InvalidSetScores {
                match_path: path.to_string(),
                set: i + 1,
                reason: format!("set has points but set {} is not complete", i),
            });
        }
    }

    let mut result = MatchResult::incomplete();
    for i in 0..home.len() {
        if !played[i] {
            continue;
        }
        result.home_points += home[i];
        result.away_points += away[i];
        if finished[i] {
            if home[i] > away[i] {
                result.home_sets += 1;
            } else if away[i] > home[i] {
                result.away_sets += 1;
            }
        }
    }
    let finished_sets = finished.iter().filter(|f| **f).count();

    result.complete = match m.complete {
        Some(explicit) => explicit,
        None => {
            if m.duration.is_some() {
                return Err(CompetitionError::CompleteFlagMissing {
                    match_path: path.to_string(),
                    reason: "a sets match with a duration requires an explicit complete flag",
                });
            }
            result.home_sets >= cfg.sets_to_win()
                || result.away_sets >= cfg.sets_to_win()
                || finished_sets == max_sets
        }
    };
    if !result.complete {
        return Ok(result);
    }
    if result.home_sets == result.away_sets {
        if !draws_allowed {
            return Err(CompetitionError::DrawNotAllowed {
                match_path: path.to_string(),
            });
        }
        result.draw = true;
    } else if result.home_sets > result.away_sets {
        result.winner = Some(Side::Home);
    } else {
        result.winner = Some(Side::Away);
    }
    Ok(result)
}

/// Register `{STAGE:GROUP:MATCH:winner}` / `:loser` for a decided match.
/// Skipped while a side itself still resolves to UNKNOWN, so an outcome key
/// is never bound to the sentinel.
pub fn register_match_outcome(
    refs: &mut RefTable,
    stage_id: &str,
    group_id: &str,
    m: &GroupMatch,
) -> Result<(), CompetitionError> {
    let Some(result) = &m.result else {
        return Ok(());
    };
    if !result.complete || result.draw {
        return Ok(());
    }
    let (winner_expr, loser_expr) = match result.winner {
        Some(Side::Home) => (&m.home_team.id, &m.away_team.id),
        Some(Side::Away) => (&m.away_team.id, &m.home_team.id),
        None => return Ok(()),
    };
    if let Some(winner_id) = refs.resolve(winner_expr).map(str::to_string) {
        let key = format!("{{{}:{}:{}:winner}}", stage_id, group_id, m.id);
        refs.add_reference(&key, &winner_id)?;
    }
    if let Some(loser_id) = refs.resolve(loser_expr).map(str::to_string) {
        let key = format!("{{{}:{}:{}:loser}}", stage_id, group_id, m.id);
        refs.add_reference(&key, &loser_id)?;
    }
    Ok(())
}
