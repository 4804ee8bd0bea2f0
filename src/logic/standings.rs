//! League standings: accumulation over completed matches and the ordering
//! comparator driven by the group's configured criteria.

use crate::logic::refs::RefTable;
use crate::logic::result::Side;
use crate::models::group::{League, MatchType, OrderingCriterion};
use crate::models::matches::MatchEntry;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row of a league table.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsEntry {
    pub team_id: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub sets_for: u32,
    pub sets_against: u32,
    pub sets_diff: i64,
    pub points_for: u32,
    pub points_against: u32,
    pub points_diff: i64,
    pub league_points: i64,
    /// Wins against each opponent; a 0 entry marks a lost pairing.
    pub head_to_head: HashMap<String, i64>,
}

impl StandingsEntry {
    fn new(team_id: &str) -> Self {
        StandingsEntry {
            team_id: team_id.to_string(),
            played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            sets_for: 0,
            sets_against: 0,
            sets_diff: 0,
            points_for: 0,
            points_against: 0,
            points_diff: 0,
            league_points: 0,
            head_to_head: HashMap::new(),
        }
    }
}

/// Ordered league table. Entries exist for every team with at least one
/// completed match.
#[derive(Clone, Debug, Default, Serialize)]
pub struct StandingsTable {
    pub entries: Vec<StandingsEntry>,
}

impl StandingsTable {
    pub fn entry(&self, team_id: &str) -> Option<&StandingsEntry> {
        self.entries.iter().find(|e| e.team_id == team_id)
    }

    /// 1-based position of a team, if it is in the table.
    pub fn position(&self, team_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.team_id == team_id).map(|i| i + 1)
    }
}

/// Compute the standings for a league group. Completed matches are folded in
/// document order; matches with an unresolved side are skipped (they cannot
/// be attributed yet).
pub fn compute_standings(
    league: &League,
    refs: &RefTable,
    team_names: &HashMap<String, String>,
) -> StandingsTable {
    let config = league.league.clone().unwrap_or_default();
    let points = config.points.clone().unwrap_or_default();
    let sets_mode = league.match_type == MatchType::Sets;

    let mut rows: HashMap<String, StandingsEntry> = HashMap::new();
    for m in league.matches.iter().flatten().filter_map(MatchEntry::as_match) {
        let Some(result) = &m.result else { continue };
        if !result.complete {
            continue;
        }
        let (Some(home_id), Some(away_id)) =
            (refs.resolve(&m.home_team.id), refs.resolve(&m.away_team.id))
        else {
            continue;
        };
        let (home_id, away_id) = (home_id.to_string(), away_id.to_string());
        rows.entry(home_id.clone())
            .or_insert_with(|| StandingsEntry::new(&home_id));
        rows.entry(away_id.clone())
            .or_insert_with(|| StandingsEntry::new(&away_id));

        for (id, us, them, our_sets, their_sets) in [
            (&home_id, result.home_points, result.away_points, result.home_sets, result.away_sets),
            (&away_id, result.away_points, result.home_points, result.away_sets, result.home_sets),
        ] {
            let Some(row) = rows.get_mut(id) else { continue };
            row.played += 1;
            row.points_for += us;
            row.points_against += them;
            if sets_mode {
                row.sets_for += our_sets;
                row.sets_against += their_sets;
                row.league_points += points.per_set() * our_sets as i64;
            }
            row.league_points += points.played();
        }

        if result.draw {
            for id in [&home_id, &away_id] {
                if let Some(row) = rows.get_mut(id) {
                    row.draws += 1;
                }
            }
        } else if let Some(winner) = result.winner {
            let (winner_id, loser_id) = match winner {
                Side::Home => (&home_id, &away_id),
                Side::Away => (&away_id, &home_id),
            };
            let by_one = sets_mode && result.home_sets.abs_diff(result.away_sets) == 1;
            if let Some(row) = rows.get_mut(winner_id) {
                row.wins += 1;
                *row.head_to_head.entry(loser_id.clone()).or_insert(0) += 1;
                row.league_points += if by_one { points.win_by_one() } else { points.win() };
            }
            if let Some(row) = rows.get_mut(loser_id) {
                row.losses += 1;
                row.head_to_head.entry(winner_id.clone()).or_insert(0);
                row.league_points += if by_one { points.lose_by_one() } else { points.lose() };
            }
        }

        for (id, side) in [(&home_id, &m.home_team), (&away_id, &m.away_team)] {
            let Some(row) = rows.get_mut(id) else { continue };
            if side.is_forfeit() {
                row.league_points -= points.forfeit();
            }
            row.league_points += side.bonus_points() - side.penalty_points();
        }
    }

    let mut entries: Vec<StandingsEntry> = rows.into_values().collect();
    for e in &mut entries {
        e.points_diff = e.points_for as i64 - e.points_against as i64;
        e.sets_diff = e.sets_for as i64 - e.sets_against as i64;
    }

    let criteria = config.criteria();
    entries.sort_by(|a, b| {
        for criterion in &criteria {
            let ord = compare_criterion(a, b, *criterion);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        let name = |e: &StandingsEntry| {
            team_names
                .get(&e.team_id)
                .cloned()
                .unwrap_or_else(|| e.team_id.clone())
        };
        name(a).cmp(&name(b))
    });
    StandingsTable { entries }
}

fn compare_criterion(a: &StandingsEntry, b: &StandingsEntry, c: OrderingCriterion) -> Ordering {
    use OrderingCriterion::*;
    match c {
        LeaguePoints => b.league_points.cmp(&a.league_points),
        Wins => b.wins.cmp(&a.wins),
        Losses => b.losses.cmp(&a.losses),
        HeadToHead => {
            // Signed differential over the pair; teams that never decided a
            // match between them tie on this criterion.
            let diff = match (a.head_to_head.get(&b.team_id), b.head_to_head.get(&a.team_id)) {
                (Some(x), Some(y)) => x - y,
                _ => 0,
            };
            0.cmp(&diff)
        }
        PointsFor => b.points_for.cmp(&a.points_for),
        // PA and SA rank the side that conceded fewest first.
        PointsAgainst => a.points_against.cmp(&b.points_against),
        PointsDifference => b.points_diff.cmp(&a.points_diff),
        SetsFor => b.sets_for.cmp(&a.sets_for),
        SetsAgainst => a.sets_against.cmp(&b.sets_against),
        SetsDifference => b.sets_diff.cmp(&a.sets_diff),
    }
}
