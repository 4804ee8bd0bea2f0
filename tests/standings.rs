//! Integration tests for league table computation and ordering criteria.

use serde_json::{json, Value};
use volleyball_competition::Competition;

fn four_team_doc(group: Value) -> Value {
    json!({
        "version": "1.0.0",
        "name": "Standings tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"},
            {"id": "TM3", "name": "Charlie"},
            {"id": "TM4", "name": "Delta"}
        ],
        "stages": [{"id": "L", "groups": [group]}]
    })
}

fn continuous(id: &str, home: &str, hs: u32, away: &str, as_: u32) -> Value {
    json!({
        "type": "match",
        "id": id,
        "complete": true,
        "homeTeam": {"id": home, "scores": [hs]},
        "awayTeam": {"id": away, "scores": [as_]}
    })
}

/// Alpha and Bravo both win twice; Alpha beat Bravo head to head but
/// Bravo scored more points overall. Flat win points keep them level.
fn head_to_head_group(ordering: Value) -> Value {
    json!({
        "id": "G",
        "type": "league",
        "matchType": "continuous",
        "league": {
            "ordering": ordering,
            "points": {"win": 1, "lose": 0}
        },
        "matches": [
            continuous("M1", "TM1", 25, "TM2", 20),
            continuous("M2", "TM1", 25, "TM4", 10),
            continuous("M3", "TM2", 40, "TM3", 2),
            continuous("M4", "TM2", 40, "TM4", 2)
        ]
    })
}

fn table_order(competition: &Competition) -> Vec<String> {
    let group = competition.group("L", "G").unwrap();
    group
        .standings()
        .unwrap()
        .entries
        .iter()
        .map(|e| e.team_id.clone())
        .collect()
}

#[test]
fn head_to_head_breaks_the_tie_before_points_for() {
    let doc = four_team_doc(head_to_head_group(json!(["PTS", "H2H", "PF"])));
    let competition = Competition::from_value(doc).unwrap();
    assert_eq!(table_order(&competition), ["TM1", "TM2", "TM4", "TM3"]);
}

#[test]
fn criterion_permutation_changes_the_table() {
    let doc = four_team_doc(head_to_head_group(json!(["PTS", "PF"])));
    let competition = Competition::from_value(doc).unwrap();
    // Bravo's 80 points for beat Alpha's 50 once head-to-head is dropped.
    assert_eq!(table_order(&competition), ["TM2", "TM1", "TM4", "TM3"]);
}

#[test]
fn points_against_sorts_ascending() {
    let doc = four_team_doc(head_to_head_group(json!(["PA"])));
    let competition = Competition::from_value(doc).unwrap();
    // PA: Bravo 29, Alpha 30, Charlie 40, Delta 65. Fewest conceded first.
    assert_eq!(table_order(&competition), ["TM2", "TM1", "TM3", "TM4"]);
}

#[test]
fn default_league_points_reward_narrow_set_results() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Set margin tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "L", "groups": [{
            "id": "G",
            "type": "league",
            "matchType": "sets",
            "sets": {"maxSets": 5, "setsToWin": 3},
            "matches": [{
                "type": "match",
                "id": "M1",
                "homeTeam": {"id": "TM1", "scores": [25, 20, 25, 20, 15]},
                "awayTeam": {"id": "TM2", "scores": [20, 25, 20, 25, 10]}
            }]
        }]}]
    });
    let competition = Competition::from_value(doc).unwrap();
    let group = competition.group("L", "G").unwrap();
    let table = group.standings().unwrap();
    let winner = table.entry("TM1").unwrap();
    let loser = table.entry("TM2").unwrap();
    // A 3-2 win earns winByOne points, the loser earns loseByOne.
    assert_eq!(winner.league_points, 2);
    assert_eq!(loser.league_points, 1);
    assert_eq!((winner.sets_for, winner.sets_against), (3, 2));
    assert_eq!(winner.points_diff, -loser.points_diff);
}

#[test]
fn forfeit_and_bonus_points_adjust_the_total() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Adjustment tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "L", "groups": [{
            "id": "G",
            "type": "league",
            "matchType": "continuous",
            "league": {
                "points": {"win": 3, "lose": 0, "forfeit": 2}
            },
            "matches": [{
                "type": "match",
                "id": "M1",
                "complete": true,
                "homeTeam": {"id": "TM1", "scores": [25], "bonusPoints": 1},
                "awayTeam": {"id": "TM2", "scores": [0], "forfeit": true, "penaltyPoints": 1}
            }]
        }]}]
    });
    let competition = Competition::from_value(doc).unwrap();
    let table = competition.group("L", "G").unwrap().standings().unwrap();
    // Winner: 3 for the win plus 1 bonus. Loser: 0 minus the forfeit
    // deduction and the explicit penalty.
    assert_eq!(table.entry("TM1").unwrap().league_points, 4);
    assert_eq!(table.entry("TM2").unwrap().league_points, -3);
}

#[test]
fn standings_only_list_teams_with_completed_matches() {
    let doc = four_team_doc(json!({
        "id": "G",
        "type": "league",
        "matchType": "continuous",
        "matches": [
            continuous("M1", "TM1", 25, "TM2", 20),
            {
                "type": "match",
                "id": "M2",
                "complete": false,
                "homeTeam": {"id": "TM3", "scores": []},
                "awayTeam": {"id": "TM4", "scores": []}
            }
        ]
    }));
    let competition = Competition::from_value(doc).unwrap();
    let table = competition.group("L", "G").unwrap().standings().unwrap();
    assert_eq!(table.entries.len(), 2);
    assert!(table.entry("TM3").is_none());
}

#[test]
fn completed_league_registers_position_references() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Position tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "P", "groups": [{
            "id": "A",
            "type": "league",
            "matchType": "continuous",
            "matches": [continuous("M1", "TM2", 25, "TM1", 20)]
        }]}]
    });
    let competition = Competition::from_value(doc).unwrap();
    assert_eq!(competition.get_team("{P:A:league:1}").id, "TM2");
    assert_eq!(competition.get_team("{P:A:league:2}").id, "TM1");
}

#[test]
fn name_orders_otherwise_identical_teams() {
    // Two drawn teams are identical on every criterion; Alpha sorts first.
    let doc = json!({
        "version": "1.0.0",
        "name": "Name tie tests",
        "teams": [
            {"id": "TM1", "name": "Bravo"},
            {"id": "TM2", "name": "Alpha"}
        ],
        "stages": [{"id": "L", "groups": [{
            "id": "G",
            "type": "league",
            "matchType": "continuous",
            "drawsAllowed": true,
            "matches": [continuous("M1", "TM1", 20, "TM2", 20)]
        }]}]
    });
    let competition = Competition::from_value(doc).unwrap();
    let table = competition.group("L", "G").unwrap().standings().unwrap();
    assert_eq!(table.entries[0].team_id, "TM2");
}
