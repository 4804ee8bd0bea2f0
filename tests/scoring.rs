//! Integration tests for match scoring: continuous and set-based completion.

use serde_json::{json, Value};
use volleyball_competition::{Competition, CompetitionError};

fn doc_with_group(group: Value) -> Value {
    json!({
        "version": "1.0.0",
        "name": "Scoring tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "L", "groups": [group]}]
    })
}

fn load(group: Value) -> Result<Competition, CompetitionError> {
    Competition::from_value(doc_with_group(group))
}

fn continuous_match(home: Value, away: Value, complete: Value) -> Value {
    json!({
        "id": "G",
        "type": "league",
        "matchType": "continuous",
        "matches": [{
            "type": "match",
            "id": "M1",
            "complete": complete,
            "homeTeam": {"id": "TM1", "scores": home},
            "awayTeam": {"id": "TM2", "scores": away}
        }]
    })
}

#[test]
fn continuous_draw_fails_when_draws_disallowed() {
    let err = load(continuous_match(json!([5]), json!([5]), json!(true))).unwrap_err();
    assert!(matches!(err, CompetitionError::DrawNotAllowed { .. }), "{err}");
}

#[test]
fn continuous_draw_allowed_has_no_winner() {
    let mut group = continuous_match(json!([5]), json!([5]), json!(true));
    group["drawsAllowed"] = json!(true);
    let competition = Competition::from_value(doc_with_group(group)).unwrap();
    let m = competition.group_match("L", "G", "M1").unwrap();
    assert!(m.is_complete());
    assert!(m.is_draw());
    assert!(matches!(
        competition.match_winner("L", "G", "M1"),
        Err(CompetitionError::NoWinner { .. })
    ));
}

#[test]
fn continuous_zero_zero_draw_is_tolerated() {
    // A 0-0 finish (double forfeit) is exempt from the draws-disallowed rule.
    let competition = load(continuous_match(json!([0]), json!([0]), json!(true))).unwrap();
    assert!(competition.group_match("L", "G", "M1").unwrap().is_draw());
}

#[test]
fn continuous_requires_explicit_complete_flag() {
    let group = json!({
        "id": "G",
        "type": "league",
        "matchType": "continuous",
        "matches": [{
            "type": "match",
            "id": "M1",
            "homeTeam": {"id": "TM1", "scores": [5]},
            "awayTeam": {"id": "TM2", "scores": [3]}
        }]
    });
    let err = load(group).unwrap_err();
    assert!(matches!(err, CompetitionError::CompleteFlagMissing { .. }), "{err}");
}

#[test]
fn continuous_rejects_multiple_scores() {
    let err = load(continuous_match(json!([5, 6]), json!([3, 1]), json!(true))).unwrap_err();
    assert!(matches!(err, CompetitionError::ScoreShape { .. }), "{err}");
}

fn sets_group(sets: Value, home: Value, away: Value) -> Value {
    json!({
        "id": "G",
        "type": "league",
        "matchType": "sets",
        "sets": sets,
        "matches": [{
            "type": "match",
            "id": "M1",
            "homeTeam": {"id": "TM1", "scores": home},
            "awayTeam": {"id": "TM2", "scores": away}
        }]
    })
}

#[test]
fn straight_sets_win_derives_completion() {
    let competition = load(sets_group(
        json!({}),
        json!([25, 25, 25]),
        json!([20, 20, 20]),
    ))
    .unwrap();
    let m = competition.group_match("L", "G", "M1").unwrap();
    assert!(m.is_complete());
    let result = m.result.as_ref().unwrap();
    assert_eq!((result.home_sets, result.away_sets), (3, 0));
    assert_eq!(competition.match_winner("L", "G", "M1").unwrap().id, "TM1");
    assert_eq!(competition.match_loser("L", "G", "M1").unwrap().id, "TM2");
    // Registered outcome references resolve too.
    assert_eq!(competition.get_team("{L:G:M1:winner}").id, "TM1");
    assert_eq!(competition.get_team("{L:G:M1:loser}").id, "TM2");
}

#[test]
fn split_sets_stay_incomplete_until_decider() {
    let sets = json!({"maxSets": 3, "setsToWin": 2});
    let competition = load(sets_group(sets.clone(), json!([25, 23]), json!([23, 25]))).unwrap();
    let m = competition.group_match("L", "G", "M1").unwrap();
    assert!(!m.is_complete());
    let result = m.result.as_ref().unwrap();
    assert_eq!((result.home_sets, result.away_sets), (1, 1));

    // An unplayed 0-0 third set is below minPoints and simply ignored.
    let competition =
        load(sets_group(sets, json!([25, 23, 0]), json!([23, 25, 0]))).unwrap();
    assert!(!competition.group_match("L", "G", "M1").unwrap().is_complete());
}

#[test]
fn decider_set_win_completes_the_match() {
    let sets = json!({"maxSets": 3, "setsToWin": 2});
    let competition =
        load(sets_group(sets, json!([25, 23, 15]), json!([23, 25, 12]))).unwrap();
    let m = competition.group_match("L", "G", "M1").unwrap();
    assert!(m.is_complete());
    assert_eq!(competition.match_winner("L", "G", "M1").unwrap().id, "TM1");
}

#[test]
fn decider_set_rejects_more_points_than_necessary() {
    let sets = json!({"maxSets": 3, "setsToWin": 2});
    let err = load(sets_group(sets, json!([25, 20, 16]), json!([20, 25, 10]))).unwrap_err();
    match err {
        CompetitionError::InvalidSetScores { set, .. } => assert_eq!(set, 3),
        other => panic!("expected InvalidSetScores, got {other}"),
    }
}

#[test]
fn decider_set_allows_two_point_finish_past_fifteen() {
    let sets = json!({"maxSets": 3, "setsToWin": 2});
    let competition =
        load(sets_group(sets, json!([25, 20, 17]), json!([20, 25, 15]))).unwrap();
    assert!(competition.group_match("L", "G", "M1").unwrap().is_complete());
}

#[test]
fn no_points_after_an_unfinished_set() {
    let err = load(sets_group(json!({}), json!([10, 25]), json!([5, 20]))).unwrap_err();
    match err {
        CompetitionError::InvalidSetScores { set, .. } => assert_eq!(set, 2),
        other => panic!("expected InvalidSetScores, got {other}"),
    }
}

#[test]
fn sets_match_with_duration_needs_explicit_flag() {
    let group = json!({
        "id": "G",
        "type": "league",
        "matchType": "sets",
        "matches": [{
            "type": "match",
            "id": "M1",
            "duration": "1:00",
            "homeTeam": {"id": "TM1", "scores": [25, 25, 25]},
            "awayTeam": {"id": "TM2", "scores": [20, 20, 20]}
        }]
    });
    let err = load(group).unwrap_err();
    assert!(matches!(err, CompetitionError::CompleteFlagMissing { .. }), "{err}");
}

#[test]
fn explicit_flag_overrides_derived_completion() {
    let group = json!({
        "id": "G",
        "type": "league",
        "matchType": "sets",
        "matches": [{
            "type": "match",
            "id": "M1",
            "complete": false,
            "homeTeam": {"id": "TM1", "scores": [25, 25, 25]},
            "awayTeam": {"id": "TM2", "scores": [20, 20, 20]}
        }]
    });
    let competition = load(group).unwrap();
    assert!(!competition.group_match("L", "G", "M1").unwrap().is_complete());
}

#[test]
fn knockout_sets_draw_is_rejected() {
    // maxSets 2 can end one set each; knockouts never allow draws.
    let group = json!({
        "id": "G",
        "type": "knockout",
        "matchType": "sets",
        "sets": {"maxSets": 2, "setsToWin": 2},
        "matches": [{
            "type": "match",
            "id": "M1",
            "homeTeam": {"id": "TM1", "scores": [25, 23]},
            "awayTeam": {"id": "TM2", "scores": [23, 25]}
        }]
    });
    let err = load(group).unwrap_err();
    assert!(matches!(err, CompetitionError::DrawNotAllowed { .. }), "{err}");
}
