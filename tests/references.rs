//! Integration tests for team references across stages: resolution,
//! validation, and the UNKNOWN placeholder.

use serde_json::{json, Value};
use volleyball_competition::{Competition, CompetitionError};

fn two_stage_doc(cup_home: &str, cup_away: &str) -> Value {
    json!({
        "version": "1.0.0",
        "name": "Reference tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"},
            {"id": "TM3", "name": "Charlie"}
        ],
        "stages": [
            {"id": "P", "groups": [{
                "id": "A",
                "type": "league",
                "matchType": "continuous",
                "matches": [{
                    "type": "match",
                    "id": "M1",
                    "complete": true,
                    "homeTeam": {"id": "TM2", "scores": [25]},
                    "awayTeam": {"id": "TM1", "scores": [20]}
                }]
            }]},
            {"id": "C", "groups": [{
                "id": "F",
                "type": "knockout",
                "matchType": "sets",
                "matches": [{
                    "type": "match",
                    "id": "F1",
                    "homeTeam": {"id": cup_home, "scores": []},
                    "awayTeam": {"id": cup_away, "scores": []}
                }]
            }]}
        ]
    })
}

#[test]
fn literal_ids_resolve_to_their_team() {
    let competition = Competition::from_value(two_stage_doc("TM1", "TM3")).unwrap();
    let team = competition.get_team("TM1");
    assert_eq!(team.name, "Alpha");
}

#[test]
fn unregistered_references_resolve_to_unknown() {
    let competition = Competition::from_value(two_stage_doc("TM1", "TM3")).unwrap();
    assert!(competition.get_team("{C:F:F1:winner}").is_unknown());
    assert!(competition.get_team("no-such-team").is_unknown());
}

#[test]
fn league_positions_feed_the_next_stage() {
    let doc = two_stage_doc("{P:A:league:1}", "{P:A:league:2}");
    let competition = Competition::from_value(doc).unwrap();
    let cup = competition.group_match("C", "F", "F1").unwrap();
    assert_eq!(competition.get_team(&cup.home_team.id).id, "TM2");
    assert_eq!(competition.get_team(&cup.away_team.id).id, "TM1");
}

#[test]
fn ternary_expressions_follow_the_comparison() {
    // The pool winner also won M1, so the comparison holds and Charlie
    // takes the bye side.
    let expr = "{P:A:league:1}=={P:A:M1:winner}?TM3:TM1";
    let doc = two_stage_doc(expr, "{P:A:league:2}");
    let competition = Competition::from_value(doc).unwrap();
    assert_eq!(competition.get_team(expr).id, "TM3");
}

fn load_err(doc: Value) -> CompetitionError {
    Competition::from_value(doc).unwrap_err()
}

fn document_errors(err: CompetitionError) -> Vec<String> {
    match err {
        CompetitionError::Document { errors, .. } => errors,
        other => panic!("expected a document error, got {other}"),
    }
}

#[test]
fn references_to_missing_structure_are_rejected() {
    let errors = document_errors(load_err(two_stage_doc("{X:A:league:1}", "TM3")));
    assert!(
        errors.iter().any(|e| e.contains("does not exist")),
        "{errors:?}"
    );
}

#[test]
fn unknown_literal_team_ids_are_rejected() {
    let errors = document_errors(load_err(two_stage_doc("TM9", "TM3")));
    assert!(errors.iter().any(|e| e.contains("TM9")), "{errors:?}");
}

#[test]
fn league_position_past_the_field_is_rejected() {
    // Pool A completed with two teams; position 5 can never be held.
    let errors = document_errors(load_err(two_stage_doc("{P:A:league:5}", "TM3")));
    assert!(
        errors.iter().any(|e| e.contains("league:5") || e.contains("position 5")),
        "{errors:?}"
    );
}

#[test]
fn malformed_reference_grammar_is_rejected() {
    let errors = document_errors(load_err(two_stage_doc("{P:A:league}", "TM3")));
    assert!(!errors.is_empty());
}

#[test]
fn duplicate_team_ids_are_rejected() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Duplicate tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM1", "name": "Bravo"}
        ],
        "stages": []
    });
    let errors = document_errors(load_err(doc));
    assert!(errors.iter().any(|e| e.contains("TM1")), "{errors:?}");
}

#[test]
fn reserved_characters_in_team_ids_are_rejected() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Charset tests",
        "teams": [{"id": "TM:1", "name": "Alpha"}],
        "stages": []
    });
    assert!(Competition::from_value(doc).is_err());
}

#[test]
fn teams_may_not_play_in_two_groups_of_one_stage() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Overlap tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"},
            {"id": "TM3", "name": "Charlie"}
        ],
        "stages": [{"id": "P", "groups": [
            {
                "id": "A",
                "type": "league",
                "matchType": "sets",
                "matches": [{
                    "type": "match",
                    "id": "M1",
                    "homeTeam": {"id": "TM1", "scores": []},
                    "awayTeam": {"id": "TM2", "scores": []}
                }]
            },
            {
                "id": "B",
                "type": "league",
                "matchType": "sets",
                "matches": [{
                    "type": "match",
                    "id": "M2",
                    "homeTeam": {"id": "TM1", "scores": []},
                    "awayTeam": {"id": "TM3", "scores": []}
                }]
            }
        ]}]
    });
    let errors = document_errors(load_err(doc));
    assert!(errors.iter().any(|e| e.contains("TM1")), "{errors:?}");
}

#[test]
fn a_side_may_not_officiate_its_own_match() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Officiating tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "P", "groups": [{
            "id": "A",
            "type": "league",
            "matchType": "sets",
            "matches": [{
                "type": "match",
                "id": "M1",
                "homeTeam": {"id": "TM1", "scores": []},
                "awayTeam": {"id": "TM2", "scores": []},
                "officials": {"team": "TM1"}
            }]
        }]}]
    });
    let errors = document_errors(load_err(doc));
    assert!(errors.iter().any(|e| e.contains("also playing")), "{errors:?}");
}

#[test]
fn drawn_matches_register_no_outcome() {
    let doc = json!({
        "version": "1.0.0",
        "name": "Draw outcome tests",
        "teams": [
            {"id": "TM1", "name": "Alpha"},
            {"id": "TM2", "name": "Bravo"}
        ],
        "stages": [{"id": "P", "groups": [{
            "id": "A",
            "type": "league",
            "matchType": "continuous",
            "drawsAllowed": true,
            "matches": [{
                "type": "match",
                "id": "M1",
                "complete": true,
                "homeTeam": {"id": "TM1", "scores": [20]},
                "awayTeam": {"id": "TM2", "scores": [20]}
            }]
        }]}]
    });
    let competition = Competition::from_value(doc).unwrap();
    assert!(competition.get_team("{P:A:M1:winner}").is_unknown());
}
