mod common;

use common::tracker;
use nest_tracker::replay::{parse_script, run_script, ScriptStep};
use nest_tracker::{ChatMessage, ChatMessageKind, GameState, ItemObservation, NameTable, TrackerCycleState, TrackerError};
use std::io::Write;

const SESSION: &str = "\
# bird nest, transformed
dialog 995
chat You place your item in the nest.
tick
dialog none   # dialog closed
chat You retrieve your item from the nest, but find that it has been replaced with something else.
dialog 5073
tick

# second cycle ends with a world hop
dialog 1511
chat You place your item in the nest.
tick
state hopping
chat You retrieve your item from the nest.
other You retrieve your item from the nest.
";

#[test]
fn parses_every_directive() {
    let steps = parse_script(SESSION).unwrap();

    assert_eq!(steps.len(), 13);
    assert_eq!(steps[0], ScriptStep::Dialog(Some(995)));
    assert_eq!(steps[1], ScriptStep::Chat(ChatMessage::message_box("You place your item in the nest.")));
    assert_eq!(steps[2], ScriptStep::Tick);
    assert_eq!(steps[3], ScriptStep::Dialog(None));
    assert_eq!(steps[10], ScriptStep::GameState(GameState::Hopping));
    assert_eq!(
        steps[12],
        ScriptStep::Chat(ChatMessage::new(ChatMessageKind::Public, "You retrieve your item from the nest."))
    );
}

#[test]
fn rejects_unknown_directives_with_line_number() {
    let err = parse_script("tick\n\nteleport home\n").unwrap_err();
    match err {
        TrackerError::InvalidScript { line, reason } => {
            assert_eq!(line, 3);
            assert!(reason.contains("teleport"));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(matches!(parse_script("dialog bird"), Err(TrackerError::InvalidScript { line: 1, .. })));
    assert!(matches!(parse_script("state sleeping"), Err(TrackerError::InvalidScript { line: 1, .. })));
}

#[test]
fn replayed_session_submits_one_observation_per_cycle() {
    let (mut tracker, dialog, sink) = tracker();
    let steps = parse_script(SESSION).unwrap();

    let report = run_script(&steps, &dialog, &mut tracker);

    assert_eq!(sink.observations(), vec![ItemObservation::new(995, true)]);
    assert_eq!(report.ticks, 3);
    assert_eq!(
        report.final_state,
        TrackerCycleState {
            awaiting_retrieval: false,
            last_placed_item_id: Some(1511),
        }
    );
}

#[test]
fn pending_lookups_are_flushed_at_end_of_script() {
    let (mut tracker, dialog, sink) = tracker();
    let steps = parse_script("dialog 1038\nchat You place your item in the nest.\n").unwrap();

    let report = run_script(&steps, &dialog, &mut tracker);

    assert_eq!(report.ticks, 1);
    assert!(report.final_state.awaiting_retrieval);
    assert!(sink.observations().is_empty());
}

#[test]
fn name_table_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"5070": "Bird nest", " 995 ": "Clue nest"}}"#).unwrap();

    let names = NameTable::load(file.path()).unwrap();
    assert_eq!(names.len(), 2);

    use nest_tracker::ItemCatalog;
    assert_eq!(names.item_name(995).as_deref(), Some("Clue nest"));
    assert_eq!(names.item_name(1), None);

    assert!(NameTable::from_json(r#"{"nest": "Bird nest"}"#).is_err());
}
