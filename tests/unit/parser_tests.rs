/*!
 * Tests for block parsing into screenplay events
 */

use script_aligner::app_config::LayoutConfig;
use script_aligner::script::{EventType, ScriptEvent, parse_script};
use crate::common::{SAMPLE_DIALOGUE, SAMPLE_SCRIPT};

/// Test the sample script parses into the expected event sequence
#[test]
fn test_parseScript_sampleScript_shouldProduceTypedEvents() {
    let parsed = parse_script(SAMPLE_SCRIPT, &LayoutConfig::default()).unwrap();

    let types: Vec<EventType> = parsed.events.iter().map(ScriptEvent::event_type).collect();
    assert_eq!(
        types,
        vec![
            EventType::Setting,
            EventType::Description,
            EventType::Dialogue,
            EventType::Dialogue,
            EventType::Dialogue,
            EventType::Description,
            EventType::Dialogue,
            EventType::Dialogue,
            EventType::Dialogue,
            EventType::CameraAction,
            EventType::Setting,
            EventType::Description,
        ]
    );
    assert_eq!(parsed.dialogue_count(), 6);

    for (position, event) in parsed.events.iter().enumerate() {
        assert_eq!(event.original_index, position);
    }
}

/// Test dialogue content, speakers and modifiers
#[test]
fn test_parseScript_sampleScript_shouldExtractDialogueDetails() {
    let parsed = parse_script(SAMPLE_SCRIPT, &LayoutConfig::default()).unwrap();
    let dialogue: Vec<&ScriptEvent> = parsed.events.iter().filter(|event| event.is_dialogue()).collect();

    let contents: Vec<&str> = dialogue.iter().map(|event| event.content.as_str()).collect();
    assert_eq!(contents, SAMPLE_DIALOGUE.to_vec());

    let speakers: Vec<&str> = dialogue
        .iter()
        .map(|event| event.as_dialogue().unwrap().speaker.as_str())
        .collect();
    assert_eq!(speakers, vec!["MARY", "JOHN", "JOHN", "MARY", "JOHN", "ANN"]);

    let john = dialogue[1].as_dialogue().unwrap();
    assert_eq!(john.voice_modifiers, vec!["O.S.".to_string()]);
    assert_eq!(john.dialogue_action, None);
    assert_eq!(dialogue[2].as_dialogue().unwrap().dialogue_action.as_deref(), Some("beat"));
    assert_eq!(dialogue[3].as_dialogue().unwrap().voice_modifiers, vec!["CONT'D".to_string()]);
    assert!(dialogue.iter().all(|event| event.as_dialogue().unwrap().subtitle().is_none()));
}

/// Test multi-line descriptions are joined on one line
#[test]
fn test_parseScript_multilineDescription_shouldJoinLines() {
    let parsed = parse_script(SAMPLE_SCRIPT, &LayoutConfig::default()).unwrap();

    assert_eq!(
        parsed.events[1].content,
        "Rain hammers the window. MARY (40s) scrubs a pan at the sink, not looking up."
    );
    assert_eq!(parsed.events[9].content, "CUT TO:");
    assert_eq!(parsed.events[10].content, "EXT. STREET - DAY");
}

/// Test consecutive transitions merge into one camera action
#[test]
fn test_parseScript_consecutiveTransitions_shouldMerge() {
    let config = LayoutConfig {
        ltol: Some(4),
        ..LayoutConfig::default()
    };
    let text = format!(
        "INT. HALL - DAY\n\nThe lights flicker twice and then go out for good.\n\n{}\n\n{}\n",
        crate::common::indented(43, "FADE OUT."),
        crate::common::indented(42, "THE END."),
    );
    let parsed = parse_script(&text, &config).unwrap();

    let last = parsed.events.last().unwrap();
    assert_eq!(last.event_type(), EventType::CameraAction);
    assert_eq!(last.content, "FADE OUT. THE END.");
    assert_eq!(parsed.events.len(), 3);
}

/// Test a script with only blank lines is rejected
#[test]
fn test_parseScript_blankScript_shouldFail() {
    assert!(parse_script("\n\n  \n", &LayoutConfig::default()).is_err());
}
