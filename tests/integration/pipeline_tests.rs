/*!
 * Integration tests for the parse and align workflow
 */

use anyhow::Result;

use script_aligner::alignment::AlignmentSummary;
use script_aligner::app_controller::{AlignOptions, Controller};
use script_aligner::file_utils::FileManager;
use script_aligner::script::{self, EventType};
use crate::common::{self, SAMPLE_DIALOGUE};

/// Test the full workflow writes the report and the aligned events
#[test]
fn test_runAlign_withSampleInputs_shouldAlignAllDialogue() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = common::create_temp_dir()?;
    let (srt_path, script_path) = common::create_sample_inputs(temp_dir.path())?;
    let html_path = temp_dir.path().join("out").join("report.html");
    let events_path = temp_dir.path().join("out").join("events.jsonl");

    let controller = Controller::new_for_test()?;
    let options = AlignOptions {
        output_html: html_path.clone(),
        save_events: Some(events_path.clone()),
        events_input: false,
    };
    let outcome = controller.run_align(&srt_path, &script_path, &options)?;

    assert_eq!(outcome.summary(), AlignmentSummary { matched: 6, dialogue_only: 0, caption_only: 1 });
    assert_eq!(outcome.assigned, 6);
    assert!((outcome.alignment.score - 5.9).abs() < 1e-9);

    // The report flags the caption that has no script line
    let html = FileManager::read_to_string(&html_path)?;
    assert!(html.contains("<tr class=\"unmatched\"><td></td><td>Hey, turn that off!</td></tr>"));
    assert!(html.contains("6 matched, 0 script-only, 1 subtitle-only"));

    // The saved events carry the caption text and timing
    let events = script::load_events_file(&events_path)?;
    assert_eq!(events.len(), 12);

    let dialogue: Vec<_> = events.iter().filter_map(|event| event.as_dialogue()).collect();
    assert_eq!(dialogue.len(), SAMPLE_DIALOGUE.len());
    for details in &dialogue {
        assert!(details.subtitle().is_some());
    }
    let walking = dialogue[1].subtitle().unwrap();
    assert_eq!(walking.text, "Out walking.");
    assert_eq!((walking.start_ms, walking.end_ms), (3500, 4500));
    assert_eq!(dialogue[0].subtitle().unwrap().text, "Where have you been all night?");
    assert_eq!(dialogue[3].subtitle().unwrap().start_ms, 9000);
    Ok(())
}

/// Test parsing alone writes one JSON record per event
#[test]
fn test_runParse_withSampleScript_shouldWriteEvents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (_, script_path) = common::create_sample_inputs(temp_dir.path())?;
    let output = temp_dir.path().join("sample.jsonl");

    let controller = Controller::new_for_test()?;
    let events = controller.run_parse(&script_path, &output)?;

    let content = FileManager::read_to_string(&output)?;
    assert_eq!(content.lines().count(), events.len());

    let first: serde_json::Value = serde_json::from_str(content.lines().next().unwrap())?;
    assert_eq!(first["type"], "setting");
    assert_eq!(first["content"], "INT. KITCHEN - NIGHT");

    let reloaded = script::load_events_file(&output)?;
    assert_eq!(reloaded, events);
    assert_eq!(reloaded[9].event_type(), EventType::CameraAction);
    Ok(())
}

/// Test aligning pre-parsed events gives the same result as parsing the script
#[test]
fn test_runAlign_withEventsInput_shouldMatchScriptInput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt_path, script_path) = common::create_sample_inputs(temp_dir.path())?;
    let events_path = temp_dir.path().join("aligned.jsonl");

    let controller = Controller::new_for_test()?;
    let mut options = AlignOptions::new(temp_dir.path().join("first.html"));
    options.save_events = Some(events_path.clone());
    let from_script = controller.run_align(&srt_path, &script_path, &options)?;

    // The saved events already carry subtitles; re-aligning replaces them
    let mut options = AlignOptions::new(temp_dir.path().join("second.html"));
    options.events_input = true;
    let from_events = controller.run_align(&srt_path, &events_path, &options)?;

    assert_eq!(from_events.alignment, from_script.alignment);
    assert_eq!(from_events.assigned, 6);
    Ok(())
}

/// Test a missing subtitle file fails before any output is written
#[test]
fn test_runAlign_withMissingSubtitles_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (_, script_path) = common::create_sample_inputs(temp_dir.path())?;
    let html_path = temp_dir.path().join("report.html");

    let controller = Controller::new_for_test()?;
    let result = controller.run_align(
        &temp_dir.path().join("missing.srt"),
        &script_path,
        &AlignOptions::new(&html_path),
    );

    assert!(result.is_err());
    assert!(!html_path.exists());
    Ok(())
}

/// Test an explicit left tolerance gives the same events as calibration
#[test]
fn test_runParse_withExplicitLtol_shouldMatchCalibratedParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (_, script_path) = common::create_sample_inputs(temp_dir.path())?;

    let calibrated = Controller::new_for_test()?.run_parse(&script_path, &temp_dir.path().join("a.jsonl"))?;

    let mut config = Controller::new_for_test()?.config().clone();
    config.layout.ltol = Some(8);
    let fixed = Controller::with_config(config)?.run_parse(&script_path, &temp_dir.path().join("b.jsonl"))?;

    assert_eq!(calibrated, fixed);
    Ok(())
}

/// Test an empty subtitle file leaves every dialogue line unmatched
#[test]
fn test_runAlign_withEmptySubtitles_shouldReportScriptOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (_, script_path) = common::create_sample_inputs(temp_dir.path())?;
    let srt_path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;
    let html_path = temp_dir.path().join("report.html");

    let controller = Controller::new_for_test()?;
    let outcome = controller.run_align(&srt_path, &script_path, &AlignOptions::new(&html_path))?;

    assert_eq!(outcome.summary(), AlignmentSummary { matched: 0, dialogue_only: 6, caption_only: 0 });
    assert_eq!(outcome.assigned, 0);
    assert!((outcome.alignment.score + 0.6).abs() < 1e-9);
    assert!(FileManager::read_to_string(&html_path)?.contains("0 matched, 6 script-only, 0 subtitle-only"));
    Ok(())
}

/// Test a script without content aligns to nothing but still writes a report
#[test]
fn test_runAlign_withBlankScript_shouldReportSubtitleOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt_path, _) = common::create_sample_inputs(temp_dir.path())?;
    let script_path = common::create_test_file(temp_dir.path(), "blank.txt", "\n\n")?;
    let html_path = temp_dir.path().join("report.html");

    let controller = Controller::new_for_test()?;
    let outcome = controller.run_align(&srt_path, &script_path, &AlignOptions::new(&html_path))?;

    assert_eq!(outcome.summary(), AlignmentSummary { matched: 0, dialogue_only: 0, caption_only: 7 });
    assert!(html_path.exists());
    Ok(())
}
