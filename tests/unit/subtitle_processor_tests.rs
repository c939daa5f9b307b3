/*!
 * Tests for subtitle processing functionality
 */

use std::fmt::Write;

use anyhow::Result;
use script_aligner::errors::CaptionError;
use script_aligner::subtitle_processor::{CaptionEntry, CaptionTrack, strip_markup};
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = CaptionEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = CaptionEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test malformed timestamps are rejected
#[test]
fn test_timestamp_parsing_withMalformedTimestamp_shouldFail() {
    assert!(matches!(
        CaptionEntry::parse_timestamp("1:2:3"),
        Err(CaptionError::InvalidTimestamp(_))
    ));
    assert!(CaptionEntry::parse_timestamp("aa:bb:cc,ddd").is_err());
}

/// Test caption entry display formatting
#[test]
fn test_caption_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = CaptionEntry::new(1, 5000, 10000, "Test subtitle");
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

/// Test loading the sample captions from disk
#[test]
fn test_load_withSampleFile_shouldParseAllEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (srt_path, _) = common::create_sample_inputs(temp_dir.path())?;

    let track = CaptionTrack::load(&srt_path)?;

    assert_eq!(track.entries.len(), 7);
    assert_eq!(track.entries[0].text, "Where have you been\nall night?");
    assert_eq!(track.entries[1].text, "Out walking.");
    assert_eq!(track.entries[1].start_ms, 3500);
    assert_eq!(track.entries[6].end_ms, 15000);

    assert_eq!(track.entries[0].single_line_text(), "Where have you been all night?");
    assert_eq!(track.entries[3].text, "Hey, turn that off!");
    Ok(())
}

/// Test a missing file is reported as unreadable
#[test]
fn test_load_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = CaptionTrack::load(temp_dir.path().join("missing.srt"));

    assert!(matches!(result, Err(CaptionError::Unreadable { .. })));
    Ok(())
}

/// Test CRLF line endings, a byte order mark and a missing final blank line
#[test]
fn test_parseSrtString_withWindowsLineEndings_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nSecond";
    let entries = CaptionTrack::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "First");
    assert_eq!(entries[1].text, "Second");
}

/// Test entries that are empty after markup removal keep their position
#[test]
fn test_parseSrtString_withMarkupOnlyEntry_shouldKeepIt() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n<i></i>\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n";
    let entries = CaptionTrack::parse_srt_string(content).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "");
    assert_eq!((entries[1].seq_num, entries[1].text.as_str()), (2, "Kept"));
}

/// Test an empty caption file loads as an empty track
#[test]
fn test_load_withEmptyFile_shouldYieldNoEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    let track = CaptionTrack::load(&path)?;

    assert!(track.entries.is_empty());
    Ok(())
}

/// Test entries whose end precedes their start are kept as written
#[test]
fn test_parseSrtString_withReversedTimes_shouldKeepEntry() {
    let content = "1\n00:00:05,000 --> 00:00:04,000\nBackwards\n";
    let entries = CaptionTrack::parse_srt_string(content).unwrap();

    assert_eq!(entries[0].start_ms, 5000);
    assert_eq!(entries[0].end_ms, 4000);
}

/// Test markup stripping keeps malformed markup verbatim
#[test]
fn test_stripMarkup_nestedAndMalformed() {
    assert_eq!(strip_markup("<b><i>Both</i></b>"), "Both");
    assert_eq!(strip_markup("Line<br/>break"), "Linebreak");
    assert_eq!(strip_markup("<b><i>Crossed</b></i>"), "<b><i>Crossed</b></i>");
    assert_eq!(strip_markup("5 > 3"), "5 > 3");
}
