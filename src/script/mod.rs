/*!
 * Screenplay parsing.
 *
 * This module turns a plain-text screenplay into typed events:
 * - `layout`: block splitting, tolerance calibration and alignment tagging
 * - `parser`: block-to-event conversion and merging
 * - `events`: the event model and its line-delimited JSON form
 */

pub mod events;
pub mod layout;
pub mod parser;

use std::path::Path;

use log::info;

use crate::app_config::LayoutConfig;
use crate::errors::ScriptError;

// Re-export main types
pub use events::{DialogueDetails, EventKind, EventType, ScriptEvent, SubtitleMatch};
pub use layout::{Block, BlockAlignment, LayoutClassifier, LayoutResult, ScriptGeometry, Tolerances};

/// A parsed screenplay
#[derive(Debug, Clone)]
pub struct ParsedScript {
    /// Events in script order
    pub events: Vec<ScriptEvent>,
    /// Layout statistics from classification
    pub layout: LayoutResult,
}

impl ParsedScript {
    /// Number of dialogue events
    pub fn dialogue_count(&self) -> usize {
        self.events.iter().filter(|event| event.is_dialogue()).count()
    }
}

/// Parse screenplay text into events
pub fn parse_script(text: &str, config: &LayoutConfig) -> Result<ParsedScript, ScriptError> {
    let classifier = LayoutClassifier::new(config)?;
    let layout = classifier.classify_script(text)?;
    let events = parser::parse_blocks(&layout.blocks);

    let parsed = ParsedScript { events, layout };
    info!(
        "Parsed {} events ({} dialogue) from {} blocks, {} dropped",
        parsed.events.len(),
        parsed.dialogue_count(),
        parsed.layout.blocks.len(),
        parsed.layout.dropped.len()
    );

    Ok(parsed)
}

/// Read and parse a screenplay file
pub fn parse_script_file<P: AsRef<Path>>(path: P, config: &LayoutConfig) -> Result<ParsedScript, ScriptError> {
    let text = read_script(path.as_ref())?;
    parse_script(&text, config)
}

/// Read a file of pre-parsed event records
pub fn load_events_file<P: AsRef<Path>>(path: P) -> Result<Vec<ScriptEvent>, ScriptError> {
    let text = read_script(path.as_ref())?;
    events::parse_events_jsonl(&text)
}

fn read_script(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|e| ScriptError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
