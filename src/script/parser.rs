/*!
 * Conversion of classified blocks into typed screenplay events.
 *
 * - Centered blocks whose first line is upper-case are dialogue: the first
 *   line names the speaker, parenthetical lines split the speech into
 *   segments. Other centered blocks are metadata.
 * - Left blocks are scene headings, camera directions or description.
 * - Right blocks are camera directions (transitions) or metadata.
 *
 * Adjacent metadata and adjacent camera directions are merged afterwards.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::script::events::{DialogueDetails, EventType, ScriptEvent, reindex};
use crate::script::layout::{Block, BlockAlignment};

static VOICE_MODIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(.*?\)").expect("Invalid voice modifier regex")
});

/// Parse classified blocks into an ordered event sequence with
/// `original_index` assigned
pub fn parse_blocks(blocks: &[Block]) -> Vec<ScriptEvent> {
    let mut events = Vec::new();

    for block in blocks {
        if block.lines.is_empty() {
            continue;
        }

        match block.alignment {
            BlockAlignment::Center | BlockAlignment::CenterSplit => {
                events.extend(parse_center_block(&block.lines))
            }
            BlockAlignment::Left => events.push(parse_left_block(&block.lines)),
            BlockAlignment::Right => events.push(parse_right_block(&block.lines)),
            BlockAlignment::Unknown => {
                debug!("Skipping unclassified block of {} lines", block.lines.len());
            }
        }
    }

    let mut merged = merge_adjacent(events);
    reindex(&mut merged);
    merged
}

/// Parse a centered block as dialogue or metadata
pub fn parse_center_block(lines: &[String]) -> Vec<ScriptEvent> {
    let Some((speaker_line, speech)) = lines.split_first() else {
        return Vec::new();
    };

    if speech.is_empty() || !is_upper(speaker_line) {
        return vec![ScriptEvent::new(EventType::Metadata, lines.join(" "))];
    }

    let (speaker, voice_modifiers) = split_speaker(speaker_line);

    let mut events = Vec::new();
    let mut segment: Vec<&str> = Vec::new();
    let mut action: Option<String> = None;

    for line in speech {
        let line = line.trim();
        match parenthetical(line) {
            Some(cue) => {
                if !segment.is_empty() {
                    events.push(ScriptEvent::dialogue(
                        segment.join(" "),
                        DialogueDetails::new(speaker.clone(), voice_modifiers.clone(), action.clone()),
                    ));
                    segment.clear();
                }
                action = Some(cue.to_string());
            }
            None => segment.push(line),
        }
    }

    if !segment.is_empty() {
        events.push(ScriptEvent::dialogue(
            segment.join(" "),
            DialogueDetails::new(speaker, voice_modifiers, action),
        ));
    }

    events
}

/// Parse a left-aligned block
pub fn parse_left_block(lines: &[String]) -> ScriptEvent {
    let content = lines.join(" ");
    let first = lines.first().map(String::as_str).unwrap_or_default();

    let event_type = if first.to_uppercase() == first {
        if first.contains("INT") || first.contains("EXT") {
            EventType::Setting
        } else {
            EventType::CameraAction
        }
    } else {
        EventType::Description
    };

    ScriptEvent::new(event_type, content)
}

/// Parse a right-aligned block
pub fn parse_right_block(lines: &[String]) -> ScriptEvent {
    let content = lines.join(" ");
    let event_type = match lines.first() {
        Some(first) if is_upper(first) => EventType::CameraAction,
        _ => EventType::Metadata,
    };

    ScriptEvent::new(event_type, content)
}

/// Merge runs of adjacent metadata or camera-action events of the same type
pub fn merge_adjacent(events: Vec<ScriptEvent>) -> Vec<ScriptEvent> {
    let mut merged: Vec<ScriptEvent> = Vec::with_capacity(events.len());

    for event in events {
        if let Some(last) = merged.last_mut() {
            if event.is_mergeable() && last.event_type() == event.event_type() {
                last.content.push(' ');
                last.content.push_str(&event.content);
                continue;
            }
        }
        merged.push(event);
    }

    merged
}

/// Speaker name and parenthesized voice modifiers from a speaker line
pub fn split_speaker(line: &str) -> (String, Vec<String>) {
    let modifiers: Vec<String> = VOICE_MODIFIER_REGEX
        .find_iter(line)
        .map(|found| {
            let text = found.as_str();
            text[1..text.len() - 1].to_string()
        })
        .collect();

    if modifiers.is_empty() {
        return (line.trim().to_string(), modifiers);
    }

    let speaker = VOICE_MODIFIER_REGEX.replace_all(line, "").trim().to_string();
    (speaker, modifiers)
}

/// Inner text of a line that is entirely one parenthetical
fn parenthetical(line: &str) -> Option<&str> {
    line.strip_prefix('(')?.strip_suffix(')')
}

/// True if the text has at least one cased character and none in lower case
pub fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}
