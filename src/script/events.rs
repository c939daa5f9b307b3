/*!
 * Typed screenplay events.
 *
 * Each event carries a single logical line of content and its position in
 * the parsed event sequence. Dialogue events additionally carry the speaker,
 * voice modifiers, an optional parenthetical action and, after alignment,
 * the matched subtitle.
 *
 * Events are exchanged as line-delimited JSON records of the form
 * `{"type": ..., "content": ..., "meta": {...}}`.
 */

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AlignmentError, ScriptError};

/// Event type tag as used in serialized records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Dialogue,
    Setting,
    CameraAction,
    Description,
    Metadata,
}

impl EventType {
    /// Record tag for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Setting => "setting",
            Self::CameraAction => "camera_action",
            Self::Description => "description",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dialogue" => Ok(Self::Dialogue),
            "setting" => Ok(Self::Setting),
            "camera_action" => Ok(Self::CameraAction),
            "description" => Ok(Self::Description),
            "metadata" => Ok(Self::Metadata),
            other => Err(ScriptError::UnknownEventType(other.to_string())),
        }
    }
}

/// Caption text and timing projected onto a dialogue event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleMatch {
    /// Caption text with line breaks collapsed
    pub text: String,
    /// Caption start in milliseconds
    pub start_ms: u64,
    /// Caption end in milliseconds
    pub end_ms: u64,
}

/// Dialogue-specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueDetails {
    /// Speaker name without voice modifiers
    pub speaker: String,
    /// Parenthesized modifiers from the speaker line, e.g. "V.O.", "CONT'D"
    pub voice_modifiers: Vec<String>,
    /// Parenthetical action preceding this segment
    pub dialogue_action: Option<String>,
    subtitle: Option<SubtitleMatch>,
}

impl DialogueDetails {
    /// Create dialogue details without a subtitle
    pub fn new(speaker: String, voice_modifiers: Vec<String>, dialogue_action: Option<String>) -> Self {
        Self {
            speaker,
            voice_modifiers,
            dialogue_action,
            subtitle: None,
        }
    }

    /// The matched subtitle, if alignment assigned one
    pub fn subtitle(&self) -> Option<&SubtitleMatch> {
        self.subtitle.as_ref()
    }

    /// Assign the matched subtitle. Fails if one is already assigned.
    pub fn assign_subtitle(&mut self, subtitle: SubtitleMatch) -> Result<(), SubtitleMatch> {
        if self.subtitle.is_some() {
            return Err(subtitle);
        }
        self.subtitle = Some(subtitle);
        Ok(())
    }

    /// Remove and return the assigned subtitle
    pub fn take_subtitle(&mut self) -> Option<SubtitleMatch> {
        self.subtitle.take()
    }
}

/// Variant-specific part of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Dialogue(DialogueDetails),
    Setting,
    CameraAction,
    Description,
    Metadata,
}

/// A typed screenplay event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EventRecord", try_from = "EventRecord")]
pub struct ScriptEvent {
    /// Position in the final event sequence
    pub original_index: usize,
    /// Single logical line of content
    pub content: String,
    /// Variant and variant-specific fields
    pub kind: EventKind,
}

impl ScriptEvent {
    /// Create a non-dialogue event. Dialogue events go through [`ScriptEvent::dialogue`].
    pub fn new(event_type: EventType, content: impl Into<String>) -> Self {
        let kind = match event_type {
            EventType::Dialogue => EventKind::Dialogue(DialogueDetails::new(String::new(), Vec::new(), None)),
            EventType::Setting => EventKind::Setting,
            EventType::CameraAction => EventKind::CameraAction,
            EventType::Description => EventKind::Description,
            EventType::Metadata => EventKind::Metadata,
        };

        Self {
            original_index: 0,
            content: collapse_newlines(&content.into()),
            kind,
        }
    }

    /// Create a dialogue event
    pub fn dialogue(content: impl Into<String>, details: DialogueDetails) -> Self {
        Self {
            original_index: 0,
            content: collapse_newlines(&content.into()),
            kind: EventKind::Dialogue(details),
        }
    }

    /// Type tag of this event
    pub fn event_type(&self) -> EventType {
        match self.kind {
            EventKind::Dialogue(_) => EventType::Dialogue,
            EventKind::Setting => EventType::Setting,
            EventKind::CameraAction => EventType::CameraAction,
            EventKind::Description => EventType::Description,
            EventKind::Metadata => EventType::Metadata,
        }
    }

    /// Whether this is a dialogue event
    pub fn is_dialogue(&self) -> bool {
        matches!(self.kind, EventKind::Dialogue(_))
    }

    /// Dialogue fields, if this is a dialogue event
    pub fn as_dialogue(&self) -> Option<&DialogueDetails> {
        match &self.kind {
            EventKind::Dialogue(details) => Some(details),
            _ => None,
        }
    }

    /// Mutable dialogue fields, if this is a dialogue event
    pub fn as_dialogue_mut(&mut self) -> Option<&mut DialogueDetails> {
        match &mut self.kind {
            EventKind::Dialogue(details) => Some(details),
            _ => None,
        }
    }

    /// Whether adjacent events of this type are merged into one
    pub fn is_mergeable(&self) -> bool {
        matches!(self.kind, EventKind::Metadata | EventKind::CameraAction)
    }

    /// Attach a subtitle to this dialogue event
    pub fn assign_subtitle(&mut self, subtitle: SubtitleMatch) -> Result<(), AlignmentError> {
        let index = self.original_index;
        let details = self
            .as_dialogue_mut()
            .ok_or(AlignmentError::NotDialogue(index))?;
        details
            .assign_subtitle(subtitle)
            .map_err(|_| AlignmentError::AlreadyAssigned(index))
    }
}

/// Replace line breaks with single spaces
pub fn collapse_newlines(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialized form of an event
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventRecord {
    #[serde(rename = "type")]
    event_type: String,
    content: String,
    #[serde(default)]
    meta: EventMeta,
}

// Optional dialogue fields are doubly wrapped: the outer layer is absent for
// other event types, the inner one serializes as an explicit null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EventMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    voice_modifiers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dialogue_actions: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle_start: Option<Option<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtitle_end: Option<Option<u64>>,
}

impl From<ScriptEvent> for EventRecord {
    fn from(event: ScriptEvent) -> Self {
        let event_type = event.event_type().as_str().to_string();
        let meta = match event.kind {
            EventKind::Dialogue(details) => {
                let subtitle = details.subtitle;
                EventMeta {
                    speaker: Some(details.speaker),
                    voice_modifiers: Some(details.voice_modifiers),
                    dialogue_actions: Some(details.dialogue_action),
                    subtitle_start: Some(subtitle.as_ref().map(|s| s.start_ms)),
                    subtitle_end: Some(subtitle.as_ref().map(|s| s.end_ms)),
                    subtitle: Some(subtitle.map(|s| s.text)),
                }
            }
            _ => EventMeta::default(),
        };

        Self {
            event_type,
            content: event.content,
            meta,
        }
    }
}

impl TryFrom<EventRecord> for ScriptEvent {
    type Error = ScriptError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let event_type: EventType = record.event_type.parse()?;
        if event_type != EventType::Dialogue {
            return Ok(ScriptEvent::new(event_type, record.content));
        }

        let meta = record.meta;
        let mut details = DialogueDetails::new(
            meta.speaker.unwrap_or_default(),
            meta.voice_modifiers.unwrap_or_default(),
            meta.dialogue_actions.flatten(),
        );
        if let (Some(text), Some(start_ms), Some(end_ms)) = (
            meta.subtitle.flatten(),
            meta.subtitle_start.flatten(),
            meta.subtitle_end.flatten(),
        ) {
            details.subtitle = Some(SubtitleMatch { text, start_ms, end_ms });
        }

        Ok(ScriptEvent::dialogue(record.content, details))
    }
}

/// Parse line-delimited event records. Blank lines are skipped and
/// `original_index` is assigned by position.
pub fn parse_events_jsonl(content: &str) -> Result<Vec<ScriptEvent>, ScriptError> {
    let mut events = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let record: EventRecord = serde_json::from_str(line).map_err(|e| ScriptError::MalformedEvent {
            line: line_number + 1,
            message: e.to_string(),
        })?;
        let mut event = ScriptEvent::try_from(record)?;
        event.original_index = events.len();
        events.push(event);
    }

    Ok(events)
}

/// Write events as line-delimited JSON records
pub fn write_events_jsonl<W: Write>(events: &[ScriptEvent], mut writer: W) -> anyhow::Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Re-number `original_index` to match positions in `events`
pub fn reindex(events: &mut [ScriptEvent]) {
    for (index, event) in events.iter_mut().enumerate() {
        event.original_index = index;
    }
}
