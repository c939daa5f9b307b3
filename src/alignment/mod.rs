/*!
 * Dialogue-to-caption alignment.
 *
 * - `normalizer`: text canonicalization with a shared cache
 * - `scorer`: thresholded similarity scoring of one pair
 * - `needleman`: global alignment of the two sequences
 *
 * This module ties them together: it extracts the dialogue lines from a
 * parsed script, aligns them against the caption texts and writes the
 * matched captions back onto the dialogue events.
 */

pub mod needleman;
pub mod normalizer;
pub mod scorer;

use log::{debug, info};

use crate::errors::AlignmentError;
use crate::script::events::{ScriptEvent, SubtitleMatch};
use crate::subtitle_processor::CaptionEntry;

// Re-export main types
pub use needleman::{Alignment, AlignmentMatrix, AlignmentPair, AlignmentSummary, Direction, GAP_PENALTY, NeedlemanWunsch};
pub use normalizer::{BasicNormalizer, CachedNormalizer, TextNormalizer, global_normalizer, init_global_normalizer};
pub use scorer::{MatchScorer, PairScorer};

/// A dialogue event's text together with its position in the event list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    /// Position of the dialogue event in the event sequence
    pub event_index: usize,
    /// Dialogue content
    pub text: String,
}

impl AsRef<str> for DialogueLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Extract dialogue lines in script order
pub fn dialogue_lines(events: &[ScriptEvent]) -> Vec<DialogueLine> {
    events
        .iter()
        .enumerate()
        .filter(|(_, event)| event.is_dialogue())
        .map(|(event_index, event)| DialogueLine {
            event_index,
            text: event.content.clone(),
        })
        .collect()
}

/// Result of aligning a script against a caption track
#[derive(Debug, Clone)]
pub struct AlignmentOutcome {
    /// The dialogue side of the alignment
    pub dialogue: Vec<DialogueLine>,
    /// The caption side of the alignment, one line per caption
    pub captions: Vec<String>,
    /// Ordered pairs and total score
    pub alignment: Alignment,
    /// Number of dialogue events that received a subtitle
    pub assigned: usize,
}

impl AlignmentOutcome {
    /// Pair counts of the alignment
    pub fn summary(&self) -> AlignmentSummary {
        self.alignment.summary()
    }
}

/// Write the matched captions onto their dialogue events.
///
/// Only pairs with both sides present assign a subtitle. Every index and
/// every target event is checked before any event is touched, so a failed
/// projection leaves the events unchanged.
pub fn project_alignment(
    events: &mut [ScriptEvent],
    dialogue: &[DialogueLine],
    captions: &[CaptionEntry],
    pairs: &[AlignmentPair],
) -> Result<usize, AlignmentError> {
    for pair in pairs {
        if let Some(index) = pair.dialogue_index {
            let line = dialogue.get(index).ok_or(AlignmentError::IndexOutOfRange {
                side: "dialogue",
                index,
                len: dialogue.len(),
            })?;
            let event = events.get(line.event_index).ok_or(AlignmentError::IndexOutOfRange {
                side: "event",
                index: line.event_index,
                len: events.len(),
            })?;
            if pair.caption_index.is_some() {
                let details = event
                    .as_dialogue()
                    .ok_or(AlignmentError::NotDialogue(event.original_index))?;
                if details.subtitle().is_some() {
                    return Err(AlignmentError::AlreadyAssigned(event.original_index));
                }
            }
        }
        if let Some(index) = pair.caption_index {
            if index >= captions.len() {
                return Err(AlignmentError::IndexOutOfRange {
                    side: "caption",
                    index,
                    len: captions.len(),
                });
            }
        }
    }

    let mut assigned = 0;
    for pair in pairs {
        let (Some(dialogue_index), Some(caption_index)) = (pair.dialogue_index, pair.caption_index) else {
            continue;
        };

        let caption = &captions[caption_index];
        let event = &mut events[dialogue[dialogue_index].event_index];
        event.assign_subtitle(SubtitleMatch {
            text: caption.single_line_text(),
            start_ms: caption.start_ms,
            end_ms: caption.end_ms,
        })?;
        assigned += 1;
    }

    Ok(assigned)
}

/// Align the dialogue events of `events` against `captions` and record the
/// matched captions on the events
pub fn align_events<S: PairScorer>(
    events: &mut [ScriptEvent],
    captions: &[CaptionEntry],
    aligner: &NeedlemanWunsch<S>,
) -> Result<AlignmentOutcome, AlignmentError> {
    let dialogue = dialogue_lines(events);
    let caption_texts: Vec<String> = captions.iter().map(CaptionEntry::single_line_text).collect();

    debug!(
        "Aligning {} dialogue lines with {} captions",
        dialogue.len(),
        caption_texts.len()
    );

    let alignment = aligner.align(&dialogue, &caption_texts);
    let assigned = project_alignment(events, &dialogue, captions, &alignment.pairs)?;

    info!("Alignment: {} (score {:.2})", alignment.summary(), alignment.score);

    Ok(AlignmentOutcome {
        dialogue,
        captions: caption_texts,
        alignment,
        assigned,
    })
}
