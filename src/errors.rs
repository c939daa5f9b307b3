/*!
 * Error types for the script-aligner application.
 *
 * This module contains custom error types for the different stages of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 * Recoverable conditions (ambiguous layout blocks, empty scripts or caption
 * files) are not errors and never surface here.
 */

use thiserror::Error;

/// Errors that can occur while reading or parsing a screenplay
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be read
    #[error("Failed to read script file {path}: {message}")]
    Unreadable {
        /// Path of the script file
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The configured scene-number pattern is not a valid regex
    #[error("Invalid scene number pattern '{pattern}': {message}")]
    InvalidScenePattern {
        /// Pattern as configured
        pattern: String,
        /// Regex compiler message
        message: String,
    },

    /// A pre-parsed event record could not be decoded
    #[error("Malformed event record on line {line}: {message}")]
    MalformedEvent {
        /// 1-based line number in the JSONL file
        line: usize,
        /// Decoder message
        message: String,
    },

    /// A pre-parsed event record used an unknown type tag
    #[error("Unknown event type '{0}'")]
    UnknownEventType(String),
}

/// Errors that can occur while loading captions
#[derive(Error, Debug)]
pub enum CaptionError {
    /// The caption file could not be read
    #[error("Failed to read caption file {path}: {message}")]
    Unreadable {
        /// Path of the caption file
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// A timestamp did not match HH:MM:SS,mmm
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),
}

/// Errors that can occur while projecting an alignment onto events
#[derive(Error, Debug, PartialEq)]
pub enum AlignmentError {
    /// A pair referenced an index outside the aligned sequences
    #[error("Alignment pair references {side} index {index} but only {len} entries exist")]
    IndexOutOfRange {
        /// Which sequence the index belongs to
        side: &'static str,
        /// Offending index
        index: usize,
        /// Length of the sequence
        len: usize,
    },

    /// A dialogue event already carries a subtitle match
    #[error("Dialogue event {0} already has a subtitle assigned")]
    AlreadyAssigned(usize),

    /// The event at the given position is not a dialogue event
    #[error("Event {0} is not a dialogue event")]
    NotDialogue(usize),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from script parsing
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Error from caption loading
    #[error("Caption error: {0}")]
    Caption(#[from] CaptionError),

    /// Error from alignment projection
    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
