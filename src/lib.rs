/*!
 * # script-aligner - screenplay and subtitle alignment
 *
 * A Rust library that reads a plain-text screenplay, classifies its layout
 * into typed events and aligns the dialogue with the captions of an SRT
 * subtitle file.
 *
 * ## Features
 *
 * - Layout classification of screenplay blocks by indentation, with
 *   automatic calibration of the left tolerance
 * - Parsing of blocks into scene headings, camera directions, descriptions,
 *   metadata and dialogue (speaker, voice modifiers, parentheticals)
 * - Global Needleman-Wunsch alignment of dialogue lines against captions
 *   using a normalized edit-distance score
 * - Event export as line-delimited JSON and an HTML side-by-side report
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `script`: Screenplay parsing:
 *   - `script::layout`: Block splitting and alignment classification
 *   - `script::parser`: Block-to-event conversion
 *   - `script::events`: The event model and its JSONL form
 * - `subtitle_processor`: SRT caption loading
 * - `alignment`: Dialogue-to-caption alignment:
 *   - `alignment::normalizer`: Text canonicalization with caching
 *   - `alignment::scorer`: Pairwise similarity scoring
 *   - `alignment::needleman`: Global sequence alignment
 * - `report`: HTML alignment report
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod report;
pub mod script;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use alignment::{Alignment, AlignmentOutcome, AlignmentPair, MatchScorer, NeedlemanWunsch, align_events};
pub use app_config::Config;
pub use errors::{AlignmentError, AppError, CaptionError, ScriptError};
pub use script::{ParsedScript, ScriptEvent, parse_script};
pub use subtitle_processor::{CaptionEntry, CaptionTrack};
