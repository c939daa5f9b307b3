use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::alignment::{AlignmentOutcome, MatchScorer, NeedlemanWunsch, align_events, global_normalizer, init_global_normalizer};
use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::report;
use crate::script::{self, ScriptEvent};
use crate::script::events::write_events_jsonl;
use crate::subtitle_processor::CaptionTrack;

// @module: Application controller for script alignment

/// Options for a single alignment run
#[derive(Debug, Clone)]
pub struct AlignOptions {
    /// Where to write the HTML report
    pub output_html: PathBuf,

    /// Where to write the aligned events as JSONL, if anywhere
    pub save_events: Option<PathBuf>,

    /// Treat the script input as pre-parsed JSONL events
    pub events_input: bool,
}

impl AlignOptions {
    /// Options that only write the HTML report
    pub fn new<P: Into<PathBuf>>(output_html: P) -> Self {
        Self {
            output_html: output_html.into(),
            save_events: None,
            events_input: false,
        }
    }
}

/// Main application controller for script alignment
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.alignment.show_progress = false;
        Ok(Self::with_config(config)?)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        Ok(Self { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse the script, align it against the subtitles and write the outputs
    pub fn run_align(&self, subtitle_file: &Path, script_file: &Path, options: &AlignOptions) -> Result<AlignmentOutcome> {
        let start_time = std::time::Instant::now();

        FileManager::require_file(subtitle_file, "Subtitle file")?;
        FileManager::require_file(script_file, "Script file")?;

        init_global_normalizer(self.config.alignment.normalizer_cache_capacity);

        let mut events = self.load_events(script_file, options.events_input)?;

        let captions = CaptionTrack::load(subtitle_file)
            .with_context(|| format!("Failed to load subtitles from {:?}", subtitle_file))?;
        info!("Loaded {} captions", captions.entries.len());

        let mut aligner = NeedlemanWunsch::new(MatchScorer::new());
        if self.config.alignment.show_progress {
            aligner = aligner.with_progress(Self::create_progress_bar());
        }

        let outcome = align_events(&mut events, &captions.entries, &aligner)?;
        global_normalizer().log_stats();

        if let Some(path) = &options.save_events {
            Self::save_events(&events, path)?;
        }

        report::save_html(&outcome, &options.output_html)?;

        info!(
            "Alignment completed in {}.",
            Self::format_duration(start_time.elapsed())
        );

        Ok(outcome)
    }

    /// Parse the script and write its events as JSONL, returning the events
    pub fn run_parse(&self, script_file: &Path, output_file: &Path) -> Result<Vec<ScriptEvent>> {
        FileManager::require_file(script_file, "Script file")?;

        let events = self.load_events(script_file, false)?;
        Self::save_events(&events, output_file)?;

        Ok(events)
    }

    fn load_events(&self, script_file: &Path, events_input: bool) -> Result<Vec<ScriptEvent>> {
        if events_input {
            let mut events = script::load_events_file(script_file)
                .with_context(|| format!("Failed to load events from {:?}", script_file))?;
            info!("Loaded {} script events", events.len());

            let cleared = events
                .iter_mut()
                .filter_map(ScriptEvent::as_dialogue_mut)
                .filter_map(|details| details.take_subtitle())
                .count();
            if cleared > 0 {
                warn!("Discarding previous subtitle matches on {} dialogue events", cleared);
            }
            return Ok(events);
        }

        let parsed = script::parse_script_file(script_file, &self.config.layout)
            .with_context(|| format!("Failed to parse script {:?}", script_file))?;
        debug!(
            "Script geometry: width {}, indent {}; tolerances: ltol {}, rtol {}",
            parsed.layout.geometry.width,
            parsed.layout.geometry.indent,
            parsed.layout.tolerances.ltol,
            parsed.layout.tolerances.rtol
        );

        Ok(parsed.events)
    }

    fn save_events(events: &[ScriptEvent], path: &Path) -> Result<()> {
        let writer = FileManager::create_writer(path)?;
        write_events_jsonl(events, writer)
            .with_context(|| format!("Failed to write events to {:?}", path))?;
        info!("Wrote {} events to {:?}", events.len(), path);
        Ok(())
    }

    fn create_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} diagonals ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
