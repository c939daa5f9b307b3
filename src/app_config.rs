use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::alignment::normalizer::DEFAULT_CACHE_CAPACITY;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Screenplay layout detection settings
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Alignment settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Layout classifier configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Left tolerance in characters; auto-calibrated when unset
    #[serde(default)]
    pub ltol: Option<usize>,

    /// Right tolerance in characters
    #[serde(default = "default_rtol")]
    pub rtol: Option<usize>,

    /// Minimum fraction of lines a leading-whitespace count needs to be part
    /// of a histogram run during auto-calibration
    #[serde(default = "default_auto_tolerance")]
    pub auto_tolerance: f64,

    /// Scene number prefix blanked out before measuring lines
    #[serde(default = "default_scene_number_pattern")]
    pub scene_number_pattern: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ltol: None,
            rtol: default_rtol(),
            auto_tolerance: default_auto_tolerance(),
            scene_number_pattern: default_scene_number_pattern(),
        }
    }
}

/// Alignment configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Maximum number of normalized strings kept in memory
    #[serde(default = "default_normalizer_cache_capacity")]
    pub normalizer_cache_capacity: usize,

    /// Show a progress bar while filling the alignment matrix
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            normalizer_cache_capacity: default_normalizer_cache_capacity(),
            show_progress: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_rtol() -> Option<usize> {
    Some(6)
}

fn default_auto_tolerance() -> f64 {
    0.01
}

fn default_scene_number_pattern() -> String {
    r"^[A-Z]?\d+(pt)?\s".to_string()
}

fn default_normalizer_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let tolerance = self.layout.auto_tolerance;
        if !(tolerance > 0.0 && tolerance <= 1.0) {
            return Err(anyhow!(
                "auto_tolerance must be in (0, 1], got {}",
                tolerance
            ));
        }

        Regex::new(&self.layout.scene_number_pattern).map_err(|e| {
            anyhow!(
                "Invalid scene_number_pattern '{}': {}",
                self.layout.scene_number_pattern,
                e
            )
        })?;

        if self.alignment.normalizer_cache_capacity == 0 {
            return Err(anyhow!("normalizer_cache_capacity must be greater than zero"));
        }

        Ok(())
    }
}
