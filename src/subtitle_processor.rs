use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::CaptionError;

// @module: Caption loading from SRT files

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{1,2}:\d{2}:\d{2}[,.]\d{3})")
        .expect("Invalid timestamp regex")
});

// @const: HTML-like markup tag
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)(?:\s[^<>]*?)?(/?)>").expect("Invalid tag regex")
});

// @const: ASS override block such as {\an8}
static OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\\[^}]*\}").expect("Invalid override regex")
});

// @struct: Single caption entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntry {
    // @field: Sequence number as written in the file
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Caption text with markup removed
    pub text: String,
}

impl CaptionEntry {
    /// Creates a new caption entry
    pub fn new(seq_num: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        CaptionEntry {
            seq_num,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Caption text on a single line
    pub fn single_line_text(&self) -> String {
        self.text.replace(['\r', '\n'], " ")
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, CaptionError> {
        let parts: Vec<&str> = timestamp.trim().split([':', ',', '.']).collect();
        if parts.len() != 4 {
            return Err(CaptionError::InvalidTimestamp(timestamp.to_string()));
        }

        let mut values = [0u64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| CaptionError::InvalidTimestamp(timestamp.to_string()))?;
        }
        let [hours, minutes, seconds, millis] = values;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(CaptionError::InvalidTimestamp(timestamp.to_string()));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered captions loaded from one file
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    /// Load and parse an SRT file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CaptionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CaptionError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let entries = Self::parse_srt_string(&content)?;
        debug!("Loaded {} captions from {}", entries.len(), path.display());

        Ok(CaptionTrack {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT format string into caption entries, keeping file order.
    ///
    /// Entries whose text is empty are kept so that caption indices follow
    /// file position. A file without entries yields an empty list.
    pub fn parse_srt_string(content: &str) -> Result<Vec<CaptionEntry>, CaptionError> {
        let content = content.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();

        // State variables for parsing
        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let finish_entry = |seq_num: usize, times: (u64, u64), text: &str, entries: &mut Vec<CaptionEntry>| {
            let cleaned = strip_markup(text.trim());
            if cleaned.trim().is_empty() {
                debug!("Caption entry {} has no text", seq_num);
            }
            if times.1 < times.0 {
                warn!("Caption entry {} ends before it starts", seq_num);
            }
            entries.push(CaptionEntry::new(seq_num, times.0, times.1, cleaned.trim()));
        };

        for (line_index, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
                    finish_entry(seq_num, times, &current_text, &mut entries);
                    current_seq_num = None;
                    current_times = None;
                    current_text.clear();
                }
                continue;
            }

            // Sequence number starts a new entry
            if current_times.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            if let (Some(seq_num), None) = (current_seq_num, current_times) {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    match parse_time_range(&caps[1], &caps[2]) {
                        Ok(times) => current_times = Some(times),
                        Err(e) => {
                            warn!("Skipping caption entry {}: {}", seq_num, e);
                            current_seq_num = None;
                        }
                    }
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_index + 1,
                    trimmed
                );
            }
        }

        if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
            finish_entry(seq_num, times, &current_text, &mut entries);
        }

        if entries.is_empty() {
            warn!("No caption entries found");
        }

        Ok(entries)
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Caption Track")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

fn parse_time_range(start: &str, end: &str) -> Result<(u64, u64), CaptionError> {
    Ok((CaptionEntry::parse_timestamp(start)?, CaptionEntry::parse_timestamp(end)?))
}

/// Remove markup tags from caption text.
///
/// Tags are only removed when they are properly nested; otherwise the text
/// is returned unchanged. ASS override blocks are always removed.
pub fn strip_markup(text: &str) -> String {
    let text = OVERRIDE_REGEX.replace_all(text, "");
    if !text.contains('<') {
        return decode_entities(&text);
    }

    let mut stack: Vec<String> = Vec::new();
    let mut plain = String::with_capacity(text.len());
    let mut last = 0;

    for caps in TAG_REGEX.captures_iter(&text) {
        let Some(tag) = caps.get(0) else { continue };

        let between = &text[last..tag.start()];
        if between.contains(['<', '>']) {
            return text.into_owned();
        }
        plain.push_str(between);

        let name = caps[2].to_lowercase();
        if !caps[1].is_empty() {
            if stack.pop().as_deref() != Some(name.as_str()) {
                return text.into_owned();
            }
        } else if caps[3].is_empty() && name != "br" {
            stack.push(name);
        }

        last = tag.end();
    }

    let tail = &text[last..];
    if tail.contains(['<', '>']) || !stack.is_empty() {
        return text.into_owned();
    }
    plain.push_str(tail);

    decode_entities(&plain)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
