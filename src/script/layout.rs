/*!
 * Layout classification for plain-text screenplays.
 *
 * Screenplays exported to text keep their structure only as whitespace:
 * scene headings and action sit at the left margin, character cues and
 * dialogue are indented towards the centre, transitions hug the right
 * margin. This module splits a script into blank-line-delimited blocks and
 * tags each block with its horizontal alignment.
 *
 * The left tolerance can be calibrated from the script itself: a histogram
 * of leading-whitespace counts usually has one run of counts at the margin
 * and further runs for each indentation level.
 */

use std::fmt;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::LayoutConfig;
use crate::errors::ScriptError;

/// Left tolerance used when calibration finds fewer than two runs
pub const DEFAULT_LTOL: usize = 8;

/// Right tolerance used when none is configured
pub const DEFAULT_RTOL: usize = 6;

static BOILERPLATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:CONTINUED: \(\d+\)|Revision\s+\d+.)").expect("Invalid boilerplate regex")
});

static COLUMN_GAP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s{2,}").expect("Invalid column gap regex")
});

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockAlignment {
    /// Flush with the script's left margin
    Left,
    /// Flush with the right margin or entirely in the right half
    Right,
    /// Indented on both sides
    Center,
    /// One column of a side-by-side block
    CenterSplit,
    /// None of the above
    Unknown,
}

impl fmt::Display for BlockAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::CenterSplit => "center-split",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A classified block of trimmed lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Lines with surrounding whitespace removed
    pub lines: Vec<String>,
    /// Alignment tag
    pub alignment: BlockAlignment,
}

/// Width and base indent of a script, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptGeometry {
    /// Longest line length
    pub width: usize,
    /// Smallest leading whitespace over all lines, blank ones included
    pub indent: usize,
}

impl ScriptGeometry {
    /// Measure a set of prepared lines
    pub fn measure<S: AsRef<str>>(lines: &[S]) -> Self {
        let width = lines
            .iter()
            .map(|line| line.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let indent = lines
            .iter()
            .map(|line| leading_whitespace(line.as_ref()))
            .min()
            .unwrap_or(0);

        Self { width, indent }
    }
}

/// Resolved left and right tolerances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerances {
    pub ltol: usize,
    pub rtol: usize,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            ltol: DEFAULT_LTOL,
            rtol: DEFAULT_RTOL,
        }
    }
}

/// Diagnostic for a block that fits no alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousBlock {
    pub lines: Vec<String>,
    pub script_indent: usize,
    pub script_width: usize,
    pub start_whitespace: Vec<usize>,
    pub end_whitespace: Vec<usize>,
}

impl fmt::Display for AmbiguousBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line(s) starting {:?}; indent {}, width {}, leading whitespace {:?}, trailing whitespace {:?}",
            self.lines.len(),
            self.lines.first().map(|line| line.trim()).unwrap_or_default(),
            self.script_indent,
            self.script_width,
            self.start_whitespace,
            self.end_whitespace
        )
    }
}

/// Outcome of classifying a raw block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The block has a definite alignment
    Aligned(BlockAlignment),
    /// The block fits no alignment
    Ambiguous(AmbiguousBlock),
}

impl Classification {
    /// Alignment tag, `Unknown` for ambiguous blocks
    pub fn alignment(&self) -> BlockAlignment {
        match self {
            Self::Aligned(alignment) => *alignment,
            Self::Ambiguous(_) => BlockAlignment::Unknown,
        }
    }
}

/// Result of running the classifier over a whole script
#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Classified blocks in script order
    pub blocks: Vec<Block>,
    /// Measured script geometry
    pub geometry: ScriptGeometry,
    /// Tolerances used for classification
    pub tolerances: Tolerances,
    /// Blocks dropped because they fit no alignment
    pub dropped: Vec<AmbiguousBlock>,
}

/// Splits a script into blocks and tags their alignment
#[derive(Debug, Clone)]
pub struct LayoutClassifier {
    scene_number: Regex,
    ltol: Option<usize>,
    rtol: Option<usize>,
    auto_tolerance: f64,
}

impl LayoutClassifier {
    /// Create a classifier from layout settings
    pub fn new(config: &LayoutConfig) -> Result<Self, ScriptError> {
        let scene_number = Regex::new(&config.scene_number_pattern).map_err(|e| {
            ScriptError::InvalidScenePattern {
                pattern: config.scene_number_pattern.clone(),
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            scene_number,
            ltol: config.ltol,
            rtol: config.rtol,
            auto_tolerance: config.auto_tolerance,
        })
    }

    /// Expand tabs, blank scene numbers and drop page boilerplate
    pub fn prepare_lines(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter_map(|raw| {
                let mut line = raw.replace('\t', "    ");

                if let Some(range) = self.scene_number.find(&line).map(|found| found.range()) {
                    let blank = " ".repeat(line[range.clone()].chars().count());
                    line.replace_range(range, &blank);
                }

                if is_boilerplate(&line) {
                    return None;
                }

                Some(line)
            })
            .collect()
    }

    /// Classify a whole script
    pub fn classify_script(&self, text: &str) -> Result<LayoutResult, ScriptError> {
        let lines = self.prepare_lines(text);
        if lines.iter().all(|line| line.trim().is_empty()) {
            warn!("Script contains no content lines");
        }

        let geometry = ScriptGeometry::measure(&lines);
        let raw_blocks = split_blocks(&lines);
        let tolerances = self.resolve_tolerances(&raw_blocks);
        debug!(
            "Script geometry: width {}, indent {}, {} raw blocks",
            geometry.width,
            geometry.indent,
            raw_blocks.len()
        );

        let mut blocks = Vec::with_capacity(raw_blocks.len());
        let mut dropped = Vec::new();

        for raw in &raw_blocks {
            match classify_block(raw.as_slice(), geometry, tolerances) {
                Classification::Aligned(alignment) => blocks.push(Block {
                    lines: raw.iter().map(|line| line.trim().to_string()).collect(),
                    alignment,
                }),
                Classification::Ambiguous(diagnostic) => match split_center_columns(raw.as_slice()) {
                    Some(columns) => {
                        debug!("Recovered side-by-side block with {} columns", columns.len());
                        blocks.extend(columns.into_iter().map(|lines| Block {
                            lines,
                            alignment: BlockAlignment::CenterSplit,
                        }));
                    }
                    None => {
                        warn!("Unknown block alignment, dropping block: {}", diagnostic);
                        dropped.push(diagnostic);
                    }
                },
            }
        }

        Ok(LayoutResult {
            blocks,
            geometry,
            tolerances,
            dropped,
        })
    }

    /// Fill in unset tolerances, calibrating `ltol` from the blocks if needed
    pub fn resolve_tolerances(&self, blocks: &[Vec<String>]) -> Tolerances {
        let ltol = match self.ltol {
            Some(ltol) => ltol,
            None => {
                info!(
                    "Auto-calibrating left tolerance (frequency threshold {})",
                    self.auto_tolerance
                );
                let histogram = leading_whitespace_histogram(blocks);
                match ltol_from_histogram(&histogram, self.auto_tolerance) {
                    Some(ltol) => {
                        info!("Left tolerance set to {}", ltol);
                        ltol
                    }
                    None => {
                        warn!(
                            "Could not calibrate left tolerance, runs: {:?}; using {}",
                            histogram_runs(&histogram, self.auto_tolerance),
                            DEFAULT_LTOL
                        );
                        DEFAULT_LTOL
                    }
                }
            }
        };

        let rtol = self.rtol.unwrap_or(DEFAULT_RTOL);
        if self.ltol.is_none() {
            info!("Right tolerance set to {}", rtol);
        }

        Tolerances { ltol, rtol }
    }
}

/// Whether a line is page furniture such as "(MORE)" or "CONTINUED: (2)"
pub fn is_boilerplate(line: &str) -> bool {
    let trimmed = line.trim();
    matches!(
        trimmed.to_uppercase().as_str(),
        "(MORE)" | "(CONT'D)" | "(CONTINUED)"
    ) || BOILERPLATE_REGEX.is_match(trimmed)
}

/// Number of whitespace characters at the start of a line
pub fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Distance from the end of the line's text to the script width
pub fn trailing_whitespace(line: &str, width: usize) -> usize {
    width.saturating_sub(line.trim_end().chars().count())
}

/// Split lines into blocks on blank lines. Empty blocks are dropped.
pub fn split_blocks(lines: &[String]) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.clone());
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Fraction of lines per leading-whitespace count, indexed 0..=max
pub fn leading_whitespace_histogram(blocks: &[Vec<String>]) -> Vec<f64> {
    let counts: Vec<usize> = blocks
        .iter()
        .flatten()
        .map(|line| leading_whitespace(line))
        .collect();

    let Some(max) = counts.iter().copied().max() else {
        return Vec::new();
    };

    let mut histogram = vec![0.0; max + 1];
    for count in &counts {
        histogram[*count] += 1.0;
    }

    let total = counts.len() as f64;
    for frequency in &mut histogram {
        *frequency /= total;
    }

    histogram
}

/// Maximal runs of consecutive counts whose frequency meets `threshold`
pub fn histogram_runs(histogram: &[f64], threshold: f64) -> Vec<Vec<usize>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (count, frequency) in histogram.iter().enumerate() {
        if *frequency < threshold {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(count);
        }
    }

    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Left tolerance from a histogram: one past the widest count of the second
/// run, or `None` if there are fewer than two runs
pub fn ltol_from_histogram(histogram: &[f64], threshold: f64) -> Option<usize> {
    let runs = histogram_runs(histogram, threshold);
    debug!("Leading whitespace runs: {:?}", runs);
    runs.get(1)
        .and_then(|run| run.iter().copied().max())
        .map(|widest| widest + 1)
}

/// Classify one raw (untrimmed) block
pub fn classify_block<S: AsRef<str>>(
    block: &[S],
    geometry: ScriptGeometry,
    tolerances: Tolerances,
) -> Classification {
    let start: Vec<usize> = block.iter().map(|line| leading_whitespace(line.as_ref())).collect();
    let end: Vec<usize> = block
        .iter()
        .map(|line| trailing_whitespace(line.as_ref(), geometry.width))
        .collect();

    if start
        .iter()
        .zip(&end)
        .all(|(s, e)| *s > tolerances.ltol && *e > tolerances.rtol)
    {
        return Classification::Aligned(BlockAlignment::Center);
    }

    if start.iter().all(|s| s.abs_diff(geometry.indent) <= tolerances.ltol) {
        return Classification::Aligned(BlockAlignment::Left);
    }

    if end.iter().all(|e| *e < tolerances.rtol) || start.iter().all(|s| *s > geometry.width / 2) {
        return Classification::Aligned(BlockAlignment::Right);
    }

    Classification::Ambiguous(AmbiguousBlock {
        lines: block.iter().map(|line| line.as_ref().to_string()).collect(),
        script_indent: geometry.indent,
        script_width: geometry.width,
        start_whitespace: start,
        end_whitespace: end,
    })
}

/// Split a side-by-side block into columns.
///
/// Each line is cut at runs of two or more spaces. The split is accepted
/// only if every line yields as many columns as the block has lines; column
/// `k` then holds the `k`-th piece of every line.
pub fn split_center_columns<S: AsRef<str>>(block: &[S]) -> Option<Vec<Vec<String>>> {
    let rows: Vec<Vec<&str>> = block
        .iter()
        .map(|line| COLUMN_GAP_REGEX.split(line.as_ref().trim()).collect())
        .collect();

    let expected = block.len();
    if expected == 0 || rows.iter().any(|row| row.len() != expected) {
        return None;
    }

    let columns = (0..expected)
        .map(|column| rows.iter().map(|row| row[column].trim().to_string()).collect())
        .collect();

    Some(columns)
}
