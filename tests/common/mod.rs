/*!
 * Common test utilities for the script-aligner test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

/// A short screenplay: two scene headings, three descriptions, a centered
/// dialogue exchange, one side-by-side dialogue block and a transition.
///
/// Descriptions are indented by two columns, dialogue by ten, character cues
/// by twenty, and the transition is flush with the right margin (width 60).
pub const SAMPLE_SCRIPT: &str = concat!(
    "INT. KITCHEN - NIGHT\n",
    "\n",
    "  Rain hammers the window. MARY (40s) scrubs a pan at the\n",
    "  sink, not looking up.\n",
    "\n",
    "                    MARY\n",
    "          Where have you been all night?\n",
    "\n",
    "                    JOHN (O.S.)\n",
    "          Out walking.\n",
    "               (beat)\n",
    "          I needed some air.\n",
    "\n",
    "  John steps in from the hall, soaking wet.\n",
    "\n",
    "                    MARY (CONT'D)\n",
    "          You'll catch your death out there.\n",
    "\n",
    "          JOHN                    ANN\n",
    "          I'm fine, Mary.         Are you sure about that?\n",
    "\n",
    "                                                     CUT TO:\n",
    "\n",
    "EXT. STREET - DAY\n",
    "\n",
    "  The rain has stopped.\n",
);

/// Captions for the dialogue of [`SAMPLE_SCRIPT`], with one extra caption
/// that has no counterpart in the script
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
Where have you been
all night?

2
00:00:03,500 --> 00:00:04,500
<i>Out walking.</i>

3
00:00:05,000 --> 00:00:06,500
I needed some air.

4
00:00:07,000 --> 00:00:08,000
Hey, turn that off!

5
00:00:09,000 --> 00:00:11,000
You'll catch your death out there.

6
00:00:12,000 --> 00:00:13,000
I'm fine, Mary.

7
00:00:13,500 --> 00:00:15,000
Are you sure about that?
";

/// Dialogue lines of [`SAMPLE_SCRIPT`] in order
pub const SAMPLE_DIALOGUE: [&str; 6] = [
    "Where have you been all night?",
    "Out walking.",
    "I needed some air.",
    "You'll catch your death out there.",
    "I'm fine, Mary.",
    "Are you sure about that?",
];

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Writes the sample script and subtitles, returning (srt, script) paths
pub fn create_sample_inputs(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let srt = create_test_file(dir, "sample.srt", SAMPLE_SRT)?;
    let script = create_test_file(dir, "sample.txt", SAMPLE_SCRIPT)?;
    Ok((srt, script))
}

/// Left-pads `text` with `indent` spaces
pub fn indented(indent: usize, text: &str) -> String {
    format!("{}{}", " ".repeat(indent), text)
}
