/*!
 * Needleman-Wunsch global alignment between dialogue lines and captions.
 *
 * The score matrix is filled one anti-diagonal at a time. Each cell only
 * depends on cells above, to the left and diagonally above-left, so the
 * fill order does not change the result. Ties between candidate moves are
 * broken in the fixed order Diagonal, Up, Left.
 */

use indicatif::ProgressBar;
use log::debug;
use serde::Serialize;

use crate::alignment::scorer::PairScorer;

/// Score added for every unmatched dialogue line or caption
pub const GAP_PENALTY: f64 = -0.1;

/// Backpointer stored for each matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dialogue line and caption are paired
    Diagonal,
    /// Dialogue line is left without a caption
    Up,
    /// Caption is left without a dialogue line
    Left,
}

/// One unit of the final alignment.
///
/// At least one side is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlignmentPair {
    /// Position in the dialogue sequence
    pub dialogue_index: Option<usize>,
    /// Position in the caption sequence
    pub caption_index: Option<usize>,
}

impl AlignmentPair {
    /// A substitution pairing dialogue `i` with caption `j`
    pub fn matched(dialogue_index: usize, caption_index: usize) -> Self {
        Self {
            dialogue_index: Some(dialogue_index),
            caption_index: Some(caption_index),
        }
    }

    /// A dialogue line without a caption
    pub fn dialogue_only(dialogue_index: usize) -> Self {
        Self {
            dialogue_index: Some(dialogue_index),
            caption_index: None,
        }
    }

    /// A caption without a dialogue line
    pub fn caption_only(caption_index: usize) -> Self {
        Self {
            dialogue_index: None,
            caption_index: Some(caption_index),
        }
    }

    /// Whether both sides are present
    pub fn is_match(&self) -> bool {
        self.dialogue_index.is_some() && self.caption_index.is_some()
    }
}

/// Score and backpointer matrices of size (n+1) x (m+1)
#[derive(Debug, Clone)]
pub struct AlignmentMatrix {
    rows: usize,
    cols: usize,
    scores: Vec<f64>,
    directions: Vec<Direction>,
}

impl AlignmentMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            scores: vec![0.0; rows * cols],
            directions: vec![Direction::Left; rows * cols],
        }
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    /// Number of rows (dialogue count + 1)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (caption count + 1)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Score at cell (i, j)
    pub fn score(&self, i: usize, j: usize) -> f64 {
        self.scores[self.offset(i, j)]
    }

    /// Backpointer at cell (i, j)
    pub fn direction(&self, i: usize, j: usize) -> Direction {
        self.directions[self.offset(i, j)]
    }

    /// Score of the complete alignment, M[n, m]
    pub fn final_score(&self) -> f64 {
        self.score(self.rows - 1, self.cols - 1)
    }

    fn set(&mut self, i: usize, j: usize, score: f64, direction: Direction) {
        let offset = self.offset(i, j);
        self.scores[offset] = score;
        self.directions[offset] = direction;
    }

    /// Follow backpointers from (n, m) to (0, 0) and return the pairs in
    /// sequence order.
    pub fn backtrace(&self) -> Vec<AlignmentPair> {
        let mut pairs = Vec::with_capacity(self.rows + self.cols);
        let mut i = self.rows - 1;
        let mut j = self.cols - 1;

        while i > 0 || j > 0 {
            match self.direction(i, j) {
                Direction::Diagonal => {
                    pairs.push(AlignmentPair::matched(i - 1, j - 1));
                    i -= 1;
                    j -= 1;
                }
                Direction::Up => {
                    pairs.push(AlignmentPair::dialogue_only(i - 1));
                    i -= 1;
                }
                Direction::Left => {
                    pairs.push(AlignmentPair::caption_only(j - 1));
                    j -= 1;
                }
            }
        }

        pairs.reverse();
        pairs
    }
}

/// Result of a global alignment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    /// Ordered pairs covering every dialogue line and caption exactly once
    pub pairs: Vec<AlignmentPair>,
    /// Optimal total score
    pub score: f64,
}

impl Alignment {
    /// Count matched, dialogue-only and caption-only pairs
    pub fn summary(&self) -> AlignmentSummary {
        let mut summary = AlignmentSummary::default();
        for pair in &self.pairs {
            match (pair.dialogue_index, pair.caption_index) {
                (Some(_), Some(_)) => summary.matched += 1,
                (Some(_), None) => summary.dialogue_only += 1,
                (None, Some(_)) => summary.caption_only += 1,
                (None, None) => {}
            }
        }
        summary
    }
}

/// Pair counts of an alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentSummary {
    /// Pairs with both sides present
    pub matched: usize,
    /// Dialogue lines without a caption
    pub dialogue_only: usize,
    /// Captions without a dialogue line
    pub caption_only: usize,
}

impl std::fmt::Display for AlignmentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} matched, {} script-only, {} subtitle-only",
            self.matched, self.dialogue_only, self.caption_only
        )
    }
}

/// Global aligner parameterized by a pair scorer
pub struct NeedlemanWunsch<S: PairScorer> {
    scorer: S,
    gap_penalty: f64,
    progress: Option<ProgressBar>,
}

impl<S: PairScorer> NeedlemanWunsch<S> {
    /// Create an aligner with the standard gap penalty
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            gap_penalty: GAP_PENALTY,
            progress: None,
        }
    }

    /// Report fill progress on the given bar, one tick per anti-diagonal
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The gap penalty in use
    pub fn gap_penalty(&self) -> f64 {
        self.gap_penalty
    }

    /// Fill the score and backpointer matrices
    pub fn fill<D, C>(&self, dialogue: &[D], captions: &[C]) -> AlignmentMatrix
    where
        D: AsRef<str>,
        C: AsRef<str>,
    {
        let n = dialogue.len();
        let m = captions.len();
        let mut matrix = AlignmentMatrix::new(n + 1, m + 1);

        if let Some(progress) = &self.progress {
            progress.set_length((n + m + 1) as u64);
            progress.set_position(0);
        }

        for diagonal in 0..=(n + m) {
            let first_row = diagonal.saturating_sub(m);
            let last_row = diagonal.min(n);

            for i in first_row..=last_row {
                let j = diagonal - i;

                if i == 0 || j == 0 {
                    // Pure-gap prefix along the borders
                    let direction = if i == 0 { Direction::Left } else { Direction::Up };
                    matrix.set(i, j, self.gap_penalty * diagonal as f64, direction);
                    continue;
                }

                let diag_score = matrix.score(i - 1, j - 1)
                    + self.scorer.score(dialogue[i - 1].as_ref(), captions[j - 1].as_ref());
                let up_score = matrix.score(i - 1, j) + self.gap_penalty;
                let left_score = matrix.score(i, j - 1) + self.gap_penalty;

                let (score, direction) = if diag_score >= up_score && diag_score >= left_score {
                    (diag_score, Direction::Diagonal)
                } else if up_score >= left_score {
                    (up_score, Direction::Up)
                } else {
                    (left_score, Direction::Left)
                };

                matrix.set(i, j, score, direction);
            }

            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        matrix
    }

    /// Align the two sequences and return the ordered pairs
    pub fn align<D, C>(&self, dialogue: &[D], captions: &[C]) -> Alignment
    where
        D: AsRef<str>,
        C: AsRef<str>,
    {
        let matrix = self.fill(dialogue, captions);
        let pairs = matrix.backtrace();
        let score = matrix.final_score();

        debug!(
            "Aligned {} dialogue lines against {} captions: {} pairs, score {:.3}",
            dialogue.len(),
            captions.len(),
            pairs.len(),
            score
        );

        Alignment { pairs, score }
    }
}
