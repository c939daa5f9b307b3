/*!
 * Pairwise compatibility scoring between a dialogue line and a caption.
 *
 * Both spans are normalized, compared with a normalized Levenshtein
 * similarity, and the similarity is thresholded into one of two scores.
 * The aligner only ever sees the thresholded value.
 */

use crate::alignment::normalizer::{CachedNormalizer, global_normalizer};

/// Score for a pair whose similarity clears the threshold
pub const MATCH_SCORE: f64 = 1.0;

/// Score for a pair whose similarity does not clear the threshold
pub const MISMATCH_SCORE: f64 = -0.5;

/// Similarity strictly above this value counts as a match
pub const SIMILARITY_THRESHOLD: f64 = 0.4;

/// Anything that can score a (dialogue, caption) pair for the aligner
pub trait PairScorer {
    /// Score a dialogue line against a caption text
    fn score(&self, dialogue: &str, caption: &str) -> f64;
}

impl<F> PairScorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, dialogue: &str, caption: &str) -> f64 {
        self(dialogue, caption)
    }
}

/// Thresholded edit-distance scorer backed by a cached normalizer
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer<'n> {
    normalizer: &'n CachedNormalizer,
}

impl MatchScorer<'static> {
    /// Create a scorer that uses the process-wide normalizer
    pub fn new() -> Self {
        Self {
            normalizer: global_normalizer(),
        }
    }
}

impl Default for MatchScorer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'n> MatchScorer<'n> {
    /// Create a scorer that uses a caller-owned normalizer
    pub fn with_normalizer(normalizer: &'n CachedNormalizer) -> Self {
        Self { normalizer }
    }

    /// Normalized similarity in [0, 1] between two spans.
    ///
    /// Two spans that both normalize to the empty string have similarity 0.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = self.normalizer.normalize(a);
        let b = self.normalizer.normalize(b);

        let max_len = a.chars().count().max(b.chars().count());
        if max_len == 0 {
            return 0.0;
        }

        1.0 - (levenshtein_distance(&a, &b) as f64 / max_len as f64)
    }
}

impl PairScorer for MatchScorer<'_> {
    fn score(&self, dialogue: &str, caption: &str) -> f64 {
        if self.similarity(dialogue, caption) > SIMILARITY_THRESHOLD {
            MATCH_SCORE
        } else {
            MISMATCH_SCORE
        }
    }
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two-row optimization
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
