/*!
 * Tests for text normalization and pair scoring
 */

use script_aligner::alignment::normalizer::{number_to_words, CachedNormalizer, TextNormalizer, BasicNormalizer};
use script_aligner::alignment::scorer::{MATCH_SCORE, MISMATCH_SCORE, MatchScorer, PairScorer};

/// Normalizer that only lower-cases, to exercise the scorer in isolation
struct LowercaseNormalizer;

impl TextNormalizer for LowercaseNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_lowercase()
    }
}

/// Test abbreviations, symbols and numbers are spelled out
#[test]
fn test_normalize_abbreviationsSymbolsNumbers_shouldExpand() {
    let normalizer = BasicNormalizer::new();

    assert_eq!(normalizer.normalize("Mr. Smith & Dr. Who"), "mister smith and doctor who");
    assert_eq!(normalizer.normalize("It's 42%!"), "its forty two percent");
    assert_eq!(normalizer.normalize("Pay 1,250.5 now"), "pay one thousand two hundred fifty point five now");
    assert_eq!(normalizer.normalize("  Well--\nwhatever.  "), "well whatever");
}

/// Test number spelling at scale boundaries
#[test]
fn test_numberToWords_boundaries() {
    assert_eq!(number_to_words(0), "zero");
    assert_eq!(number_to_words(19), "nineteen");
    assert_eq!(number_to_words(20), "twenty");
    assert_eq!(number_to_words(105), "one hundred five");
    assert_eq!(number_to_words(1_000_001), "one million one");
}

/// Test the cache stores results until it is full and then stops storing
#[test]
fn test_cachedNormalizer_capacityReached_shouldStopStoring() {
    let normalizer = CachedNormalizer::new(Box::new(BasicNormalizer::new()), 2);

    assert_eq!(normalizer.normalize("One"), "one");
    assert_eq!(normalizer.normalize("Two"), "two");
    assert_eq!(normalizer.normalize("Three"), "three");
    assert_eq!(normalizer.len(), 2);

    // Uncached input is still normalized correctly
    assert_eq!(normalizer.normalize("Three"), "three");
    assert_eq!(normalizer.normalize("One"), "one");

    let (hits, misses, _) = normalizer.stats();
    assert_eq!(hits, 1);
    assert_eq!(misses, 4);
}

/// Test similarity exactly at the threshold does not count as a match
#[test]
fn test_score_similarityAtThreshold_shouldMismatch() {
    let normalizer = CachedNormalizer::new(Box::new(LowercaseNormalizer), 16);
    let scorer = MatchScorer::with_normalizer(&normalizer);

    // Distance 3 over length 5
    assert_eq!(scorer.similarity("abcde", "abxyz"), 1.0 - 3.0 / 5.0);
    assert_eq!(scorer.score("abcde", "abxyz"), MISMATCH_SCORE);

    // Distance 2 over length 5
    assert_eq!(scorer.score("abcde", "abcyz"), MATCH_SCORE);
}

/// Test the scorer only ever returns one of the two scores
#[test]
fn test_score_variousPairs_shouldBeBinary() {
    let normalizer = CachedNormalizer::basic();
    let scorer = MatchScorer::with_normalizer(&normalizer);
    let pairs = [
        ("Hello there.", "hello there"),
        ("hello there", "how are you"),
        ("", ""),
        ("Out walking.", "Out walking"),
        ("I needed some air.", "Hey, turn that off!"),
    ];

    for (dialogue, caption) in pairs {
        let score = scorer.score(dialogue, caption);
        assert!(score == MATCH_SCORE || score == MISMATCH_SCORE, "unexpected score {}", score);
    }
    assert_eq!(scorer.score("Hello there.", "hello there"), MATCH_SCORE);
    assert_eq!(scorer.score("hello there", "how are you"), MISMATCH_SCORE);
}

/// Test the scorer sees the injected normalizer's output
#[test]
fn test_withNormalizer_customNormalizer_shouldBeUsed() {
    let lowercase = CachedNormalizer::new(Box::new(LowercaseNormalizer), 16);
    let basic = CachedNormalizer::basic();

    // Digits are only spelled out by the basic normalizer
    let a = "10";
    let b = "ten";
    assert_eq!(MatchScorer::with_normalizer(&basic).score(a, b), MATCH_SCORE);
    assert_eq!(MatchScorer::with_normalizer(&lowercase).score(a, b), MISMATCH_SCORE);
}
