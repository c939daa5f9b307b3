/*!
 * Text normalization used before similarity scoring.
 *
 * Captions and screenplay dialogue rarely agree on surface form: one writes
 * "Dr. Jones, it's 10 o'clock", the other "Doctor Jones, it's ten o'clock".
 * The normalizer maps both to a canonical lower-case word sequence so the
 * edit distance only sees differences that matter.
 *
 * The process-wide instance is created lazily on first access through
 * [`global_normalizer`] and lives for the rest of the process. Its output
 * cache is keyed by the exact input string and bounded in size.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use regex::{Captures, Regex};

/// Default number of normalized strings kept in the cache
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

static ABBREVIATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(mr|mrs|ms|dr|st|jr|sr|vs|lt|sgt|capt|col|prof|mt)\.")
        .expect("Invalid abbreviation regex")
});

static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d+))?").expect("Invalid number regex")
});

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex")
});

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "", "thousand", "million", "billion", "trillion", "quadrillion", "quintillion",
];

/// A pure text canonicalization function.
///
/// Implementations must be deterministic: the same input always yields the
/// same output, which is what makes caching by input string sound.
pub trait TextNormalizer: Send + Sync {
    /// Normalize a span of text
    fn normalize(&self, text: &str) -> String;
}

/// Lexical normalizer for English screenplay and caption text.
///
/// Expands common abbreviations, symbols and cardinal numbers into words,
/// lower-cases, drops punctuation and collapses whitespace.
#[derive(Debug, Clone, Default)]
pub struct BasicNormalizer;

impl BasicNormalizer {
    /// Create a new normalizer
    pub fn new() -> Self {
        Self
    }

    fn expand_abbreviation(abbreviation: &str) -> &'static str {
        match abbreviation.to_lowercase().as_str() {
            "mr" => "mister",
            "mrs" => "missus",
            "ms" => "miss",
            "dr" => "doctor",
            "st" => "saint",
            "jr" => "junior",
            "sr" => "senior",
            "vs" => "versus",
            "lt" => "lieutenant",
            "sgt" => "sergeant",
            "capt" => "captain",
            "col" => "colonel",
            "prof" => "professor",
            "mt" => "mount",
            _ => "",
        }
    }

    fn expand_numbers(text: &str) -> String {
        NUMBER_REGEX
            .replace_all(text, |caps: &Captures| {
                let whole = caps[1].replace(',', "");
                let Ok(value) = whole.parse::<u64>() else {
                    return caps[0].to_string();
                };

                let mut words = number_to_words(value);
                if let Some(fraction) = caps.get(2) {
                    words.push_str(" point");
                    for digit in fraction.as_str().chars().filter_map(|c| c.to_digit(10)) {
                        words.push(' ');
                        words.push_str(ONES[digit as usize]);
                    }
                }
                format!(" {} ", words)
            })
            .into_owned()
    }
}

impl TextNormalizer for BasicNormalizer {
    fn normalize(&self, text: &str) -> String {
        let expanded = ABBREVIATION_REGEX.replace_all(text, |caps: &Captures| {
            format!("{} ", Self::expand_abbreviation(&caps[1]))
        });

        let mut symbols = String::with_capacity(expanded.len());
        for c in expanded.chars() {
            match c {
                '&' => symbols.push_str(" and "),
                '%' => symbols.push_str(" percent "),
                '@' => symbols.push_str(" at "),
                '+' => symbols.push_str(" plus "),
                _ => symbols.push(c),
            }
        }

        let numbers = Self::expand_numbers(&symbols);

        let cleaned: String = numbers
            .to_lowercase()
            .chars()
            .filter_map(|c| {
                if c.is_alphanumeric() {
                    Some(c)
                } else if c.is_whitespace() || c == '-' || c == '/' {
                    Some(' ')
                } else {
                    None
                }
            })
            .collect();

        WHITESPACE_REGEX.replace_all(cleaned.trim(), " ").into_owned()
    }
}

/// Spell out a cardinal number in English words
pub fn number_to_words(value: u64) -> String {
    if value < 20 {
        return ONES[value as usize].to_string();
    }

    let mut groups = Vec::new();
    let mut remaining = value;
    while remaining > 0 {
        groups.push((remaining % 1000) as usize);
        remaining /= 1000;
    }

    let mut parts = Vec::new();
    for (scale, group) in groups.iter().enumerate().rev() {
        if *group == 0 {
            continue;
        }
        parts.push(below_thousand(*group));
        if scale > 0 {
            parts.push(SCALES[scale].to_string());
        }
    }

    parts.join(" ")
}

fn below_thousand(value: usize) -> String {
    let mut words = Vec::new();
    let hundreds = value / 100;
    let rest = value % 100;

    if hundreds > 0 {
        words.push(format!("{} hundred", ONES[hundreds]));
    }
    if rest >= 20 {
        let tens = TENS[rest / 10];
        if rest % 10 == 0 {
            words.push(tens.to_string());
        } else {
            words.push(format!("{} {}", tens, ONES[rest % 10]));
        }
    } else if rest > 0 {
        words.push(ONES[rest].to_string());
    }

    words.join(" ")
}

/// Normalizer wrapper that memoizes results by exact input string.
///
/// Once the cache holds `capacity` entries, new results are still computed
/// but no longer stored.
pub struct CachedNormalizer {
    inner: Box<dyn TextNormalizer>,
    cache: RwLock<HashMap<String, String>>,
    capacity: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CachedNormalizer {
    /// Wrap a normalizer with a cache of the given capacity
    pub fn new(inner: Box<dyn TextNormalizer>, capacity: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            capacity,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Cached [`BasicNormalizer`] with the default capacity
    pub fn basic() -> Self {
        Self::new(Box::new(BasicNormalizer::new()), DEFAULT_CACHE_CAPACITY)
    }

    /// Normalize `text`, consulting the cache first
    pub fn normalize(&self, text: &str) -> String {
        if let Some(cached) = self.cache.read().get(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let normalized = self.inner.normalize(text);

        let mut cache = self.cache.write();
        if cache.len() < self.capacity {
            cache.insert(text.to_string(), normalized.clone());
        }

        normalized
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Maximum number of cached entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Log the cache statistics at debug level
    pub fn log_stats(&self) {
        let (hits, misses, hit_rate) = self.stats();
        debug!(
            "Normalizer cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
            self.len(),
            hits,
            misses,
            hit_rate * 100.0
        );
    }
}

impl std::fmt::Debug for CachedNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedNormalizer")
            .field("entries", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

static GLOBAL_NORMALIZER: OnceCell<CachedNormalizer> = OnceCell::new();

/// Initialize the process-wide normalizer with a specific cache capacity.
///
/// Returns `false` if the normalizer was already initialized, in which case
/// the existing instance is kept unchanged.
pub fn init_global_normalizer(capacity: usize) -> bool {
    let created = GLOBAL_NORMALIZER
        .set(CachedNormalizer::new(Box::new(BasicNormalizer::new()), capacity))
        .is_ok();
    if created {
        debug!("Initialized text normalizer (cache capacity {})", capacity);
    }
    created
}

/// Access the process-wide normalizer, creating it on first use.
pub fn global_normalizer() -> &'static CachedNormalizer {
    GLOBAL_NORMALIZER.get_or_init(|| {
        debug!("Initializing text normalizer with default cache capacity");
        CachedNormalizer::basic()
    })
}
