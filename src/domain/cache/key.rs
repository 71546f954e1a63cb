//! Cache key normalization and restatement variants.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowercases, trims and collapses internal whitespace.
pub fn normalize_key(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Words of a normalized key with surrounding punctuation removed.
pub fn key_words(key: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for word in key.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if !word.is_empty() && !words.iter().any(|w| w == word) {
            words.push(word.to_string());
        }
    }
    words
}

static FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:please|um+|uh+|hey|hi|hello|so|just|really|maybe|i think|i'd like to|i would like to|i want to|we want to|i'd love to|can you|could you|help me|plan a trip|plan me a trip)\b[,!.]?",
    )
    .expect("filler pattern is valid")
});

type Rewrite = (&'static Lazy<Regex>, &'static str);

static A_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:a|one) week\b").expect("week pattern is valid"));
static FORTNIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:a fortnight|fortnight|two weeks|2 weeks)\b").expect("fortnight pattern is valid")
});
static WEEKEND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:a |the )?weekend\b").expect("weekend pattern is valid"));

/// Relative duration phrases and their day-count restatement.
static DURATION_REWRITES: [Rewrite; 3] = [
    (&FORTNIGHT, "14 days"),
    (&A_WEEK, "7 days"),
    (&WEEKEND, "3 days"),
];

fn strip_filler(key: &str) -> String {
    normalize_key(&FILLER.replace_all(key, " "))
}

fn normalize_durations(key: &str) -> String {
    let rewritten = DURATION_REWRITES
        .iter()
        .fold(key.to_string(), |acc, (pattern, days)| {
            pattern.replace_all(&acc, *days).into_owned()
        });
    normalize_key(&rewritten)
}

/// Mechanical restatements of `key` stored alongside it: filler stripped,
/// relative durations as day counts, and both. Excludes `key` itself.
pub fn variations(key: &str) -> Vec<String> {
    let stripped = strip_filler(key);
    let candidates = [
        stripped.clone(),
        normalize_durations(key),
        normalize_durations(&stripped),
    ];
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && candidate != key && !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalization_collapses_case_and_whitespace() {
        assert_eq!(normalize_key("  3 Days\tin   LONDON "), "3 days in london");
    }

    #[test]
    fn key_words_strip_punctuation_and_duplicates() {
        assert_eq!(
            key_words("paris, paris! for 5 days?"),
            vec!["paris", "for", "5", "days"]
        );
    }

    #[test]
    fn variations_strip_filler() {
        let vars = variations("please i want to go to paris");
        assert!(vars.contains(&"go to paris".to_string()));
    }

    #[test]
    fn variations_restate_relative_durations() {
        let vars = variations("a week in lisbon");
        assert!(vars.contains(&"7 days in lisbon".to_string()));

        let vars = variations("weekend in rome");
        assert!(vars.contains(&"3 days in rome".to_string()));

        let vars = variations("two weeks in japan");
        assert!(vars.contains(&"14 days in japan".to_string()));
    }

    #[test]
    fn plain_key_has_no_variations() {
        assert!(variations("3 days in london").is_empty());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[ a-zA-Z0-9\t]{0,40}") {
            let once = normalize_key(&s);
            prop_assert_eq!(normalize_key(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }
    }
}
