//! Complexity scoring and key-phrase collection.

use once_cell::sync::Lazy;
use regex::Regex;

use super::patterns::{CONSTRAINT_KEYWORDS, TOPICAL_KEYWORDS};
use super::types::ClassificationMetadata;

pub const MAX_COMPLEXITY: u8 = 10;

static SENTENCE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence split pattern is valid"));

static CLAUSE_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r",|;|\b(?:and|but|then|or|while|because)\b").expect("clause split pattern is valid")
});

type KeywordSet = Vec<(&'static str, Regex)>;

fn keyword_set(keywords: &[&'static str]) -> KeywordSet {
    keywords
        .iter()
        .map(|k| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(k)))
                .expect("keyword pattern is valid");
            (*k, re)
        })
        .collect()
}

static TOPICAL: Lazy<KeywordSet> = Lazy::new(|| keyword_set(TOPICAL_KEYWORDS));
static CONSTRAINTS: Lazy<KeywordSet> = Lazy::new(|| keyword_set(CONSTRAINT_KEYWORDS));

fn keyword_hits(lowercase: &str, keywords: &KeywordSet) -> Vec<String> {
    keywords
        .iter()
        .filter(|(_, re)| re.is_match(lowercase))
        .map(|(k, _)| k.to_string())
        .collect()
}

fn length_score(chars: usize) -> u8 {
    match chars {
        c if c > 150 => 3,
        c if c > 80 => 2,
        c if c > 40 => 1,
        _ => 0,
    }
}

fn capped(count: usize, cap: usize) -> u8 {
    count.min(cap) as u8
}

/// Builds metadata for a message given the entities already detected in it.
pub fn compute_metadata(
    text: &str,
    destinations: &[String],
    date_mentions: &[String],
) -> ClassificationMetadata {
    let lower = text.to_lowercase();

    let sentences = SENTENCE_SPLIT
        .split(&lower)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let clauses = CLAUSE_SPLIT
        .split(&lower)
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let topical = keyword_hits(&lower, &TOPICAL);
    let constraints = keyword_hits(&lower, &CONSTRAINTS);

    let score = length_score(text.chars().count())
        + capped(sentences - 1, 2)
        + capped(clauses.saturating_sub(2), 2)
        + capped(destinations.len().saturating_sub(1), 2)
        + capped(topical.len(), 2)
        + capped(constraints.len(), 2);

    let mut key_phrases = topical;
    key_phrases.extend(constraints);

    let mut detected_entities: Vec<String> = destinations.to_vec();
    detected_entities.extend(date_mentions.iter().cloned());

    ClassificationMetadata {
        key_phrases,
        detected_entities,
        complexity: score.min(MAX_COMPLEXITY),
    }
}
