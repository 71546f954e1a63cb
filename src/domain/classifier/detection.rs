//! Entity detection used by the classifier: destinations and date mentions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::vocabulary::{find_known_cities, find_locative_places, NUMBER_PATTERN};

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(
            r"\b{}\s*(?:-\s*)?(?:days?|nights?|weeks?|months?)\b",
            NUMBER_PATTERN
        ),
        r"\b(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b".to_string(),
        r"\b(?:january|february|march|april|june|july|august|september|october|november|december)\b"
            .to_string(),
        r"\bmay\s+\d{1,2}\b|\b(?:in|during|early|mid|late|this|next)\s+may\b".to_string(),
        r"\b\d{4}-\d{2}-\d{2}\b".to_string(),
        r"\b\d{1,2}[/.]\d{1,2}(?:[/.]\d{2,4})?\b".to_string(),
        r"\b(?:tomorrow|tonight|today|fortnight|weekend)\b".to_string(),
        r"\b(?:next|this)\s+(?:week|month|year)\b".to_string(),
        r"\bin\s+\d+\s+(?:days?|weeks?)\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date detection pattern is valid"))
    .collect()
});

/// Destination-like names in `text`, deduplicated in order of appearance.
///
/// A name counts if it is a known city, or a capitalized phrase after a
/// locative preposition that is either a known city or spans two or more words.
pub fn detect_destinations(text: &str) -> Vec<String> {
    let mut mentions = find_known_cities(text);
    mentions.extend(
        find_locative_places(text)
            .into_iter()
            .filter(|m| m.known || m.word_count() >= 2),
    );
    mentions.sort_by_key(|m| m.position);

    let mut names: Vec<String> = Vec::new();
    for mention in mentions {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&mention.name)) {
            names.push(mention.name);
        }
    }
    names
}

/// Literal date and duration expressions found in `text` (lowercased).
pub fn date_mentions(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for pattern in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(&lower) {
            let mention = m.as_str().trim().to_string();
            if !found.contains(&mention) {
                found.push(mention);
            }
        }
    }
    found
}
