//! Destination extraction and extension-request detection.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::vocabulary::{find_known_cities, find_locative_places, NUMBER_PATTERN};

static EXTENSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        format!(
            r"\badd(?:ing)?\s+(?:another\s+)?{}\s+(?:more\s+|extra\s+)?(?:days?|nights?|weeks?)\b",
            NUMBER_PATTERN
        ),
        format!(
            r"\b{}\s+(?:more|extra|additional)\s+(?:days?|nights?|weeks?)\b",
            NUMBER_PATTERN
        ),
        r"\bextend(?:ing)?\s+(?:the|my|our|this)?\s*(?:trip|stay|vacation|holiday)\b".to_string(),
        r"\bafter\s+(?:the|my|our|that|this)\s+(?:trip|stay|visit)\b".to_string(),
        r"\b(?:also|then)\s+(?:visit|go\s+to|head\s+to|add)\b".to_string(),
        r"\badd\s+(?:a\s+)?(?:stop|leg)\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("extension pattern is valid"))
    .collect()
});

/// True if the lowercased message asks to extend an existing trip.
pub fn is_extension_request(lowercase: &str) -> bool {
    EXTENSION_PATTERNS.iter().any(|p| p.is_match(lowercase))
}

/// Destinations named in `original` (case preserved), deduplicated, in order
/// of appearance. Known cities and locative phrases both count; vague regions
/// never do.
pub fn extract_destinations(original: &str) -> Vec<String> {
    let mut mentions = find_known_cities(original);
    mentions.extend(find_locative_places(original));
    mentions.sort_by_key(|m| m.position);

    let mut names: Vec<String> = Vec::new();
    for mention in mentions {
        let seen = names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&mention.name));
        if !seen {
            names.push(mention.name);
        }
    }
    names
}
