//! Shared lexical tables for the classifier and the pattern engine.
//!
//! Everything here is fixed data plus a few lookups over it; no state.

use once_cell::sync::Lazy;
use regex::Regex;

/// Known cities, in canonical display form. Multi-word names are matched as a unit.
///
/// Cities whose names are also common English words ("Nice", "Split") are left
/// out; they are still found after a locative preposition.
pub const KNOWN_CITIES: &[&str] = &[
    "Amsterdam", "Athens", "Auckland", "Bali", "Bangkok", "Barcelona", "Beijing",
    "Berlin", "Boston", "Bruges", "Brussels", "Budapest", "Buenos Aires", "Cairo",
    "Cancun", "Cape Town", "Chicago", "Copenhagen", "Cusco", "Delhi", "Dubai",
    "Dublin", "Dubrovnik", "Edinburgh", "Florence", "Geneva", "Hanoi", "Havana",
    "Helsinki", "Ho Chi Minh City", "Hong Kong", "Honolulu", "Istanbul", "Jerusalem",
    "Kraków", "Krakow", "Kuala Lumpur", "Kyoto", "Las Vegas", "Lima", "Lisbon",
    "London", "Los Angeles", "Lyon", "Madrid", "Marrakech", "Melbourne", "Mexico City",
    "Miami", "Milan", "Montreal", "Moscow", "Mumbai", "Munich", "Naples", "New Orleans",
    "New York", "New York City", "Osaka", "Oslo", "Paris", "Porto", "Prague",
    "Reykjavik", "Rio de Janeiro", "Rome", "San Francisco", "Santorini", "Seattle",
    "Seoul", "Seville", "Shanghai", "Singapore", "Stockholm", "Sydney",
    "Tel Aviv", "Tokyo", "Toronto", "Vancouver", "Venice", "Vienna", "Washington",
    "Zurich",
];

/// Region names that are too vague to count as a destination on their own.
pub const VAGUE_REGIONS: &[&str] = &[
    "africa", "antarctica", "asia", "balkans", "caribbean", "central america",
    "europe", "latin america", "mediterranean", "middle east", "north america",
    "oceania", "scandinavia", "south america", "southeast asia", "the balkans",
    "the caribbean", "the mediterranean", "the middle east",
];

/// Month names and abbreviations with their month number.
pub const MONTHS: &[(&str, u32)] = &[
    ("january", 1), ("february", 2), ("march", 3), ("april", 4), ("may", 5),
    ("june", 6), ("july", 7), ("august", 8), ("september", 9), ("october", 10),
    ("november", 11), ("december", 12), ("jan", 1), ("feb", 2), ("mar", 3),
    ("apr", 4), ("jun", 6), ("jul", 7), ("aug", 8), ("sept", 9), ("sep", 9),
    ("oct", 10), ("nov", 11), ("dec", 12),
];

/// Weekday names, Monday first.
pub const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

/// Capitalized words that follow a preposition but never start a place name.
const NOT_A_PLACE: &[&str] = &[
    "i", "me", "my", "our", "we", "you", "it", "this", "that", "next", "a", "an",
    "the", "us", "them", "they", "he", "she", "his", "her", "their", "your",
    "early", "mid", "late", "first", "last",
    "summer", "winter", "spring", "autumn", "fall", "christmas", "easter",
    "thanksgiving", "new year", "new years", "halloween", "july", "may", "march",
];

/// Regex alternation matching a number written as digits or words.
pub const NUMBER_PATTERN: &str = r"(\d{1,3}|a couple of|couple of|an|a|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

/// Regex alternation of month names (full names before abbreviations).
pub static MONTH_PATTERN: Lazy<String> = Lazy::new(|| {
    MONTHS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|")
});

static CITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    let mut names: Vec<&str> = KNOWN_CITIES.to_vec();
    // Longest first so "New York City" wins over "New York".
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("city regex is valid")
});

static LOCATIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?i:in|to|from|visit|visiting|via|through|at|towards)\s+([A-Z][\p{L}'\-]+(?:\s+(?:de\s+|del\s+)?[A-Z][\p{L}'\-]+){0,3})",
    )
    .expect("locative regex is valid")
});

/// A place-like phrase found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceMention {
    /// Byte offset of the mention in the source text.
    pub position: usize,
    /// Display form of the place.
    pub name: String,
    /// True if the name is in [`KNOWN_CITIES`].
    pub known: bool,
}

impl PlaceMention {
    pub fn word_count(&self) -> usize {
        self.name.split_whitespace().count()
    }
}

/// Returns the canonical display name of a known city, case-insensitively.
pub fn canonical_city(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    KNOWN_CITIES
        .iter()
        .find(|city| city.eq_ignore_ascii_case(trimmed))
        .copied()
}

/// True if `name` is a vague region rather than a concrete destination.
pub fn is_vague_region(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    VAGUE_REGIONS.iter().any(|r| *r == lower)
}

/// Month number for a month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    MONTHS.iter().find(|(m, _)| *m == lower).map(|(_, n)| *n)
}

/// Zero-based weekday index (Monday = 0) for a weekday name.
pub fn weekday_index(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    WEEKDAYS.iter().position(|d| *d == lower).map(|i| i as u32)
}

/// Parses a number written as digits or an English word.
pub fn parse_number(token: &str) -> Option<u32> {
    let lower = token.trim().to_lowercase();
    if let Ok(n) = lower.parse::<u32>() {
        return Some(n);
    }
    let n = match lower.as_str() {
        "a" | "an" | "one" => 1,
        "a couple of" | "couple of" | "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

/// Known cities mentioned anywhere in `text`, in order of appearance.
pub fn find_known_cities(text: &str) -> Vec<PlaceMention> {
    CITY_REGEX
        .find_iter(text)
        .filter_map(|m| {
            canonical_city(m.as_str()).map(|name| PlaceMention {
                position: m.start(),
                name: name.to_string(),
                known: true,
            })
        })
        .collect()
}

/// Capitalized phrases following a locative preposition ("in", "to", ...).
///
/// Month names, weekdays, pronouns, seasons and vague regions are dropped.
pub fn find_locative_places(text: &str) -> Vec<PlaceMention> {
    LOCATIVE_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let phrase = m.as_str().trim();
            let first = phrase.split_whitespace().next()?.to_lowercase();
            if NOT_A_PLACE.contains(&first.as_str())
                || NOT_A_PLACE.contains(&phrase.to_lowercase().as_str())
                || month_number(&first).is_some()
                || weekday_index(&first).is_some()
                || is_vague_region(phrase)
            {
                return None;
            }
            let known = canonical_city(phrase);
            Some(PlaceMention {
                position: m.start(),
                name: known.map(str::to_string).unwrap_or_else(|| phrase.to_string()),
                known: known.is_some(),
            })
        })
        .collect()
}
