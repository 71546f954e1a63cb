//! Trip length extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::vocabulary::{parse_number, NUMBER_PATTERN};

/// Canonical length of a "weekend" trip, in days.
pub const WEEKEND_DAYS: u32 = 3;
/// Length of a "fortnight", in days.
pub const FORTNIGHT_DAYS: u32 = 14;

pub(crate) type DurationMatcher = fn(&str) -> Option<u32>;

/// Duration matchers in priority order.
pub(crate) const DURATION_MATCHERS: &[(&str, DurationMatcher)] = &[
    ("days", match_days),
    ("weeks", match_weeks),
    ("fortnight", match_fortnight),
    ("weekend", match_weekend),
];

const EXTRA: &str = r"(?:more\s+|extra\s+|additional\s+)?";

// Group 1 catches "in"/"within" so "in 3 days" (a start offset) can be skipped.
static DAYS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:\b(in|within)\s+)?\b{}\s*(?:-\s*)?{}(?:days?|nights?)\b",
        NUMBER_PATTERN, EXTRA
    ))
    .expect("days pattern is valid")
});

static WEEKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:\b(in|within)\s+)?\b{}\s*(?:-\s*)?{}weeks?\b",
        NUMBER_PATTERN, EXTRA
    ))
    .expect("weeks pattern is valid")
});

static FORTNIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfortnight\b").expect("fortnight pattern is valid"));

static WEEKEND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bweekend\b").expect("weekend pattern is valid"));

/// Runs the duration matchers against lowercased text.
pub fn extract_duration(lowercase: &str) -> Option<u32> {
    DURATION_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(lowercase))
}

fn counted(re: &Regex, text: &str) -> Option<u32> {
    re.captures_iter(text)
        .filter(|caps| caps.get(1).is_none())
        .find_map(|caps| caps.get(2).and_then(|m| parse_number(m.as_str())))
        .filter(|n| *n > 0)
}

fn match_days(text: &str) -> Option<u32> {
    counted(&DAYS, text)
}

fn match_weeks(text: &str) -> Option<u32> {
    counted(&WEEKS, text).map(|weeks| weeks * 7)
}

fn match_fortnight(text: &str) -> Option<u32> {
    FORTNIGHT.is_match(text).then_some(FORTNIGHT_DAYS)
}

fn match_weekend(text: &str) -> Option<u32> {
    WEEKEND.is_match(text).then_some(WEEKEND_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duration(text: &str) -> Option<u32> {
        extract_duration(&text.to_lowercase())
    }

    #[test]
    fn explicit_days_and_nights() {
        assert_eq!(duration("3 days in London"), Some(3));
        assert_eq!(duration("five nights in Tokyo"), Some(5));
        assert_eq!(duration("a 4-day trip"), Some(4));
    }

    #[test]
    fn weeks_multiply_by_seven() {
        assert_eq!(duration("two weeks in Japan"), Some(14));
        assert_eq!(duration("a week in Lisbon"), Some(7));
    }

    #[test]
    fn fortnight_and_weekend() {
        assert_eq!(duration("a fortnight in Greece"), Some(FORTNIGHT_DAYS));
        assert_eq!(duration("weekend in Rome"), Some(WEEKEND_DAYS));
    }

    #[test]
    fn start_offsets_are_not_durations() {
        assert_eq!(duration("leaving in 3 days"), None);
        assert_eq!(duration("within two weeks"), None);
        assert_eq!(duration("leaving in 3 days for 5 days"), Some(5));
    }

    #[test]
    fn extension_phrasing_counts() {
        assert_eq!(duration("add 2 more days in Florence"), Some(2));
        assert_eq!(duration("3 extra nights"), Some(3));
    }

    #[test]
    fn a_couple_of_days() {
        assert_eq!(duration("a couple of days in Paris"), Some(2));
    }

    #[test]
    fn no_evidence_returns_none() {
        assert_eq!(duration("Paris please"), None);
        assert_eq!(duration("0 days"), None);
    }
}
