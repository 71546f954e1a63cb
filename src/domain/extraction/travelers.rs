//! Traveler count extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::trip::Travelers;
use crate::domain::vocabulary::{parse_number, NUMBER_PATTERN};

pub(crate) type TravelerMatcher = fn(&str) -> Option<Travelers>;

/// Traveler matchers in priority order: explicit counts beat shortcuts.
pub(crate) const TRAVELER_MATCHERS: &[(&str, TravelerMatcher)] = &[
    ("explicit_counts", match_explicit_counts),
    ("family_of", match_family),
    ("of_us", match_of_us),
    ("couple", match_couple),
    ("solo", match_solo),
];

static ADULTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{}\s+(?:adults?|people|persons|travell?ers|guests|grown-?ups)\b",
        NUMBER_PATTERN
    ))
    .expect("adults pattern is valid")
});

static CHILDREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b{}\s+(?:children|child|kids?|toddlers?|teens?|teenagers?)\b",
        NUMBER_PATTERN
    ))
    .expect("children pattern is valid")
});

static FAMILY_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bfamily\s+of\s+{}\b", NUMBER_PATTERN))
        .expect("family pattern is valid")
});

static OF_US: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b{}\s+of\s+us\b", NUMBER_PATTERN)).expect("of-us pattern is valid")
});

static COUPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:couple|honeymoon|with\s+my\s+(?:wife|husband|partner|girlfriend|boyfriend|fianc[ée]e?))\b(\s+of\b)?")
        .expect("couple pattern is valid")
});

static SOLO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:solo|alone|by\s+myself|on\s+my\s+own|just\s+me)\b")
        .expect("solo pattern is valid")
});

/// Runs the traveler matchers against lowercased text.
pub fn extract_travelers(lowercase: &str) -> Option<Travelers> {
    TRAVELER_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(lowercase))
}

fn first_count(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_number(m.as_str()))
}

fn match_explicit_counts(text: &str) -> Option<Travelers> {
    let adults = first_count(&ADULTS, text);
    let children = first_count(&CHILDREN, text);
    if adults.is_none() && children.is_none() {
        return None;
    }
    // "a couple with 1 child": the shortcut still supplies the adults.
    let shortcuts: [TravelerMatcher; 3] = [match_of_us, match_couple, match_solo];
    let adults = adults.or_else(|| {
        shortcuts
            .iter()
            .find_map(|matcher| matcher(text))
            .map(|t| t.adults)
    });
    Some(Travelers::new(adults.unwrap_or(0), children.unwrap_or(0)))
}

fn match_family(text: &str) -> Option<Travelers> {
    let size = first_count(&FAMILY_OF, text)?;
    Some(Travelers::new(2, size.saturating_sub(2)))
}

fn match_of_us(text: &str) -> Option<Travelers> {
    first_count(&OF_US, text)
        .filter(|n| *n > 0)
        .map(|n| Travelers::new(n, 0))
}

fn match_couple(text: &str) -> Option<Travelers> {
    // "a couple of days" is a quantity, not two travelers.
    COUPLE
        .captures_iter(text)
        .any(|caps| caps.get(1).is_none())
        .then(|| Travelers::new(2, 0))
}

fn match_solo(text: &str) -> Option<Travelers> {
    SOLO.is_match(text).then(|| Travelers::new(1, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn travelers(text: &str) -> Option<Travelers> {
        extract_travelers(&text.to_lowercase())
    }

    #[test]
    fn explicit_adults_and_children() {
        assert_eq!(
            travelers("2 adults and 3 kids"),
            Some(Travelers::new(2, 3))
        );
        assert_eq!(travelers("four people"), Some(Travelers::new(4, 0)));
        assert_eq!(travelers("with 2 children"), Some(Travelers::new(0, 2)));
    }

    #[test]
    fn family_of_n_splits_two_adults() {
        assert_eq!(travelers("family of 5"), Some(Travelers::new(2, 3)));
        assert_eq!(travelers("a family of two"), Some(Travelers::new(2, 0)));
    }

    #[test]
    fn shortcuts() {
        assert_eq!(travelers("solo trip"), Some(Travelers::new(1, 0)));
        assert_eq!(travelers("just me"), Some(Travelers::new(1, 0)));
        assert_eq!(travelers("romantic getaway for a couple"), Some(Travelers::new(2, 0)));
        assert_eq!(travelers("going with my wife"), Some(Travelers::new(2, 0)));
        assert_eq!(travelers("the three of us"), Some(Travelers::new(3, 0)));
    }

    #[test]
    fn couple_of_days_is_not_a_couple() {
        assert_eq!(travelers("a couple of days in Paris"), None);
    }

    #[test]
    fn children_count_keeps_adults_from_shortcut() {
        assert_eq!(
            travelers("a couple traveling with 1 child"),
            Some(Travelers::new(2, 1))
        );
        assert_eq!(
            travelers("3 adults, we are a couple plus friends"),
            Some(Travelers::new(3, 0))
        );
    }

    #[test]
    fn no_evidence() {
        assert_eq!(travelers("3 days in London"), None);
    }
}
