//! The pattern extraction engine.

use chrono::NaiveDate;

use super::dates::extract_dates;
use super::destinations::{extract_destinations, is_extension_request};
use super::duration::extract_duration;
use super::preferences::extract_preferences;
use super::travelers::extract_travelers;
use crate::domain::trip::{inclusive_days, union_case_insensitive, ParsedIntent};

/// Lowercases and collapses whitespace.
pub fn normalize_text(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Deterministic keyword and pattern extraction.
///
/// Fields with no evidence in the message are left unset. The only state is
/// the reference date used to resolve relative and year-less dates, fixed at
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct PatternExtractor {
    today: NaiveDate,
}

impl PatternExtractor {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// True if `message` is an extension of `prior` ("add 3 days in Paris").
    ///
    /// Requires a prior destination; without one there is nothing to extend.
    pub fn is_extension(&self, message: &str, prior: Option<&ParsedIntent>) -> bool {
        prior.is_some_and(ParsedIntent::has_destination)
            && is_extension_request(&normalize_text(message))
    }

    /// Extracts a partial intent from `message`.
    pub fn extract(&self, message: &str, prior: Option<&ParsedIntent>) -> ParsedIntent {
        let original = message.split_whitespace().collect::<Vec<_>>().join(" ");
        let lowercase = original.to_lowercase();
        let mut intent = ParsedIntent::new();

        let destinations = extract_destinations(&original);
        let mut duration = extract_duration(&lowercase);

        if let Some(dates) = extract_dates(&lowercase, self.today) {
            intent.start_date = Some(dates.start);
            if let Some(end) = dates.end {
                intent.end_date = Some(end);
                // A range fixes the day count.
                duration = inclusive_days(dates.start, end).or(duration);
            }
        }

        match prior.filter(|_| self.is_extension(message, prior)) {
            Some(prior) => {
                apply_extension(&mut intent, prior, destinations, duration, message);
            }
            None => {
                intent.set_destinations(destinations);
                intent.duration = duration;
            }
        }

        intent.travelers = extract_travelers(&lowercase);
        intent.preferences = extract_preferences(&original, &lowercase);
        intent.derive_missing_dates();

        tracing::debug!(
            target: "trip_intent::extraction",
            summary = %intent.summary(),
            "pattern extraction complete"
        );
        intent
    }
}

/// Extension turn: new cities are appended to the prior ones and a new
/// duration is added to the prior duration.
pub fn apply_extension(
    intent: &mut ParsedIntent,
    prior: &ParsedIntent,
    new_destinations: Vec<String>,
    added_days: Option<u32>,
    message: &str,
) {
    if !new_destinations.is_empty() {
        let combined = union_case_insensitive(&prior.destination_list(), &new_destinations);
        intent.set_destinations(combined);
    }
    intent.duration = match (prior.effective_duration(), added_days) {
        (Some(base), Some(extra)) => Some(base.saturating_add(extra)),
        (None, Some(extra)) => Some(extra),
        (_, None) => None,
    };
    intent.modification_request = Some(message.trim().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trip::{BudgetTier, Travelers};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn extract(message: &str) -> ParsedIntent {
        PatternExtractor::new(today()).extract(message, None)
    }

    mod scenarios {
        use super::*;

        #[test]
        fn days_in_london() {
            let intent = extract("3 days in London");
            assert_eq!(intent.destination.as_deref(), Some("London"));
            assert_eq!(intent.duration, Some(3));
            assert_eq!(intent.start_date, None);
            assert_eq!(intent.travelers, None);
        }

        #[test]
        fn weekend_in_rome() {
            let intent = extract("weekend in Rome");
            assert_eq!(intent.destination.as_deref(), Some("Rome"));
            assert_eq!(intent.duration, Some(3));
        }

        #[test]
        fn want_to_go_to_paris() {
            let intent = extract("I want to go to Paris for 5 days");
            assert_eq!(intent.destination.as_deref(), Some("Paris"));
            assert_eq!(intent.duration, Some(5));
            assert!(!intent.has_any_date());
        }

        #[test]
        fn full_request() {
            let intent = extract(
                "A week in Lisbon starting July 3 for 2 adults and 1 kid, cheap and lots of food",
            );
            assert_eq!(intent.destination.as_deref(), Some("Lisbon"));
            assert_eq!(intent.duration, Some(7));
            assert_eq!(intent.start_date, NaiveDate::from_ymd_opt(2025, 7, 3));
            assert_eq!(intent.end_date, NaiveDate::from_ymd_opt(2025, 7, 9));
            assert_eq!(intent.travelers, Some(Travelers::new(2, 1)));
            let prefs = intent.preferences.unwrap();
            assert_eq!(prefs.budget, Some(BudgetTier::Budget));
            assert_eq!(prefs.interests, vec!["food"]);
        }

        #[test]
        fn range_sets_duration() {
            let intent = extract("Tokyo from October 1 to October 5");
            assert_eq!(intent.destination.as_deref(), Some("Tokyo"));
            assert_eq!(intent.duration, Some(5));
            assert_eq!(intent.end_date, NaiveDate::from_ymd_opt(2025, 10, 5));
        }

        #[test]
        fn multi_city_joins_destination() {
            let intent = extract("10 days across Rome, Florence and Venice");
            assert_eq!(
                intent.destinations,
                Some(vec!["Rome".to_string(), "Florence".to_string(), "Venice".to_string()])
            );
            assert_eq!(intent.destination.as_deref(), Some("Rome, Florence, Venice"));
        }

        #[test]
        fn nothing_to_find() {
            assert!(extract("asdfghjkl qwerty").is_empty());
        }
    }

    mod extension {
        use super::*;

        fn prior() -> ParsedIntent {
            let mut prior = ParsedIntent::new().with_destinations(["London"]);
            prior.duration = Some(5);
            prior
        }

        #[test]
        fn add_days_in_new_city_accumulates() {
            let extractor = PatternExtractor::new(today());
            let intent = extractor.extract("add 3 days in Paris", Some(&prior()));
            assert_eq!(
                intent.destinations,
                Some(vec!["London".to_string(), "Paris".to_string()])
            );
            assert_eq!(intent.duration, Some(8));
            assert_eq!(intent.modification_request.as_deref(), Some("add 3 days in Paris"));
        }

        #[test]
        fn existing_city_is_not_duplicated() {
            let extractor = PatternExtractor::new(today());
            let intent = extractor.extract("2 more days in london", Some(&prior()));
            assert_eq!(intent.destination.as_deref(), Some("London"));
            assert_eq!(intent.destinations, None);
            assert_eq!(intent.duration, Some(7));
        }

        #[test]
        fn no_prior_destination_means_plain_extraction() {
            let extractor = PatternExtractor::new(today());
            let intent = extractor.extract("add 3 days in Paris", Some(&ParsedIntent::new()));
            assert_eq!(intent.destination.as_deref(), Some("Paris"));
            assert_eq!(intent.duration, Some(3));
            assert_eq!(intent.modification_request, None);
        }

        #[test]
        fn non_extension_with_prior_replaces() {
            let extractor = PatternExtractor::new(today());
            let intent = extractor.extract("actually 4 days in Madrid", Some(&prior()));
            assert_eq!(intent.destination.as_deref(), Some("Madrid"));
            assert_eq!(intent.duration, Some(4));
        }

        #[test]
        fn huge_prior_duration_saturates() {
            let mut prior = prior();
            prior.duration = Some(u32::MAX);
            let extractor = PatternExtractor::new(today());
            let intent = extractor.extract("add 3 days in Paris", Some(&prior));
            assert_eq!(intent.duration, Some(u32::MAX));
        }
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_text("  3  Days\tin   LONDON "), "3 days in london");
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(message in "[a-zA-Z0-9 ,.]{0,60}") {
            let extractor = PatternExtractor::new(today());
            let prior = ParsedIntent::new().with_destinations(["Rome"]);
            let first = extractor.extract(&message, Some(&prior));
            let second = extractor.extract(&message, Some(&prior));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn start_and_duration_always_give_consistent_end(days in 1u32..60, offset in 0i64..300) {
            let start = today() + chrono::Duration::days(offset);
            let message = format!("{} days in Rome starting {}", days, start.format("%Y-%m-%d"));
            let intent = PatternExtractor::new(today()).extract(&message, None);
            prop_assert_eq!(intent.start_date, Some(start));
            prop_assert_eq!(
                intent.end_date,
                Some(start + chrono::Duration::days(i64::from(days) - 1))
            );
        }
    }
}
