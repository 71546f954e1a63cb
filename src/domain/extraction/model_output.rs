//! Lenient mapping from a recovered model JSON object to a `ParsedIntent`.
//!
//! Models are inconsistent about casing, numbers-as-strings and placeholder
//! values. Anything unusable is dropped field by field; a bad field never
//! invalidates the rest of the object.

use chrono::NaiveDate;
use serde_json::Value;

use super::repair::JsonObject;
use crate::domain::trip::{BudgetTier, Pace, ParsedIntent, Preferences, Travelers};

/// Counts above this (days or people) are treated as noise.
const MAX_COUNT: u64 = 365;

const PLACEHOLDERS: &[&str] = &["", "null", "none", "unknown", "n/a", "not specified", "unspecified"];

fn field<'a>(obj: &'a JsonObject, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if PLACEHOLDERS.contains(&s.to_lowercase().as_str()) {
        None
    } else {
        Some(s.to_string())
    }
}

fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        Value::String(_) => text(value)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Accepts `5`, `5.0`, `"5"` and `"5 days"`, up to [`MAX_COUNT`].
fn positive_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.round() as u64))?,
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|first| first.parse::<u64>().ok())?,
        _ => return None,
    };
    if n > MAX_COUNT {
        return None;
    }
    u32::try_from(n).ok()
}

fn date(value: &Value) -> Option<NaiveDate> {
    let s = text(value)?;
    let head = s.get(..10).unwrap_or(&s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn budget(value: &Value) -> Option<BudgetTier> {
    let s = text(value)?.to_lowercase();
    match s.as_str() {
        "budget" | "low" | "cheap" | "economy" | "backpacker" => Some(BudgetTier::Budget),
        "mid" | "mid-range" | "midrange" | "moderate" | "medium" | "standard" => {
            Some(BudgetTier::Mid)
        }
        "luxury" | "high" | "high-end" | "premium" => Some(BudgetTier::Luxury),
        _ => None,
    }
}

fn pace(value: &Value) -> Option<Pace> {
    let s = text(value)?.to_lowercase();
    match s.as_str() {
        "relaxed" | "slow" | "leisurely" => Some(Pace::Relaxed),
        "moderate" | "balanced" | "medium" => Some(Pace::Moderate),
        "packed" | "fast" | "busy" | "intense" => Some(Pace::Packed),
        _ => None,
    }
}

fn travelers(value: &Value) -> Option<Travelers> {
    let t = match value {
        Value::Object(obj) => {
            let adults = field(obj, &["adults"]).and_then(positive_count);
            let children = field(obj, &["children", "kids"]).and_then(positive_count);
            if adults.is_none() && children.is_none() {
                return None;
            }
            Travelers::new(adults.unwrap_or(0), children.unwrap_or(0))
        }
        other => Travelers::new(positive_count(other)?, 0),
    };
    (t.total() > 0).then_some(t)
}

fn preferences(root: &JsonObject) -> Option<Preferences> {
    let nested = field(root, &["preferences"]).and_then(Value::as_object);
    // Preference fields may be nested or sit at the top level.
    let lookup = |names: &[&str]| {
        nested
            .and_then(|p| field(p, names))
            .or_else(|| field(root, names))
    };
    let prefs = Preferences {
        budget: lookup(&["budget"]).and_then(budget),
        interests: lookup(&["interests"])
            .map(text_list)
            .unwrap_or_default()
            .into_iter()
            .map(|i| i.to_lowercase())
            .collect(),
        pace: lookup(&["pace"]).and_then(pace),
        must_see: lookup(&["mustSee", "must_see"]).map(text_list).unwrap_or_default(),
        avoid: lookup(&["avoid"]).map(text_list).unwrap_or_default(),
    };
    (!prefs.is_empty()).then_some(prefs)
}

/// Converts a recovered model object into a partial intent.
pub fn intent_from_model_object(obj: &JsonObject) -> ParsedIntent {
    let mut intent = ParsedIntent::new();

    let mut cities = field(obj, &["destinations"])
        .map(text_list)
        .unwrap_or_default();
    if cities.is_empty() {
        cities = field(obj, &["destination"]).map(text_list).unwrap_or_default();
    }
    intent.set_destinations(cities);

    intent.start_date = field(obj, &["startDate", "start_date"]).and_then(date);
    intent.end_date = field(obj, &["endDate", "end_date"]).and_then(date);
    if let (Some(start), Some(end)) = (intent.start_date, intent.end_date) {
        if end < start {
            intent.end_date = None;
        }
    }
    intent.duration = field(obj, &["duration", "durationDays", "days"])
        .and_then(positive_count)
        .filter(|d| *d > 0);
    intent.travelers = field(obj, &["travelers", "travellers"]).and_then(travelers);
    intent.preferences = preferences(obj);
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(value: Value) -> ParsedIntent {
        intent_from_model_object(value.as_object().unwrap())
    }

    #[test]
    fn well_formed_object() {
        let intent = convert(json!({
            "destination": "Kyoto",
            "startDate": "2025-04-01",
            "endDate": "2025-04-05",
            "duration": 5,
            "travelers": {"adults": 2, "children": 1},
            "preferences": {"budget": "luxury", "interests": ["Food", "temples"], "pace": "relaxed"}
        }));
        assert_eq!(intent.destination.as_deref(), Some("Kyoto"));
        assert_eq!(intent.start_date, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(intent.end_date, NaiveDate::from_ymd_opt(2025, 4, 5));
        assert_eq!(intent.duration, Some(5));
        assert_eq!(intent.travelers, Some(Travelers::new(2, 1)));
        let prefs = intent.preferences.unwrap();
        assert_eq!(prefs.budget, Some(BudgetTier::Luxury));
        assert_eq!(prefs.interests, vec!["food", "temples"]);
        assert_eq!(prefs.pace, Some(Pace::Relaxed));
    }

    #[test]
    fn lenient_scalars() {
        let intent = convert(json!({
            "destination": "Rome",
            "duration": "4 days",
            "travelers": 3,
            "budget": "moderate"
        }));
        assert_eq!(intent.duration, Some(4));
        assert_eq!(intent.travelers, Some(Travelers::new(3, 0)));
        assert_eq!(intent.preferences.unwrap().budget, Some(BudgetTier::Mid));
    }

    #[test]
    fn placeholders_and_nulls_are_dropped() {
        let intent = convert(json!({
            "destination": "unknown",
            "startDate": null,
            "endDate": "N/A",
            "duration": 0,
            "travelers": {"adults": 0}
        }));
        assert!(intent.is_empty());
    }

    #[test]
    fn multi_city_from_array_or_comma_string() {
        let a = convert(json!({"destinations": ["Rome", "Florence"]}));
        let b = convert(json!({"destination": "Rome, Florence"}));
        assert_eq!(a, b);
        assert_eq!(a.destination.as_deref(), Some("Rome, Florence"));
    }

    #[test]
    fn snake_case_keys_and_datetime_strings() {
        let intent = convert(json!({
            "start_date": "2025-09-10T00:00:00Z",
            "must_see": ["Louvre"]
        }));
        assert_eq!(intent.start_date, NaiveDate::from_ymd_opt(2025, 9, 10));
        assert_eq!(intent.preferences.unwrap().must_see, vec!["Louvre"]);
    }

    #[test]
    fn implausible_counts_are_dropped() {
        let intent = convert(json!({
            "destination": "Rome",
            "duration": 4294967295u64,
            "travelers": {"adults": 4294967295u64, "children": 1}
        }));
        assert_eq!(intent.duration, None);
        assert_eq!(intent.travelers, Some(Travelers::new(0, 1)));

        let intent = convert(json!({"duration": "1000000 days", "travelers": 99999}));
        assert!(intent.is_empty());
    }

    #[test]
    fn end_before_start_is_dropped() {
        let intent = convert(json!({"startDate": "2025-05-10", "endDate": "2025-05-01"}));
        assert_eq!(intent.end_date, None);
    }

    #[test]
    fn malformed_date_is_ignored() {
        let intent = convert(json!({"startDate": "next tuesday"}));
        assert_eq!(intent.start_date, None);
    }
}
