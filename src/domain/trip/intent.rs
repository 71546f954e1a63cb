//! The accumulating structured trip request.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::merge::union_case_insensitive;

/// Separator used when several destinations are displayed as one string.
pub const DESTINATION_SEPARATOR: &str = ", ";

/// Budget tier preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Mid,
    Luxury,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Mid => "mid",
            Self::Luxury => "luxury",
        }
    }
}

/// Trip pace preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    Moderate,
    Packed,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Moderate => "moderate",
            Self::Packed => "packed",
        }
    }
}

/// Traveler party composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Travelers {
    pub adults: u32,
    pub children: u32,
}

impl Travelers {
    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }

    /// Total party size.
    pub fn total(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

/// Soft preferences for the trip. Every field is optional evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetTier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_see: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid: Vec<String>,
}

impl Preferences {
    /// Returns true if no preference was captured.
    pub fn is_empty(&self) -> bool {
        self.budget.is_none()
            && self.interests.is_empty()
            && self.pace.is_none()
            && self.must_see.is_empty()
            && self.avoid.is_empty()
    }
}

/// Names of the trip fields the dialogue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentField {
    Destination,
    StartDate,
    Duration,
    Travelers,
    Preferences,
}

impl IntentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Destination => "destination",
            Self::StartDate => "startDate",
            Self::Duration => "duration",
            Self::Travelers => "travelers",
            Self::Preferences => "preferences",
        }
    }
}

impl fmt::Display for IntentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured trip request, possibly partial.
///
/// When `destinations` is present it holds two or more cities and
/// `destination` is their display join.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travelers: Option<Travelers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_request: Option<String>,
}

impl ParsedIntent {
    /// Creates an empty intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.destinations.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.duration.is_none()
            && self.travelers.is_none()
            && self.preferences.as_ref().map_or(true, Preferences::is_empty)
            && self.modification_request.is_none()
    }

    /// Sets the destination(s), deduplicating case-insensitively and
    /// keeping first-seen order.
    pub fn set_destinations(&mut self, cities: Vec<String>) {
        let cities = union_case_insensitive(&[], &cities);
        match cities.len() {
            0 => {
                self.destination = None;
                self.destinations = None;
            }
            1 => {
                self.destination = cities.into_iter().next();
                self.destinations = None;
            }
            _ => {
                self.destination = Some(cities.join(DESTINATION_SEPARATOR));
                self.destinations = Some(cities);
            }
        }
    }

    /// Builder form of [`set_destinations`](Self::set_destinations).
    pub fn with_destinations<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_destinations(cities.into_iter().map(Into::into).collect());
        self
    }

    /// All known destinations in order.
    pub fn destination_list(&self) -> Vec<String> {
        if let Some(list) = &self.destinations {
            return list.clone();
        }
        self.destination
            .as_deref()
            .map(|d| {
                d.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_destination(&self) -> bool {
        self.destination
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    /// True if at least one of start or end date is known.
    pub fn has_any_date(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Duration, or the inclusive day count between start and end dates.
    pub fn effective_duration(&self) -> Option<u32> {
        self.duration.or_else(|| match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => inclusive_days(start, end),
            _ => None,
        })
    }

    /// Fills in whichever of duration/end date can be derived from the others.
    pub fn derive_missing_dates(&mut self) {
        if self.duration.is_none() {
            if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
                self.duration = inclusive_days(start, end);
            }
        }
        if self.end_date.is_none() {
            if let (Some(start), Some(days)) = (self.start_date, self.duration) {
                self.end_date = end_date_for(start, days);
            }
        }
    }

    /// Mutable access to preferences, creating them if absent.
    pub fn preferences_mut(&mut self) -> &mut Preferences {
        self.preferences.get_or_insert_with(Preferences::default)
    }

    /// One-line rendering of the known fields for prompts and logs.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(dest) = &self.destination {
            parts.push(format!("destination: {}", dest));
        }
        if let Some(start) = self.start_date {
            parts.push(format!("start: {}", start));
        }
        if let Some(end) = self.end_date {
            parts.push(format!("end: {}", end));
        }
        if let Some(days) = self.duration {
            parts.push(format!("duration: {} days", days));
        }
        if let Some(t) = self.travelers {
            parts.push(format!("travelers: {} adults, {} children", t.adults, t.children));
        }
        if let Some(prefs) = &self.preferences {
            if let Some(budget) = prefs.budget {
                parts.push(format!("budget: {}", budget.as_str()));
            }
            if !prefs.interests.is_empty() {
                parts.push(format!("interests: {}", prefs.interests.join("/")));
            }
            if let Some(pace) = prefs.pace {
                parts.push(format!("pace: {}", pace.as_str()));
            }
        }
        if parts.is_empty() {
            "nothing known yet".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Inclusive day count from `start` to `end`; `None` if `end` precedes `start`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    let days = (end - start).num_days() + 1;
    u32::try_from(days).ok().filter(|d| *d >= 1)
}

/// Last day of a trip of `days` days starting on `start`.
pub fn end_date_for(start: NaiveDate, days: u32) -> Option<NaiveDate> {
    if days == 0 {
        return None;
    }
    start.checked_add_signed(Duration::days(i64::from(days) - 1))
}
