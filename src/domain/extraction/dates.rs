//! Start/end date extraction.
//!
//! Matchers run in a fixed priority order and the first one that resolves a
//! date wins: explicit range, explicit start, relative expression, bare month.
//! All relative arithmetic is done against the `today` handed in by the caller.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::vocabulary::{
    month_number, parse_number, weekday_index, MONTH_PATTERN, NUMBER_PATTERN,
};

/// A resolved start date and, for ranges, the inclusive end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateMatch {
    fn starting(start: NaiveDate) -> Self {
        Self { start, end: None }
    }
}

pub(crate) type DateMatcher = fn(&str, NaiveDate) -> Option<DateMatch>;

/// Date matchers in priority order.
pub(crate) const DATE_MATCHERS: &[(&str, DateMatcher)] = &[
    ("range", match_range),
    ("explicit_start", match_explicit_start),
    ("relative", match_relative),
    ("bare_month", match_bare_month),
];

const ORDINAL: &str = r"(?:st|nd|rd|th)?";

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({m})\s+(\d{{1,2}}){o}(?:,?\s+(\d{{4}}))?\s*(?:to|until|till|through|thru|-|–)\s*(?:({m})\s+)?(\d{{1,2}}){o}(?:,?\s+(\d{{4}}))?\b",
        m = MONTH_PATTERN.as_str(),
        o = ORDINAL
    ))
    .expect("range pattern is valid")
});

static EXPLICIT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:(starting|start|from|on|beginning|departing|leaving|arriving)\s+(?:on\s+)?)?({m})\s+(\d{{1,2}}){o}(?:,?\s+(\d{{4}}))?\b",
        m = MONTH_PATTERN.as_str(),
        o = ORDINAL
    ))
    .expect("explicit start pattern is valid")
});

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("iso date pattern is valid"));

static ISO_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\s*(?:to|until|till|through|thru|-|–)\s*(\d{4})-(\d{2})-(\d{2})\b")
        .expect("iso range pattern is valid")
});

static IN_N_UNITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bin\s+{}\s+(days?|weeks?)\b", NUMBER_PATTERN))
        .expect("relative offset pattern is valid")
});

static NEXT_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(next|this|on)\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("weekday pattern is valid")
});

static BARE_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(?:in|during|around|over|this|next|early|mid|late|for)\s+(?:of\s+)?({m})\b(?:\s+(\d{{1,2}}){o}\b)?",
        m = MONTH_PATTERN.as_str(),
        o = ORDINAL
    ))
    .expect("bare month pattern is valid")
});

/// Runs the date matchers against lowercased text.
pub fn extract_dates(lowercase: &str, today: NaiveDate) -> Option<DateMatch> {
    DATE_MATCHERS
        .iter()
        .find_map(|(_, matcher)| matcher(lowercase, today))
}

/// Resolves month/day to a date, using `year` if given, otherwise the current
/// year unless that date has already passed.
pub fn infer_date(month: u32, day: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn year_at(caps: &Captures<'_>, index: usize) -> Option<i32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn number_at(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn iso_at(caps: &Captures<'_>, first: usize) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        year_at(caps, first)?,
        number_at(caps, first + 1)?,
        number_at(caps, first + 2)?,
    )
}

fn match_range(text: &str, today: NaiveDate) -> Option<DateMatch> {
    let iso = ISO_RANGE.captures_iter(text).find_map(|caps| {
        let start = iso_at(&caps, 1)?;
        let end = iso_at(&caps, 4).filter(|end| *end >= start)?;
        Some(DateMatch {
            start,
            end: Some(end),
        })
    });
    if iso.is_some() {
        return iso;
    }

    RANGE.captures_iter(text).find_map(|caps| {
        let start_month = month_number(caps.get(1)?.as_str())?;
        let start_day = number_at(&caps, 2)?;
        let start = infer_date(start_month, start_day, year_at(&caps, 3), today)?;

        let end_day = number_at(&caps, 5)?;
        let end = match caps.get(4) {
            Some(m) => {
                let end_month = month_number(m.as_str())?;
                let year = year_at(&caps, 6).unwrap_or(start.year());
                let end = NaiveDate::from_ymd_opt(year, end_month, end_day)?;
                if end < start {
                    // Crosses New Year: "December 28 to January 3".
                    NaiveDate::from_ymd_opt(year + 1, end_month, end_day)?
                } else {
                    end
                }
            }
            None => {
                if end_day < start_day {
                    return None;
                }
                NaiveDate::from_ymd_opt(start.year(), start_month, end_day)?
            }
        };
        Some(DateMatch {
            start,
            end: Some(end),
        })
    })
}

fn match_explicit_start(text: &str, today: NaiveDate) -> Option<DateMatch> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let year = year_at(&caps, 1)?;
        let month = number_at(&caps, 2)?;
        let day = number_at(&caps, 3)?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(DateMatch::starting(date));
        }
    }

    EXPLICIT_START.captures_iter(text).find_map(|caps| {
        let month_word = caps.get(2)?.as_str();
        // "may" without a lead-in word is usually the verb.
        if caps.get(1).is_none() && month_word == "may" {
            return None;
        }
        let month = month_number(month_word)?;
        let day = number_at(&caps, 3)?;
        infer_date(month, day, year_at(&caps, 4), today).map(DateMatch::starting)
    })
}

fn days_until_weekday(today: NaiveDate, target: u32, allow_today: bool) -> i64 {
    let current = today.weekday().num_days_from_monday();
    let delta = (target + 7 - current) % 7;
    if delta == 0 && !allow_today {
        7
    } else {
        i64::from(delta)
    }
}

fn first_of_next_month(today: NaiveDate) -> Option<NaiveDate> {
    if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
}

fn match_relative(text: &str, today: NaiveDate) -> Option<DateMatch> {
    let offset = |days: i64| today.checked_add_signed(Duration::days(days));
    let weekday = today.weekday().num_days_from_monday();
    let saturday = 5;

    let start = if text.contains("day after tomorrow") {
        offset(2)
    } else if text.contains("tomorrow") {
        offset(1)
    } else if text.contains("next week") && !text.contains("next weekend") {
        offset(i64::from(7 - weekday))
    } else if text.contains("this weekend") {
        if weekday == 6 {
            Some(today)
        } else {
            offset(days_until_weekday(today, saturday, true))
        }
    } else if text.contains("next weekend") {
        if weekday == 6 {
            offset(6)
        } else {
            offset(days_until_weekday(today, saturday, true) + 7)
        }
    } else if text.contains("next month") {
        first_of_next_month(today)
    } else if let Some(caps) = NEXT_WEEKDAY.captures(text) {
        let target = weekday_index(caps.get(2)?.as_str())?;
        let allow_today = caps.get(1).map(|m| m.as_str()) == Some("this");
        offset(days_until_weekday(today, target, allow_today))
    } else if let Some(caps) = IN_N_UNITS.captures(text) {
        let n = i64::from(parse_number(caps.get(1)?.as_str())?);
        let unit = caps.get(2)?.as_str();
        if unit.starts_with("week") {
            offset(n * 7)
        } else {
            offset(n)
        }
    } else {
        None
    };
    start.map(DateMatch::starting)
}

fn match_bare_month(text: &str, today: NaiveDate) -> Option<DateMatch> {
    BARE_MONTH.captures_iter(text).find_map(|caps| {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = number_at(&caps, 2).unwrap_or(1);
        infer_date(month, day, None, today).map(DateMatch::starting)
    })
}
