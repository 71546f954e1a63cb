//! Field-by-field merge rules for `ParsedIntent`.
//!
//! Two policies exist:
//!
//! - [`ParsedIntent::overlay`]: extractor-level. Start from a floor (the
//!   pattern result) and overwrite a field only where the other side has an
//!   explicit non-empty value. Lists are replaced, not unioned.
//! - [`ParsedIntent::absorb`]: session-level. Scalars overwrite, lists
//!   (multi-city destinations, interests, must-see, avoid) are unioned, and
//!   dates are re-derived so start/end/duration stay consistent.

use super::intent::{ParsedIntent, Preferences};

/// Appends `incoming` to `base`, skipping case-insensitive duplicates and blanks.
pub fn union_case_insensitive(base: &[String], incoming: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(base.len() + incoming.len());
    for item in base.iter().chain(incoming) {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing.eq_ignore_ascii_case(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// Returns `base` with `update` absorbed into it.
pub fn merge_intents(base: &ParsedIntent, update: &ParsedIntent) -> ParsedIntent {
    let mut merged = base.clone();
    merged.absorb(update.clone());
    merged
}

impl ParsedIntent {
    /// Overwrites fields of `self` with the non-empty fields of `other`.
    pub fn overlay(&mut self, other: &ParsedIntent) {
        if other.has_destination() {
            self.destination = other.destination.clone();
            self.destinations = other.destinations.clone();
        }
        if other.start_date.is_some() {
            self.start_date = other.start_date;
        }
        if other.end_date.is_some() {
            self.end_date = other.end_date;
        }
        if other.duration.is_some_and(|d| d > 0) {
            self.duration = other.duration;
        }
        if other.travelers.is_some_and(|t| t.total() > 0) {
            self.travelers = other.travelers;
        }
        if let Some(theirs) = &other.preferences {
            let mine = self.preferences_mut();
            if theirs.budget.is_some() {
                mine.budget = theirs.budget;
            }
            if theirs.pace.is_some() {
                mine.pace = theirs.pace;
            }
            if !theirs.interests.is_empty() {
                mine.interests = theirs.interests.clone();
            }
            if !theirs.must_see.is_empty() {
                mine.must_see = theirs.must_see.clone();
            }
            if !theirs.avoid.is_empty() {
                mine.avoid = theirs.avoid.clone();
            }
        }
        if other
            .modification_request
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty())
        {
            self.modification_request = other.modification_request.clone();
        }
        self.derive_missing_dates();
    }

    /// Absorbs one turn's extraction result into the accumulated intent.
    pub fn absorb(&mut self, turn: ParsedIntent) {
        if let Some(list) = turn.destinations.as_ref().filter(|l| l.len() > 1) {
            let combined = union_case_insensitive(&self.destination_list(), list);
            self.set_destinations(combined);
        } else if turn.has_destination() {
            self.set_destinations(turn.destination_list());
        }

        let schedule_changed = turn.start_date.is_some() || turn.duration.is_some();
        let end_supplied = turn.end_date.is_some();

        if turn.start_date.is_some() {
            self.start_date = turn.start_date;
        }
        if turn.duration.is_some() {
            self.duration = turn.duration;
        }
        if end_supplied {
            self.end_date = turn.end_date;
            if turn.duration.is_none() && self.start_date.is_some() {
                // Duration is re-derived from the new end date.
                self.duration = None;
            }
        } else if schedule_changed && self.start_date.is_some() && self.duration.is_some() {
            self.end_date = None;
        }

        if turn.travelers.is_some() {
            self.travelers = turn.travelers;
        }
        if let Some(prefs) = turn.preferences {
            self.absorb_preferences(prefs);
        }
        if turn.modification_request.is_some() {
            self.modification_request = turn.modification_request;
        }
        self.derive_missing_dates();
    }

    fn absorb_preferences(&mut self, theirs: Preferences) {
        let mine = self.preferences_mut();
        if theirs.budget.is_some() {
            mine.budget = theirs.budget;
        }
        if theirs.pace.is_some() {
            mine.pace = theirs.pace;
        }
        mine.interests = union_case_insensitive(&mine.interests, &theirs.interests);
        mine.must_see = union_case_insensitive(&mine.must_see, &theirs.must_see);
        mine.avoid = union_case_insensitive(&mine.avoid, &theirs.avoid);
    }
}
