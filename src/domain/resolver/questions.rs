//! Follow-up questions for missing fields.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::trip::{IntentField, ParsedIntent};

const DESTINATION_QUESTIONS: &[&str] = &[
    "Where would you like to go?",
    "Which city or place do you have in mind?",
    "What destination are you dreaming of?",
];

const DATE_QUESTIONS: &[&str] = &[
    "When are you planning to travel to {destination}?",
    "What dates work for your trip to {destination}?",
    "When would you like to start your {destination} trip?",
];

const DURATION_QUESTIONS: &[&str] = &[
    "How many days will you spend in {destination}?",
    "How long would you like to stay in {destination}?",
    "How many days should I plan for {destination}?",
];

const TRAVELER_QUESTIONS: &[&str] = &[
    "Who's coming along on the trip to {destination}?",
    "How many people are travelling?",
];

const PREFERENCE_QUESTIONS: &[&str] = &[
    "What do you enjoy most when travelling: food, museums, nature, nightlife?",
    "Any must-sees or things you'd rather skip in {destination}?",
];

/// Stand-in when no destination is known yet.
const UNKNOWN_DESTINATION: &str = "your destination";

fn variants(field: IntentField) -> &'static [&'static str] {
    match field {
        IntentField::Destination => DESTINATION_QUESTIONS,
        IntentField::StartDate => DATE_QUESTIONS,
        IntentField::Duration => DURATION_QUESTIONS,
        IntentField::Travelers => TRAVELER_QUESTIONS,
        IntentField::Preferences => PREFERENCE_QUESTIONS,
    }
}

/// Renders variant `variant` (modulo the variant count) of the question for
/// `field`, personalised with what `intent` already holds.
pub fn question_variant(field: IntentField, intent: &ParsedIntent, variant: usize) -> String {
    let templates = variants(field);
    let template = templates[variant % templates.len()];
    let destination = intent
        .destination
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(UNKNOWN_DESTINATION);
    let mut question = template.replace("{destination}", destination);

    if field == IntentField::StartDate {
        if let Some(days) = intent.effective_duration() {
            let unit = if days == 1 { "day" } else { "days" };
            question.push_str(&format!(" ({} {})", days, unit));
        }
    }
    question
}

/// Picks question phrasings in rotation so repeated asks don't read the same.
#[derive(Debug, Default)]
pub struct QuestionGenerator {
    turn: AtomicUsize,
}

impl QuestionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_question(&self, field: IntentField, intent: &ParsedIntent) -> String {
        let variant = self.turn.fetch_add(1, Ordering::Relaxed);
        question_variant(field, intent, variant)
    }
}
