//! Required-field checks.

use crate::domain::conversation::DialogueState;
use crate::domain::trip::{IntentField, ParsedIntent};

type FieldCheck = fn(&ParsedIntent) -> bool;

/// Required fields in the order they are asked for, with their presence test.
pub(crate) const REQUIRED_FIELDS: &[(IntentField, FieldCheck)] = &[
    (IntentField::Destination, ParsedIntent::has_destination),
    (IntentField::StartDate, ParsedIntent::has_any_date),
    (IntentField::Duration, has_duration),
];

fn has_duration(intent: &ParsedIntent) -> bool {
    intent.effective_duration().is_some_and(|d| d > 0)
}

/// Required fields still missing, highest priority first.
pub fn required_fields_missing(intent: &ParsedIntent) -> Vec<IntentField> {
    REQUIRED_FIELDS
        .iter()
        .filter(|(_, present)| !present(intent))
        .map(|(field, _)| *field)
        .collect()
}

/// True once destination, a date and a duration are all known.
pub fn can_generate(intent: &ParsedIntent) -> bool {
    REQUIRED_FIELDS.iter().all(|(_, present)| present(intent))
}

/// Dialogue state implied by the missing fields.
pub fn state_for(missing: &[IntentField]) -> DialogueState {
    missing
        .first()
        .map(|field| DialogueState::collecting(*field))
        .unwrap_or(DialogueState::ReadyToGenerate)
}
