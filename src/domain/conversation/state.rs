//! Dialogue state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;
use crate::domain::trip::IntentField;

/// Phase of the trip-planning dialogue.
///
/// The collecting states and `ReadyToGenerate` are chosen by the missing-field
/// resolver after every turn. `Generating`, `ShowingItinerary` and
/// `AwaitingFeedback` are set by the itinerary generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Initial,
    CollectingDestination,
    CollectingDates,
    CollectingDuration,
    CollectingTravelers,
    CollectingPreferences,
    ReadyToGenerate,
    Generating,
    ShowingItinerary,
    AwaitingFeedback,
}

impl DialogueState {
    pub const ALL: [DialogueState; 10] = [
        DialogueState::Initial,
        DialogueState::CollectingDestination,
        DialogueState::CollectingDates,
        DialogueState::CollectingDuration,
        DialogueState::CollectingTravelers,
        DialogueState::CollectingPreferences,
        DialogueState::ReadyToGenerate,
        DialogueState::Generating,
        DialogueState::ShowingItinerary,
        DialogueState::AwaitingFeedback,
    ];

    /// State that collects the given missing field.
    pub fn collecting(field: IntentField) -> Self {
        match field {
            IntentField::Destination => DialogueState::CollectingDestination,
            IntentField::StartDate => DialogueState::CollectingDates,
            IntentField::Duration => DialogueState::CollectingDuration,
            IntentField::Travelers => DialogueState::CollectingTravelers,
            IntentField::Preferences => DialogueState::CollectingPreferences,
        }
    }

    /// States owned by the itinerary generator.
    pub fn is_generation_phase(&self) -> bool {
        matches!(
            self,
            DialogueState::Generating
                | DialogueState::ShowingItinerary
                | DialogueState::AwaitingFeedback
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueState::Initial => "initial",
            DialogueState::CollectingDestination => "collecting_destination",
            DialogueState::CollectingDates => "collecting_dates",
            DialogueState::CollectingDuration => "collecting_duration",
            DialogueState::CollectingTravelers => "collecting_travelers",
            DialogueState::CollectingPreferences => "collecting_preferences",
            DialogueState::ReadyToGenerate => "ready_to_generate",
            DialogueState::Generating => "generating",
            DialogueState::ShowingItinerary => "showing_itinerary",
            DialogueState::AwaitingFeedback => "awaiting_feedback",
        }
    }
}

impl fmt::Display for DialogueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for DialogueState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogueState::*;
        if self == target {
            return true;
        }
        match target {
            Initial => false,
            // A new user turn can always reopen collection or re-confirm readiness.
            CollectingDestination | CollectingDates | CollectingDuration
            | CollectingTravelers | CollectingPreferences | ReadyToGenerate => true,
            Generating => matches!(self, ReadyToGenerate | AwaitingFeedback),
            ShowingItinerary => matches!(self, Generating),
            AwaitingFeedback => matches!(self, ShowingItinerary),
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        DialogueState::ALL
            .into_iter()
            .filter(|target| target != self && self.can_transition_to(target))
            .collect()
    }
}
