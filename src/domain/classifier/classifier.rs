//! Rule-based message classifier.

use super::detection::{date_mentions, detect_destinations};
use super::metadata::compute_metadata;
use super::patterns::PRIORITY_TABLE;
use super::types::{
    ClassificationMetadata, ClassificationResult, Confidence, InputType, SuggestedParser,
};

/// Messages shorter than this (after trimming) are not analysed.
pub const MIN_MESSAGE_CHARS: usize = 3;

/// Complexity above which a structured message is routed to the hybrid path.
const STRUCTURED_COMPLEXITY_LIMIT: u8 = 5;

/// Classifies a user message before extraction.
pub trait MessageClassifier: Send + Sync {
    /// Classify a message.
    ///
    /// # Arguments
    /// * `message` - The raw user message
    /// * `has_conversation_history` - Whether earlier turns exist in the session
    fn classify(&self, message: &str, has_conversation_history: bool) -> ClassificationResult;
}

/// Default classifier driven by the fixed pattern priority table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl MessageClassifier for RuleBasedClassifier {
    fn classify(&self, message: &str, has_conversation_history: bool) -> ClassificationResult {
        let trimmed = message.trim();

        if trimmed.chars().count() < MIN_MESSAGE_CHARS {
            return ClassificationResult {
                input_type: InputType::Ambiguous,
                confidence: Confidence::Low,
                has_destinations: false,
                has_dates: false,
                has_modification_intent: false,
                is_question: false,
                requires_context: true,
                suggested_parser: SuggestedParser::Ai,
                metadata: ClassificationMetadata::default(),
            };
        }

        let destinations = detect_destinations(trimmed);
        let dates = date_mentions(trimmed);
        let metadata = compute_metadata(trimmed, &destinations, &dates);
        let has_destinations = !destinations.is_empty();
        let has_dates = !dates.is_empty();

        let lowercase = trimmed.to_lowercase();
        let matched = PRIORITY_TABLE
            .iter()
            .find(|rule| rule.matches(&lowercase))
            .map(|rule| rule.input_type)
            .unwrap_or(InputType::Ambiguous);

        let is_question = matched == InputType::Question;
        let has_modification_intent = matched == InputType::Modification;

        let (confidence, suggested_parser, requires_context) = match matched {
            InputType::Question => (Confidence::High, SuggestedParser::Ai, false),
            InputType::Modification => {
                let confidence = if has_conversation_history {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                (confidence, SuggestedParser::Hybrid, true)
            }
            InputType::Structured => {
                if metadata.complexity > STRUCTURED_COMPLEXITY_LIMIT {
                    (Confidence::Medium, SuggestedParser::Hybrid, false)
                } else {
                    (Confidence::High, SuggestedParser::Traditional, false)
                }
            }
            InputType::Conversational => {
                let parser = if has_destinations {
                    SuggestedParser::Hybrid
                } else {
                    SuggestedParser::Ai
                };
                (Confidence::Medium, parser, !has_destinations && !has_dates)
            }
            InputType::Ambiguous => {
                if has_destinations || has_dates {
                    (Confidence::Low, SuggestedParser::Hybrid, false)
                } else {
                    (Confidence::Low, SuggestedParser::Ai, true)
                }
            }
        };

        tracing::debug!(
            target: "trip_intent::classifier",
            input_type = ?matched,
            complexity = metadata.complexity,
            has_destinations,
            has_dates,
            "classified message"
        );

        ClassificationResult {
            input_type: matched,
            confidence,
            has_destinations,
            has_dates,
            has_modification_intent,
            is_question,
            requires_context,
            suggested_parser,
            metadata,
        }
    }
}
