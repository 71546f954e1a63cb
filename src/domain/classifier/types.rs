//! Value types produced by the classifier.

use serde::{Deserialize, Serialize};

/// Category of an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Compact trip request ("3 days in London").
    Structured,
    /// Free-form chat ("I want to go to Paris...").
    Conversational,
    /// Change to an existing request ("add 2 days in Rome").
    Modification,
    /// The user asks something.
    Question,
    /// Nothing recognisable.
    Ambiguous,
}

/// How sure the classifier is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Extraction route the classifier recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedParser {
    /// Pattern engine alone should suffice.
    Traditional,
    /// Language model extraction is needed.
    Ai,
    /// Pattern engine first, model to fill gaps.
    Hybrid,
}

/// Supporting detail computed for every classified message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetadata {
    pub key_phrases: Vec<String>,
    pub detected_entities: Vec<String>,
    /// 0 (trivial) to 10 (very involved).
    pub complexity: u8,
}

/// Result of classifying one message. Not persisted beyond the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub confidence: Confidence,
    pub has_destinations: bool,
    pub has_dates: bool,
    pub has_modification_intent: bool,
    pub is_question: bool,
    pub requires_context: bool,
    pub suggested_parser: SuggestedParser,
    pub metadata: ClassificationMetadata,
}

impl ClassificationResult {
    /// True if the classifier expects the pattern engine to leave gaps.
    pub fn prefers_model(&self) -> bool {
        self.suggested_parser != SuggestedParser::Traditional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_type_field_and_camel_case() {
        let result = ClassificationResult {
            input_type: InputType::Structured,
            confidence: Confidence::High,
            has_destinations: true,
            has_dates: true,
            has_modification_intent: false,
            is_question: false,
            requires_context: false,
            suggested_parser: SuggestedParser::Traditional,
            metadata: ClassificationMetadata::default(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "structured");
        assert_eq!(json["suggestedParser"], "traditional");
        assert_eq!(json["hasDestinations"], true);
        assert_eq!(json["metadata"]["keyPhrases"], serde_json::json!([]));
        assert!(!result.prefers_model());
    }
}
