//! Input Classifier
//!
//! Categorizes a raw user message into an input type with a confidence level
//! and a suggested extraction route. Pure and deterministic: the result depends
//! only on the message text and whether the conversation has prior turns.
//!
//! # Example
//!
//! ```ignore
//! let classifier = RuleBasedClassifier::new();
//! let result = classifier.classify("3 days in London", false);
//! assert_eq!(result.input_type, InputType::Structured);
//! ```

mod classifier;
mod detection;
mod metadata;
mod patterns;
mod types;

pub use classifier::{MessageClassifier, RuleBasedClassifier, MIN_MESSAGE_CHARS};
pub use detection::{date_mentions, detect_destinations};
pub use metadata::{compute_metadata, MAX_COMPLEXITY};
pub use types::{
    ClassificationMetadata, ClassificationResult, Confidence, InputType, SuggestedParser,
};
