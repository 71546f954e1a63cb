//! Intent extraction.
//!
//! The pattern engine always runs first and is the floor. The model
//! extractor fills in what the patterns missed; its raw output goes through
//! sanitization and the repair chain before it is trusted.

mod dates;
mod destinations;
mod duration;
mod engine;
mod model;
mod model_output;
mod preferences;
mod repair;
mod sanitizer;
mod travelers;

pub use dates::{extract_dates, infer_date, DateMatch};
pub use destinations::{extract_destinations, is_extension_request};
pub use duration::{extract_duration, FORTNIGHT_DAYS, WEEKEND_DAYS};
pub use engine::{apply_extension, normalize_text, PatternExtractor};
pub use model::{
    combine, combine_cached, ModelExtractionError, ModelExtractor, DEFAULT_MODEL_TIMEOUT,
};
pub use model_output::intent_from_model_object;
pub use preferences::{extract_budget, extract_interests, extract_pace, extract_preferences};
pub use repair::{JsonObject, RepairChain, RepairError, RepairStage, Repaired};
pub use sanitizer::{ResponseSanitizer, SanitizationError, MAX_RESPONSE_LENGTH};
pub use travelers::extract_travelers;
