//! Missing-field resolution.
//!
//! Decides which required trip field to ask for next, phrases the question,
//! and maps the outcome onto the dialogue state machine.

mod missing;
mod questions;

pub use missing::{can_generate, required_fields_missing, state_for};
pub use questions::{question_variant, QuestionGenerator};
