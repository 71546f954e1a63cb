//! Trip intent domain module.
//!
//! `ParsedIntent` is the structured trip request that accumulates across
//! conversation turns. Field-level merge rules live in [`merge`].

mod intent;
mod merge;

pub use intent::{
    end_date_for, inclusive_days, BudgetTier, IntentField, Pace, ParsedIntent, Preferences,
    Travelers,
};
pub use merge::{merge_intents, union_case_insensitive};
