//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors, state machines)
//! - `trip` - The `ParsedIntent` trip request and its merge rules
//! - `vocabulary` - Cities, regions, months and number words shared by the parsers
//! - `classifier` - Rule-based classification of incoming messages
//! - `extraction` - Pattern and model-assisted intent extraction
//! - `cache` - TTL cache of extraction results with fuzzy lookup
//! - `conversation` - Per-session context, dialogue state and its manager
//! - `resolver` - Missing-field detection and follow-up questions

pub mod cache;
pub mod classifier;
pub mod conversation;
pub mod extraction;
pub mod foundation;
pub mod resolver;
pub mod trip;
pub mod vocabulary;
