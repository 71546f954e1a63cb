//! Trip Intent - conversational trip-intent extraction
//!
//! Turns free-text travel messages into a structured trip intent (destinations,
//! dates, duration, travelers, preferences) across a multi-turn dialogue. A
//! deterministic pattern engine handles the common phrasings; an optional
//! language model fills the gaps, with its output sanitized, repaired and
//! cached. Per-session context is persisted between turns through a
//! pluggable session store and can be carried by the client as a token.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
