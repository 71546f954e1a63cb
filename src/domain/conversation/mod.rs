//! Conversation domain module.
//!
//! Per-session dialogue state: the accumulated intent, message history and
//! the dialogue state machine, plus the manager that persists them between
//! turns through a `SessionStore`.

mod context;
mod manager;
mod message;
mod state;

pub use context::{ContextCodecError, ConversationContext, HistoryLimits, DEFAULT_MAX_MESSAGES};
pub use manager::{
    ConversationStateManager, SessionError, SessionSettings, DEFAULT_SESSION_TTL_SECS,
};
pub use message::{ChatMessage, Role};
pub use state::DialogueState;
