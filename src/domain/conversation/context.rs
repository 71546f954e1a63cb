//! Per-session conversation context and its transport encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::{ChatMessage, Role};
use super::state::DialogueState;
use crate::domain::foundation::{SessionId, Timestamp, ValidationError};
use crate::domain::trip::ParsedIntent;

/// Default number of messages kept per session.
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// Errors encoding or decoding a context token.
#[derive(Debug, Error)]
pub enum ContextCodecError {
    #[error("Failed to encode context: {0}")]
    Encode(String),

    #[error("Failed to decode context: {0}")]
    Decode(String),

    #[error("Decoded context is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// How much message history a context retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_messages: usize,
    /// Keep the very first message when trimming.
    pub preserve_first: bool,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            preserve_first: true,
        }
    }
}

/// Everything known about one planning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub session_id: SessionId,
    pub state: DialogueState,
    /// Accumulated trip request.
    pub intent: ParsedIntent,
    pub messages: Vec<ChatMessage>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
    /// Messages ever recorded, including trimmed ones.
    pub message_count: u32,
}

impl ConversationContext {
    pub fn new(session_id: SessionId) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            state: DialogueState::Initial,
            intent: ParsedIntent::new(),
            messages: Vec::new(),
            created_at: now,
            last_updated: now,
            message_count: 0,
        }
    }

    /// True if the session has been idle longer than `ttl_secs` at `now`.
    pub fn is_expired(&self, ttl_secs: u64, now: &Timestamp) -> bool {
        self.last_updated.is_older_than(ttl_secs, now)
    }

    /// True if any user message was recorded before the latest one.
    pub fn has_prior_user_turns(&self) -> bool {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
            > 1
    }

    pub fn touch(&mut self) {
        self.last_updated = Timestamp::now();
    }

    /// Appends a message and trims history to `limits`.
    pub fn push_message(&mut self, message: ChatMessage, limits: HistoryLimits) {
        self.messages.push(message);
        self.message_count = self.message_count.saturating_add(1);
        self.trim_history(limits);
        self.touch();
    }

    fn trim_history(&mut self, limits: HistoryLimits) {
        let max = limits.max_messages.max(1);
        if self.messages.len() <= max {
            return;
        }
        let excess = self.messages.len() - max;
        if limits.preserve_first && max >= 2 {
            self.messages.drain(1..=excess);
        } else {
            self.messages.drain(..excess);
        }
    }

    /// Encodes the context as an opaque token for stateless transport.
    pub fn to_token(&self) -> Result<String, ContextCodecError> {
        serde_json::to_string(self).map_err(|e| ContextCodecError::Encode(e.to_string()))
    }

    /// Decodes a token produced by [`to_token`](Self::to_token).
    pub fn from_token(token: &str) -> Result<Self, ContextCodecError> {
        let context: Self =
            serde_json::from_str(token).map_err(|e| ContextCodecError::Decode(e.to_string()))?;
        // Ids arrive unchecked through serde.
        SessionId::parse(context.session_id.as_str())?;
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ConversationContext {
        ConversationContext::new(SessionId::new())
    }

    mod history {
        use super::*;

        fn limits(max: usize, preserve_first: bool) -> HistoryLimits {
            HistoryLimits {
                max_messages: max,
                preserve_first,
            }
        }

        #[test]
        fn keeps_everything_under_the_cap() {
            let mut ctx = context();
            for i in 0..3 {
                ctx.push_message(ChatMessage::user(format!("m{}", i)), limits(5, true));
            }
            assert_eq!(ctx.messages.len(), 3);
            assert_eq!(ctx.message_count, 3);
        }

        #[test]
        fn drops_oldest_but_preserves_anchor() {
            let mut ctx = context();
            for i in 0..6 {
                ctx.push_message(ChatMessage::user(format!("m{}", i)), limits(4, true));
            }
            let contents: Vec<_> = ctx.messages.iter().map(|m| m.content.as_str()).collect();
            assert_eq!(contents, vec!["m0", "m3", "m4", "m5"]);
            assert_eq!(ctx.message_count, 6);
        }

        #[test]
        fn drops_oldest_without_anchor() {
            let mut ctx = context();
            for i in 0..6 {
                ctx.push_message(ChatMessage::user(format!("m{}", i)), limits(4, false));
            }
            let contents: Vec<_> = ctx.messages.iter().map(|m| m.content.as_str()).collect();
            assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
        }

        #[test]
        fn prior_user_turns() {
            let mut ctx = context();
            ctx.push_message(ChatMessage::user("a"), HistoryLimits::default());
            assert!(!ctx.has_prior_user_turns());
            ctx.push_message(ChatMessage::assistant("b"), HistoryLimits::default());
            ctx.push_message(ChatMessage::user("c"), HistoryLimits::default());
            assert!(ctx.has_prior_user_turns());
        }
    }

    mod expiry {
        use super::*;

        #[test]
        fn expires_after_ttl() {
            let mut ctx = context();
            let now = Timestamp::now();
            ctx.last_updated = now.minus_secs(90);
            assert!(ctx.is_expired(60, &now));
            assert!(!ctx.is_expired(120, &now));
        }
    }

    mod token {
        use super::*;

        #[test]
        fn token_round_trip_preserves_context() {
            let mut ctx = context();
            ctx.intent = ParsedIntent::new().with_destinations(["Rome"]);
            ctx.state = DialogueState::CollectingDates;
            ctx.push_message(ChatMessage::user("Rome please"), HistoryLimits::default());

            let restored = ConversationContext::from_token(&ctx.to_token().unwrap()).unwrap();
            assert_eq!(restored, ctx);
        }

        #[test]
        fn token_uses_camel_case_fields() {
            let token = context().to_token().unwrap();
            assert!(token.contains("\"sessionId\""));
            assert!(token.contains("\"lastUpdated\""));
            assert!(token.contains("\"state\":\"initial\""));
        }

        #[test]
        fn garbage_token_is_a_decode_error() {
            assert!(matches!(
                ConversationContext::from_token("not json"),
                Err(ContextCodecError::Decode(_))
            ));
        }

        #[test]
        fn blank_session_id_is_rejected() {
            let mut value = serde_json::to_value(context()).unwrap();
            value["sessionId"] = serde_json::json!("  ");
            let token = value.to_string();
            assert!(matches!(
                ConversationContext::from_token(&token),
                Err(ContextCodecError::Invalid(_))
            ));
        }
    }
}
