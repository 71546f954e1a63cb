//! Session store port - where conversation contexts live between turns.
//!
//! The state manager only needs get/put/expire semantics, so an in-memory
//! map, a distributed cache or a database can back it interchangeably.

use async_trait::async_trait;

use crate::domain::conversation::ConversationContext;
use crate::domain::foundation::{SessionId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode session: {0}")]
    Serialization(String),
}

/// Storage for conversation contexts keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a context, or `None` if the session is unknown.
    async fn get(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationContext>, SessionStoreError>;

    /// Inserts or replaces the context for its session id.
    async fn put(&self, context: ConversationContext) -> Result<(), SessionStoreError>;

    /// Removes a session. Returns true if it existed.
    async fn remove(&self, session_id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Removes every context last updated before `cutoff`.
    ///
    /// # Returns
    /// The number of sessions removed
    async fn expire(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError>;

    /// Number of stored sessions.
    async fn len(&self) -> Result<usize, SessionStoreError>;

    async fn is_empty(&self) -> Result<bool, SessionStoreError> {
        Ok(self.len().await? == 0)
    }
}
