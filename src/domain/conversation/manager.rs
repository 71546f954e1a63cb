//! Conversation state manager.
//!
//! Owns the lifecycle of `ConversationContext`s in a [`SessionStore`]:
//! creation, inactivity expiry, message history, intent accumulation and
//! dialogue-state transitions. Turns on the same session are serialized with
//! a per-session async mutex handed out by [`lock_session`].
//!
//! [`lock_session`]: ConversationStateManager::lock_session

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::OwnedMutexGuard;

use super::context::{ContextCodecError, ConversationContext, HistoryLimits, DEFAULT_MAX_MESSAGES};
use super::message::{ChatMessage, Role};
use super::state::DialogueState;
use crate::domain::foundation::{SessionId, StateMachine, Timestamp, ValidationError};
use crate::domain::trip::ParsedIntent;
use crate::ports::{SessionStore, SessionStoreError};

/// Idle time after which a session starts over (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("Invalid dialogue transition: {0}")]
    InvalidTransition(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] ContextCodecError),
}

/// Session lifetime and history settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub ttl_secs: u64,
    pub max_messages: usize,
    pub preserve_first_message: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_messages: DEFAULT_MAX_MESSAGES,
            preserve_first_message: true,
        }
    }
}

impl SessionSettings {
    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            max_messages: self.max_messages,
            preserve_first: self.preserve_first_message,
        }
    }
}

type SessionLocks = HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>;

pub struct ConversationStateManager {
    store: Arc<dyn SessionStore>,
    settings: SessionSettings,
    locks: Mutex<SessionLocks>,
}

impl ConversationStateManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            settings: SessionSettings::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Creates and stores a fresh context, generating an id if none is given.
    pub async fn create_context(
        &self,
        session_id: Option<SessionId>,
    ) -> Result<ConversationContext, SessionError> {
        let context = ConversationContext::new(session_id.unwrap_or_default());
        self.store.put(context.clone()).await?;
        tracing::debug!(
            target: "trip_intent::session",
            session_id = %context.session_id,
            "session created"
        );
        Ok(context)
    }

    /// Loads the session, starting over if it is unknown or has been idle
    /// longer than the TTL.
    pub async fn get_or_create(
        &self,
        session_id: &SessionId,
    ) -> Result<ConversationContext, SessionError> {
        match self.store.get(session_id).await? {
            Some(context) if !context.is_expired(self.settings.ttl_secs, &Timestamp::now()) => {
                Ok(context)
            }
            Some(_) => {
                tracing::info!(
                    target: "trip_intent::session",
                    session_id = %session_id,
                    "session expired, starting over"
                );
                self.create_context(Some(session_id.clone())).await
            }
            None => self.create_context(Some(session_id.clone())).await,
        }
    }

    /// Records a message, trimming history to the configured cap.
    pub async fn add_message(
        &self,
        session_id: &SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<ConversationContext, SessionError> {
        let mut context = self.get_or_create(session_id).await?;
        context.push_message(ChatMessage::new(role, content), self.settings.history_limits());
        self.store.put(context.clone()).await?;
        Ok(context)
    }

    /// Absorbs one turn's extraction into the session's accumulated intent.
    pub async fn update_intent(
        &self,
        session_id: &SessionId,
        turn: ParsedIntent,
    ) -> Result<ConversationContext, SessionError> {
        let mut context = self.get_or_create(session_id).await?;
        context.intent.absorb(turn);
        context.touch();
        self.store.put(context.clone()).await?;
        tracing::debug!(
            target: "trip_intent::session",
            session_id = %session_id,
            intent = %context.intent.summary(),
            "intent updated"
        );
        Ok(context)
    }

    /// Moves the dialogue to `state` if the transition is legal.
    pub async fn update_state(
        &self,
        session_id: &SessionId,
        state: DialogueState,
    ) -> Result<ConversationContext, SessionError> {
        let mut context = self.get_or_create(session_id).await?;
        let from = context.state;
        context.state = from.transition_to(state)?;
        context.touch();
        self.store.put(context.clone()).await?;
        if from != state {
            tracing::debug!(
                target: "trip_intent::session",
                session_id = %session_id,
                from = %from,
                to = %state,
                "dialogue state changed"
            );
        }
        Ok(context)
    }

    /// Encodes a context as an opaque transport token.
    pub fn serialize(&self, context: &ConversationContext) -> Result<String, ContextCodecError> {
        context.to_token()
    }

    /// Decodes a transport token. A token that cannot be decoded yields a
    /// fresh context instead of an error.
    pub fn deserialize(&self, token: &str) -> ConversationContext {
        match ConversationContext::from_token(token) {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(
                    target: "trip_intent::session",
                    error = %e,
                    "discarding undecodable context token"
                );
                ConversationContext::new(SessionId::new())
            }
        }
    }

    /// Decodes a token and stores the result so later operations see it.
    ///
    /// Expired contexts are replaced by a fresh one under the same id.
    pub async fn restore(&self, token: &str) -> Result<ConversationContext, SessionError> {
        self.resume(self.deserialize(token)).await
    }

    /// Stores an already-decoded context, or a fresh one under the same id if
    /// it has expired.
    pub async fn resume(
        &self,
        context: ConversationContext,
    ) -> Result<ConversationContext, SessionError> {
        if context.is_expired(self.settings.ttl_secs, &Timestamp::now()) {
            return self.create_context(Some(context.session_id)).await;
        }
        self.store.put(context.clone()).await?;
        Ok(context)
    }

    /// Removes idle sessions and the locks nobody holds for them.
    ///
    /// # Returns
    /// The number of sessions removed
    pub async fn sweep_expired(&self) -> Result<usize, SessionError> {
        let cutoff = Timestamp::now().minus_secs(self.settings.ttl_secs);
        let removed = self.store.expire(cutoff).await?;

        let tracked: Vec<SessionId> = self.lock_table().keys().cloned().collect();
        let mut gone = Vec::new();
        for id in tracked {
            if self.store.get(&id).await?.is_none() {
                gone.push(id);
            }
        }
        self.lock_table().retain(|id, lock| {
            // A lock someone holds or waits on has other references.
            !gone.contains(id) || Arc::strong_count(lock) > 1
        });

        if removed > 0 {
            tracing::info!(
                target: "trip_intent::session",
                removed,
                "expired sessions swept"
            );
        }
        Ok(removed)
    }

    /// Waits for exclusive access to a session for the length of one turn.
    pub async fn lock_session(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = self
            .lock_table()
            .entry(session_id.clone())
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.lock_table().len()
    }

    fn lock_table(&self) -> MutexGuard<'_, SessionLocks> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ConversationStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStateManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use std::time::Duration;

    fn manager() -> (ConversationStateManager, InMemorySessionStore) {
        let store = InMemorySessionStore::new();
        (ConversationStateManager::new(Arc::new(store.clone())), store)
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn create_context_generates_id_when_absent() {
            let (manager, store) = manager();

            let context = manager.create_context(None).await.unwrap();

            assert_eq!(context.state, DialogueState::Initial);
            assert!(store.get(&context.session_id).await.unwrap().is_some());
        }

        #[tokio::test]
        async fn create_context_keeps_given_id() {
            let (manager, _) = manager();
            let id = SessionId::new();

            let context = manager.create_context(Some(id.clone())).await.unwrap();

            assert_eq!(context.session_id, id);
        }

        #[tokio::test]
        async fn get_or_create_returns_existing_session() {
            let (manager, _) = manager();
            let id = SessionId::new();
            manager.add_message(&id, Role::User, "hello").await.unwrap();

            let context = manager.get_or_create(&id).await.unwrap();

            assert_eq!(context.messages.len(), 1);
        }

        #[tokio::test]
        async fn get_or_create_replaces_expired_session() {
            let (manager, store) = manager();
            let mut stale = ConversationContext::new(SessionId::new());
            stale.intent = ParsedIntent::new().with_destinations(["Rome"]);
            stale.last_updated = Timestamp::now().minus_secs(DEFAULT_SESSION_TTL_SECS + 60);
            store.put(stale.clone()).await.unwrap();

            let context = manager.get_or_create(&stale.session_id).await.unwrap();

            assert_eq!(context.session_id, stale.session_id);
            assert!(context.intent.is_empty());
        }
    }

    mod updates {
        use super::*;

        #[tokio::test]
        async fn add_message_trims_history() {
            let (manager, _) = manager();
            let manager = manager.with_settings(SessionSettings {
                max_messages: 3,
                ..SessionSettings::default()
            });
            let id = SessionId::new();

            for i in 0..5 {
                manager.add_message(&id, Role::User, format!("m{}", i)).await.unwrap();
            }
            let context = manager.get_or_create(&id).await.unwrap();

            let contents: Vec<_> = context.messages.iter().map(|m| m.content.as_str()).collect();
            assert_eq!(contents, vec!["m0", "m3", "m4"]);
            assert_eq!(context.message_count, 5);
        }

        #[tokio::test]
        async fn update_intent_accumulates() {
            let (manager, _) = manager();
            let id = SessionId::new();
            let first = ParsedIntent::new().with_destinations(["Paris"]);
            let mut second = ParsedIntent::new();
            second.duration = Some(5);

            manager.update_intent(&id, first).await.unwrap();
            let context = manager.update_intent(&id, second).await.unwrap();

            assert_eq!(context.intent.destination.as_deref(), Some("Paris"));
            assert_eq!(context.intent.duration, Some(5));
        }

        #[tokio::test]
        async fn update_state_follows_transition_rules() {
            let (manager, _) = manager();
            let id = SessionId::new();

            let context = manager
                .update_state(&id, DialogueState::CollectingDates)
                .await
                .unwrap();
            assert_eq!(context.state, DialogueState::CollectingDates);

            let result = manager.update_state(&id, DialogueState::ShowingItinerary).await;
            assert!(matches!(result, Err(SessionError::InvalidTransition(_))));
        }
    }

    mod transport {
        use super::*;

        #[tokio::test]
        async fn serialize_then_deserialize_preserves_context() {
            let (manager, _) = manager();
            let id = SessionId::new();
            manager.add_message(&id, Role::User, "3 days in London").await.unwrap();
            let context = manager
                .update_intent(&id, ParsedIntent::new().with_destinations(["London"]))
                .await
                .unwrap();

            let token = manager.serialize(&context).unwrap();

            assert_eq!(manager.deserialize(&token), context);
        }

        #[test]
        fn garbage_token_yields_fresh_context() {
            let (manager, _) = manager();

            let context = manager.deserialize("definitely not json");

            assert_eq!(context.state, DialogueState::Initial);
            assert!(context.messages.is_empty());
        }

        #[tokio::test]
        async fn restore_puts_context_in_store() {
            let (source, _) = manager();
            let context = source.create_context(None).await.unwrap();
            let token = source.serialize(&context).unwrap();

            let (manager, store) = manager();
            let restored = manager.restore(&token).await.unwrap();

            assert_eq!(restored.session_id, context.session_id);
            assert!(store.get(&context.session_id).await.unwrap().is_some());
        }
    }

    mod housekeeping {
        use super::*;

        #[tokio::test]
        async fn sweep_removes_idle_sessions_and_their_locks() {
            let (manager, store) = manager();
            let mut stale = ConversationContext::new(SessionId::new());
            stale.last_updated = Timestamp::now().minus_secs(DEFAULT_SESSION_TTL_SECS + 60);
            store.put(stale.clone()).await.unwrap();
            let fresh = manager.create_context(None).await.unwrap();
            drop(manager.lock_session(&stale.session_id).await);
            drop(manager.lock_session(&fresh.session_id).await);

            let removed = manager.sweep_expired().await.unwrap();

            assert_eq!(removed, 1);
            assert_eq!(store.len().await.unwrap(), 1);
            assert_eq!(manager.tracked_locks(), 1);
        }

        #[tokio::test]
        async fn session_lock_serializes_turns() {
            let (manager, _) = manager();
            let manager = Arc::new(manager);
            let id = SessionId::new();

            let guard = manager.lock_session(&id).await;
            let contender = {
                let manager = Arc::clone(&manager);
                let id = id.clone();
                tokio::spawn(async move {
                    let _guard = manager.lock_session(&id).await;
                })
            };
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(!contender.is_finished());

            drop(guard);
            contender.await.unwrap();
        }

        #[tokio::test]
        async fn different_sessions_do_not_contend() {
            let (manager, _) = manager();
            let _a = manager.lock_session(&SessionId::new()).await;
            let _b = manager.lock_session(&SessionId::new()).await;
            assert_eq!(manager.tracked_locks(), 2);
        }
    }
}
