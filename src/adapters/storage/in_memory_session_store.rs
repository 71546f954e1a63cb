//! In-memory session store.
//!
//! Process-local and ephemeral; contexts vanish on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationContext;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, ConversationContext>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every session (useful for tests).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationContext>, SessionStoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn put(&self, context: ConversationContext) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(context.session_id.clone(), context);
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn expire(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, context| !context.last_updated.is_before(&cutoff));
        Ok(before - sessions.len())
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.sessions.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_updated_secs_ago(secs: u64) -> ConversationContext {
        let mut context = ConversationContext::new(SessionId::new());
        context.last_updated = Timestamp::now().minus_secs(secs);
        context
    }

    #[tokio::test]
    async fn put_then_get_returns_context() {
        let store = InMemorySessionStore::new();
        let context = ConversationContext::new(SessionId::new());
        store.put(context.clone()).await.unwrap();

        let loaded = store.get(&context.session_id).await.unwrap();
        assert_eq!(loaded, Some(context));
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get(&SessionId::new()).await.unwrap(), None);
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn put_replaces_existing() {
        let store = InMemorySessionStore::new();
        let mut context = ConversationContext::new(SessionId::new());
        store.put(context.clone()).await.unwrap();
        context.message_count = 7;
        store.put(context.clone()).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        let loaded = store.get(&context.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.message_count, 7);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let store = InMemorySessionStore::new();
        let context = ConversationContext::new(SessionId::new());
        store.put(context.clone()).await.unwrap();

        assert!(store.remove(&context.session_id).await.unwrap());
        assert!(!store.remove(&context.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn expire_removes_only_stale_sessions() {
        let store = InMemorySessionStore::new();
        let stale = context_updated_secs_ago(3_600);
        let fresh = context_updated_secs_ago(10);
        store.put(stale.clone()).await.unwrap();
        store.put(fresh.clone()).await.unwrap();

        let removed = store
            .expire(Timestamp::now().minus_secs(600))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert!(store.get(&stale.session_id).await.unwrap().is_none());
        assert!(store.get(&fresh.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemorySessionStore::new();
        let clone = store.clone();
        store
            .put(ConversationContext::new(SessionId::new()))
            .await
            .unwrap();
        assert_eq!(clone.session_ids().await.len(), 1);
        clone.clear().await;
        assert!(store.is_empty().await.unwrap());
    }
}
