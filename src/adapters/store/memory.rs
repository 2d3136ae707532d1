//! In-memory session store.
//!
//! Backing map behind a `tokio::sync::RwLock`; each write re-checks the
//! optimistic version so the orchestrator and sweeper detect lost races.
//! The deployment keeps all live sessions in process memory, matching the
//! single-node service shape.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::Session;
use crate::ports::{SessionStore, StoreError};

/// Thread-safe in-memory session repository.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.session_id()) {
            return Err(StoreError::AlreadyExists(session.session_id().clone()));
        }
        sessions.insert(session.session_id().clone(), session.clone());
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update(&self, session: &Session) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(session.session_id())
            .ok_or_else(|| StoreError::NotFound(session.session_id().clone()))?;

        if stored.version() != session.version() {
            return Err(StoreError::Conflict {
                session_id: session.session_id().clone(),
                expected: session.version(),
                actual: stored.version(),
            });
        }

        let new_version = stored.version() + 1;
        let mut updated = session.clone();
        updated.set_version(new_version);
        *stored = updated;
        Ok(new_version)
    }

    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        let mut all: Vec<Session> = sessions.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().as_datetime().cmp(a.created_at().as_datetime()));
        Ok(all)
    }

    async fn find_stale(
        &self,
        now: &Timestamp,
        inactivity_secs: u64,
    ) -> Result<Vec<Session>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.is_stale(now, inactivity_secs))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classify::{ScamType, ThreatLevel};
    use crate::domain::session::ChannelMetadata;

    fn session(id: &str) -> Session {
        Session::new(
            SessionId::new(id).unwrap(),
            ChannelMetadata::default(),
            Some(ScamType::AccountFraud),
            0.9,
            ThreatLevel::Coercive,
        )
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = InMemorySessionStore::new();
        store.insert(&session("s1")).await.unwrap();

        let found = store.find(&SessionId::new("s1").unwrap()).await.unwrap();
        assert!(found.is_some());
        assert!(store
            .find(&SessionId::new("missing").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemorySessionStore::new();
        store.insert(&session("s1")).await.unwrap();
        assert!(matches!(
            store.insert(&session("s1")).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = InMemorySessionStore::new();
        let mut s = session("s1");
        store.insert(&s).await.unwrap();

        s.record_scammer_turn("hello").unwrap();
        let v1 = store.update(&s).await.unwrap();
        assert_eq!(v1, 1);
        s.set_version(v1);

        s.record_scammer_turn("again").unwrap();
        let v2 = store.update(&s).await.unwrap();
        assert_eq!(v2, 2);
    }

    #[tokio::test]
    async fn stale_copy_update_conflicts() {
        let store = InMemorySessionStore::new();
        let s = session("s1");
        store.insert(&s).await.unwrap();

        let mut copy_a = store.find(s.session_id()).await.unwrap().unwrap();
        let mut copy_b = store.find(s.session_id()).await.unwrap().unwrap();

        copy_a.record_scammer_turn("from a").unwrap();
        let v = store.update(&copy_a).await.unwrap();
        copy_a.set_version(v);

        copy_b.record_scammer_turn("from b").unwrap();
        let err = store.update(&copy_b).await.unwrap_err();
        assert!(err.is_conflict());

        // The winning write is intact.
        let stored = store.find(s.session_id()).await.unwrap().unwrap();
        assert_eq!(stored.conversation_history().len(), 1);
        assert_eq!(stored.conversation_history()[0].text, "from a");
    }

    #[tokio::test]
    async fn update_of_unknown_session_is_not_found() {
        let store = InMemorySessionStore::new();
        assert!(matches!(
            store.update(&session("ghost")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn find_stale_filters_on_activity_and_status() {
        let store = InMemorySessionStore::new();
        let mut idle = session("idle");
        idle.record_scammer_turn("hi").unwrap();
        store.insert(&idle).await.unwrap();

        let now = Timestamp::now();
        assert!(store.find_stale(&now, 15).await.unwrap().is_empty());

        let later = now.plus_secs(30);
        let stale = store.find_stale(&later, 15).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].session_id().as_str(), "idle");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemorySessionStore::new();
        store.insert(&session("older")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.insert(&session("newer")).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id().as_str(), "newer");
    }
}
