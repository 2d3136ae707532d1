//! Session store port (read/write contract).
//!
//! The persisted record is exactly the Session aggregate, serialized as a
//! flat document keyed by session id. Updates are version-checked so that
//! the orchestrator and sweeper can detect lost races instead of silently
//! overwriting each other.

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::Session;

/// Session persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session '{0}' not found")]
    NotFound(SessionId),

    #[error("session '{0}' already exists")]
    AlreadyExists(SessionId),

    /// The record changed since this copy was loaded.
    #[error("version conflict for session '{session_id}': expected {expected}, found {actual}")]
    Conflict {
        session_id: SessionId,
        expected: u64,
        actual: u64,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if the caller should reload and retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Repository port for Session persistence.
///
/// Implementations must keep writes atomic per session; cross-session
/// consistency is never required.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the id is taken
    async fn insert(&self, session: &Session) -> Result<(), StoreError>;

    /// Find a session by id. Returns `None` on lookup miss.
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Update an existing session, checking its version.
    ///
    /// On success returns the new version, which the caller must adopt via
    /// [`Session::set_version`] before issuing further updates on the same
    /// copy.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session was never inserted
    /// - `Conflict` if the stored version differs from the copy's
    async fn update(&self, session: &Session) -> Result<u64, StoreError>;

    /// List all sessions, newest first.
    async fn list(&self) -> Result<Vec<Session>, StoreError>;

    /// Active sessions idle for at least `inactivity_secs` as of `now`.
    async fn find_stale(
        &self,
        now: &Timestamp,
        inactivity_secs: u64,
    ) -> Result<Vec<Session>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn conflict_detection_helper() {
        let err = StoreError::Conflict {
            session_id: SessionId::new("s1").unwrap(),
            expected: 1,
            actual: 2,
        };
        assert!(err.is_conflict());
        assert!(!StoreError::Backend("io".into()).is_conflict());
    }
}
