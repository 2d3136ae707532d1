//! Per-session lock registry.
//!
//! Serializes everything that mutates one session - concurrent inbound
//! messages and the timeout sweeper - without a global lock. Entries are
//! created on demand and kept for the process lifetime; the per-entry cost
//! is a single `Arc<Mutex<()>>`.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::SessionId;

/// Registry of per-session mutexes.
#[derive(Default)]
pub struct SessionLocks {
    entries: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lock for one session, waiting if another task
    /// holds it. The guard releases on drop.
    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_is_mutually_exclusive() {
        let locks = Arc::new(SessionLocks::new());
        let id = SessionId::new("s1").unwrap();
        let in_section = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let id = id.clone();
            let in_section = in_section.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&id).await;
                let concurrent = in_section.fetch_add(1, Ordering::SeqCst);
                assert_eq!(concurrent, 0);
                tokio::time::sleep(Duration::from_millis(2)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_sessions_do_not_block_each_other() {
        let locks = SessionLocks::new();
        let guard_a = locks.acquire(&SessionId::new("a").unwrap()).await;
        // Acquiring a different session's lock must not deadlock.
        let _guard_b = locks.acquire(&SessionId::new("b").unwrap()).await;
        drop(guard_a);
    }
}
