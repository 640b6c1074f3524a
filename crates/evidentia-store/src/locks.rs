//! Per-session exclusive locking.
//!
//! A session's hash chain can only ever be extended by one writer at a
//! time — two concurrent `append_batch` calls racing on the same session
//! would both read the same tail and mint conflicting `sequence_number`s.
//! `SessionLocks` hands out one [`tokio::sync::Mutex`] per session id,
//! created lazily and kept for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SessionLocks {
    registry: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to `session_id`. The returned guard must
    /// be held for the entire read-tail-then-append sequence.
    pub async fn lock(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        let session_mutex = {
            let mut registry = self.registry.lock().await;
            registry.entry(session_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        session_mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn concurrent_lockers_on_same_session_serialize() {
        let locks = Arc::new(SessionLocks::new());
        let session_id = Uuid::new_v4();
        let counter = Arc::new(AtomicU32::new(0));
        let max_concurrent = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(session_id).await;
                let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_sessions_do_not_contend() {
        let locks = SessionLocks::new();
        let a = locks.lock(Uuid::new_v4()).await;
        let b = locks.lock(Uuid::new_v4()).await;
        drop(a);
        drop(b);
    }
}
