//! Per-stream serialization.
//!
//! Each stream id has its own async mutex. Mutations of one stream queue
//! behind each other; different streams never contend. Entries are never
//! removed, so callers must only lock ids that exist in the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use drip_core::StreamId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map of stream id to that stream's write lock.
#[derive(Debug, Default)]
pub(crate) struct StreamLocks {
    locks: Mutex<HashMap<StreamId, Arc<AsyncMutex<()>>>>,
}

impl StreamLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `id`.
    pub(crate) async fn acquire(&self, id: StreamId) -> OwnedMutexGuard<()> {
        let lock = {
            // The map only holds Arcs; a poisoned map is still consistent.
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };

        let guard = lock.lock_owned().await;
        tracing::debug!(stream = %id, "acquired stream lock");
        guard
    }

    /// Number of ids that have ever been locked.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_stream_serializes() {
        let locks = Arc::new(StreamLocks::new());
        let guard = locks.acquire(StreamId::new(1)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(StreamId::new(1)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_streams_do_not_contend() {
        let locks = StreamLocks::new();
        let _g1 = locks.acquire(StreamId::new(1)).await;

        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(StreamId::new(2)),
        )
        .await;
        assert!(acquired.is_ok());
    }
}
