//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use drip_core::{Stream, StreamDraft, StreamId};

use crate::error::{Result, StoreError};
use crate::traits::{Store, StreamFilter};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Streams indexed by id.
    streams: BTreeMap<StreamId, Stream>,

    /// The id the next insert receives.
    next_id: StreamId,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                streams: BTreeMap::new(),
                next_id: StreamId::FIRST,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_stream(&self, draft: &StreamDraft) -> Result<Stream> {
        let mut inner = self.write()?;

        let id = inner.next_id;
        let stream = draft.clone().into_stream(id);
        inner.streams.insert(id, stream.clone());
        inner.next_id = id.next();

        Ok(stream)
    }

    async fn get_stream(&self, id: StreamId) -> Result<Option<Stream>> {
        let inner = self.read()?;
        Ok(inner.streams.get(&id).cloned())
    }

    async fn update_stream(&self, stream: &Stream) -> Result<()> {
        let mut inner = self.write()?;

        let stored = inner
            .streams
            .get_mut(&stream.id)
            .ok_or(StoreError::NotFound(stream.id))?;

        stored.start_time = stream.start_time;
        stored.stop_time = stream.stop_time;
        stored.accumulated_elapsed = stream.accumulated_elapsed;
        stored.withdrawn = stream.withdrawn;
        stored.is_running = stream.is_running;

        Ok(())
    }

    async fn list_streams(&self, filter: &StreamFilter) -> Result<Vec<StreamId>> {
        let inner = self.read()?;
        Ok(inner
            .streams
            .values()
            .filter(|s| filter.matches(s))
            .map(|s| s.id)
            .collect())
    }

    async fn stream_count(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.next_id.get() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::StreamParams;

    fn draft(sender: &str, recipient: &str) -> StreamDraft {
        StreamParams::new(sender, recipient, "DAI", 36_000, 3600, 1_000)
            .validate()
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_sequential_ids() {
        let store = MemoryStore::new();

        let s1 = store.insert_stream(&draft("alice", "bob")).await.unwrap();
        let s2 = store.insert_stream(&draft("alice", "carol")).await.unwrap();

        assert_eq!(s1.id, StreamId::new(1));
        assert_eq!(s2.id, StreamId::new(2));
        assert_eq!(store.stream_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_get() {
        let store = MemoryStore::new();
        let inserted = store.insert_stream(&draft("alice", "bob")).await.unwrap();

        let fetched = store.get_stream(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);

        assert!(store.get_stream(StreamId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_update_only_mutable_fields() {
        let store = MemoryStore::new();
        let inserted = store.insert_stream(&draft("alice", "bob")).await.unwrap();

        let mut changed = inserted.clone();
        changed.pause(1_030).unwrap();
        changed.deposit = 1;
        changed.recipient = "mallory".into();
        store.update_stream(&changed).await.unwrap();

        let fetched = store.get_stream(inserted.id).await.unwrap().unwrap();
        assert!(!fetched.is_running);
        assert_eq!(fetched.start_time, 0);
        assert_eq!(fetched.accumulated_elapsed, 30);
        assert_eq!(fetched.deposit, 36_000);
        assert_eq!(fetched.recipient, inserted.recipient);
    }

    #[tokio::test]
    async fn test_memory_store_update_unknown() {
        let store = MemoryStore::new();
        let ghost = draft("alice", "bob").into_stream(StreamId::new(5));

        assert!(matches!(
            store.update_stream(&ghost).await,
            Err(StoreError::NotFound(id)) if id == StreamId::new(5)
        ));
    }

    #[tokio::test]
    async fn test_memory_store_list_filters() {
        let store = MemoryStore::new();
        store.insert_stream(&draft("alice", "bob")).await.unwrap();
        store.insert_stream(&draft("carol", "bob")).await.unwrap();
        store.insert_stream(&draft("alice", "dave")).await.unwrap();

        let all = store.list_streams(&StreamFilter::All).await.unwrap();
        assert_eq!(all, vec![StreamId::new(1), StreamId::new(2), StreamId::new(3)]);

        let from_alice = store
            .list_streams(&StreamFilter::Sender("alice".into()))
            .await
            .unwrap();
        assert_eq!(from_alice, vec![StreamId::new(1), StreamId::new(3)]);

        let to_bob = store
            .list_streams(&StreamFilter::Recipient("bob".into()))
            .await
            .unwrap();
        assert_eq!(to_bob, vec![StreamId::new(1), StreamId::new(2)]);
    }
}
