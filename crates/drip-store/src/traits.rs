//! Store trait: the abstract interface for stream persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use drip_core::{AccountId, Stream, StreamDraft, StreamId};

use crate::error::{Result, StoreError};

/// Which streams to list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamFilter {
    /// Every stream.
    #[default]
    All,
    /// Streams funded by this account.
    Sender(AccountId),
    /// Streams paying out to this account.
    Recipient(AccountId),
}

impl StreamFilter {
    /// Whether `stream` passes the filter.
    pub fn matches(&self, stream: &Stream) -> bool {
        match self {
            StreamFilter::All => true,
            StreamFilter::Sender(account) => &stream.sender == account,
            StreamFilter::Recipient(account) => &stream.recipient == account,
        }
    }
}

/// The Store trait: async interface for the id -> Stream table.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Sequential ids**: `insert_stream` assigns ids starting at 1; an id is
///   never handed out twice, even across restarts.
/// - **Whole-record reads**: `get_stream` returns a value that existed at
///   some committed point. No torn reads.
/// - **Immutable identity**: `update_stream` writes only the mutable fields
///   (`start_time`, `stop_time`, `accumulated_elapsed`, `withdrawn`,
///   `is_running`). Identity, deposit, duration and rate are never rewritten.
#[async_trait]
pub trait Store: Send + Sync {
    /// Allocate the next id and persist a new stream built from `draft`.
    async fn insert_stream(&self, draft: &StreamDraft) -> Result<Stream>;

    /// Get a stream by id.
    async fn get_stream(&self, id: StreamId) -> Result<Option<Stream>>;

    /// Persist the mutable fields of an existing stream.
    ///
    /// Fails with [`StoreError::NotFound`] if the id was never allocated.
    async fn update_stream(&self, stream: &Stream) -> Result<()>;

    /// List stream ids matching `filter`, in ascending order.
    async fn list_streams(&self, filter: &StreamFilter) -> Result<Vec<StreamId>>;

    /// Number of streams ever created.
    async fn stream_count(&self) -> Result<u64>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Get a stream, treating a missing id as an error.
    fn load_stream(
        &self,
        id: StreamId,
    ) -> impl std::future::Future<Output = Result<Stream>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_stream(&self, id: StreamId) -> Result<Stream> {
        self.get_stream(id).await?.ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::StreamParams;

    fn stream() -> Stream {
        StreamParams::new("alice", "bob", "DAI", 100, 10, 1_000)
            .validate()
            .unwrap()
            .into_stream(StreamId::FIRST)
    }

    #[test]
    fn test_filter_matches() {
        let s = stream();
        assert!(StreamFilter::All.matches(&s));
        assert!(StreamFilter::Sender("alice".into()).matches(&s));
        assert!(!StreamFilter::Sender("bob".into()).matches(&s));
        assert!(StreamFilter::Recipient("bob".into()).matches(&s));
        assert!(!StreamFilter::Recipient("carol".into()).matches(&s));
    }
}
