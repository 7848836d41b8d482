//! # Drip Store
//!
//! Storage abstraction for the Drip ledger. Provides a trait-based interface
//! for the stream table with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts stream persistence behind the [`Store`] trait,
//! allowing the ledger to be storage-agnostic. The persistent implementation
//! is [`SqliteStore`], with [`MemoryStore`] for tests and embedded use.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StreamFilter`] - Selection for listing streams
//!
//! ## Usage
//!
//! ```rust,no_run
//! use drip_core::StreamParams;
//! use drip_store::{SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("drip.db").unwrap();
//!
//!     let draft = StreamParams::new("alice", "bob", "DAI", 36_000, 3600, 1_700_000_000)
//!         .validate()
//!         .unwrap();
//!     let stream = store.insert_stream(&draft).await.unwrap();
//!     assert_eq!(stream.id.get(), 1);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only ids**: ids are allocated sequentially from 1 and never reused
//! - **Mutable-by-id**: only the time bookkeeping fields and `withdrawn` change
//! - **No serialization here**: per-stream ordering of writes is the ledger's job

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt, StreamFilter};
