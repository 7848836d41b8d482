//! # Drip
//!
//! A pausable payment-streaming ledger. A sender commits a deposit that is
//! released to a recipient linearly over a fixed number of running seconds.
//! The sender may pause and resume accrual; the recipient withdraws whatever
//! has accrued and not yet been paid out.
//!
//! ## Key Concepts
//!
//! - **Stream**: one sender, one recipient, one asset, one deposit.
//! - **Accrual**: derived from the stream and the clock, never stored.
//! - **Pause**: banks the running segment; a paused stream accrues nothing.
//! - **Withdrawal**: booked against the stream before the treasury moves funds,
//!   and reversed if the treasury fails.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use drip::core::StreamParams;
//! use drip::store::SqliteStore;
//! use drip::{Ledger, LedgerConfig, MemoryTreasury, SystemClock};
//!
//! async fn example() {
//!     let store = SqliteStore::open("drip.db").unwrap();
//!     let treasury = Arc::new(MemoryTreasury::new());
//!     let ledger = Ledger::new(store, treasury, Arc::new(SystemClock), LedgerConfig::default());
//!
//!     let id = ledger
//!         .create_stream(StreamParams::new("alice", "bob", "DAI", 36_000, 3600, 1_700_000_000))
//!         .await
//!         .unwrap();
//!
//!     let view = ledger.get_accrual_view(id).await.unwrap();
//!     println!("accrued so far: {}", view.balance_accrued);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `drip::core` - Stream record, accrual engine, identifiers
//! - `drip::store` - Storage abstraction and SQLite

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
mod locks;
pub mod observer;
pub mod treasury;

// Re-export component crates
pub use drip_core as core;
pub use drip_store as store;

// Re-export main types for convenience
pub use auth::{Action, AllowAll, Authorizer, OwnerAuthorizer};
pub use clock::{Clock, SystemClock};
pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, Result};
pub use ledger::Ledger;
pub use observer::{LedgerEvent, NoopObserver, Observer, StreamCreated, TracingObserver};
pub use treasury::{MemoryTreasury, Treasury, TransferError};

pub use drip_core::{
    AccountId, Accrual, Amount, AssetId, Stream, StreamId, StreamParams, StreamStatus, Timestamp,
};
pub use drip_store::StreamFilter;
