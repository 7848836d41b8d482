//! # Drip Testkit
//!
//! Testing utilities for the Drip stream ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Accrual vectors**: Short stream histories with known outcomes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A manual clock, scripted treasuries, a recording observer,
//!   and a ready-wired ledger
//!
//! ## Accrual Vectors
//!
//! ```rust
//! use drip_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, detail) in verify_all_vectors() {
//!     assert!(passed, "{}: {}", name, detail);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use drip_testkit::generators::{apply_op, ops, stream};
//!
//! proptest! {
//!     #[test]
//!     fn withdrawn_never_exceeds_accrued(mut s in stream(), history in ops(32)) {
//!         let mut now = s.start_time;
//!         for op in history {
//!             apply_op(&mut s, &mut now, op);
//!             prop_assert!(s.withdrawn <= s.accrual(now).balance_accrued);
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use drip_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let id = fixture.create(36_000, 3600).await?;
//! fixture.advance(1800);
//! let view = fixture.ledger.get_accrual_view(id).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    FailingTreasury, ManualClock, RecordingObserver, ReentrantTreasury, ReentryOutcome,
    TestFixture, T0,
};
pub use generators::{apply_op, Op};
pub use vectors::{all_vectors, replay, verify_all_vectors, AccrualVector, Step};
