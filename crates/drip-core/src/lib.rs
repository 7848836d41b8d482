//! # Drip Core
//!
//! Pure primitives for the Drip ledger: stream records, the accrual engine,
//! and the pause/resume and withdrawal bookkeeping transitions.
//!
//! This crate contains no I/O, no storage, no clocks. Every function takes the
//! current time as an argument.
//!
//! ## Key Types
//!
//! - [`Stream`] - The stream record
//! - [`StreamParams`] / [`StreamDraft`] - Creation parameters before and after validation
//! - [`Accrual`] - Derived, time-dependent view of a stream
//! - [`StreamId`], [`AccountId`], [`AssetId`] - Identifiers
//!
//! ## Arithmetic
//!
//! `rate_per_second` is `deposit / duration` with floor division. The
//! remainder is an accepted rounding loss and is never released.

pub mod accrual;
pub mod error;
pub mod stream;
pub mod types;
pub mod validation;

pub use accrual::Accrual;
pub use error::{CoreError, Result};
pub use stream::{Stream, StreamStatus};
pub use types::{AccountId, Amount, AssetId, StreamId, Timestamp};
pub use validation::{rate_per_second, validate_amount, validate_params, StreamDraft, StreamParams};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const T0: Timestamp = 1_000_000;

    proptest! {
        #[test]
        fn duration_split_holds(
            deposit in 1i128..=1_000_000_000_000,
            duration in 1u64..=1_000_000,
            offset in 0u64..=2_000_000,
        ) {
            let stream = StreamParams::new("a", "b", "X", deposit, duration, T0)
                .validate()
                .unwrap()
                .into_stream(StreamId::FIRST);
            let view = stream.accrual(T0 + offset);

            prop_assert_eq!(view.duration_elapsed + view.duration_remaining, duration);
            prop_assert!(view.balance_accrued <= deposit);
            prop_assert!(stream.rate_per_second * Amount::from(duration) <= deposit);
        }

        #[test]
        fn pause_resume_preserves_elapsed(
            duration in 1u64..=100_000,
            run in 0u64..=200_000,
            gap in 0u64..=200_000,
        ) {
            let mut stream = StreamParams::new("a", "b", "X", 1_000_000, duration, T0)
                .validate()
                .unwrap()
                .into_stream(StreamId::FIRST);

            stream.pause(T0 + run).unwrap();
            let banked = stream.accrual(T0 + run).duration_elapsed;
            prop_assert_eq!(banked, run.min(duration));

            // Frozen while paused.
            prop_assert_eq!(stream.accrual(T0 + run + gap).duration_elapsed, banked);

            stream.resume(T0 + run + gap).unwrap();
            prop_assert_eq!(stream.stop_time, T0 + run + gap + (duration - banked));
            prop_assert_eq!(stream.accrual(T0 + run + gap).duration_elapsed, banked);
        }
    }
}
