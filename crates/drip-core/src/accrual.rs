//! Accrual engine: time-based entitlement derived from a stream and a clock reading.
//!
//! Everything here is a pure function of `(stream, now)`. A clock reading
//! earlier than the recorded start clamps to zero elapsed time rather than
//! going negative.

use serde::{Deserialize, Serialize};

use crate::stream::Stream;
use crate::types::{Amount, Timestamp};

/// Seconds the current running segment has been running at `now`.
///
/// Zero while paused.
pub fn seconds_since_start(stream: &Stream, now: Timestamp) -> u64 {
    if stream.is_running {
        now.saturating_sub(stream.start_time)
    } else {
        0
    }
}

/// Total running seconds at `now`, clamped to the stream's duration.
pub fn duration_elapsed(stream: &Stream, now: Timestamp) -> u64 {
    stream
        .accumulated_elapsed
        .saturating_add(seconds_since_start(stream, now))
        .min(stream.duration)
}

/// Running seconds still owed at `now`.
pub fn duration_remaining(stream: &Stream, now: Timestamp) -> u64 {
    stream.duration - duration_elapsed(stream, now)
}

/// Cumulative entitlement at `now`, capped at the deposit.
pub fn balance_accrued(stream: &Stream, now: Timestamp) -> Amount {
    Amount::from(duration_elapsed(stream, now))
        .saturating_mul(stream.rate_per_second)
        .min(stream.deposit)
}

/// Accrued but not yet withdrawn at `now`.
pub fn withdrawable(stream: &Stream, now: Timestamp) -> Amount {
    (balance_accrued(stream, now) - stream.withdrawn).max(0)
}

/// The derived, time-dependent view of a stream.
///
/// Never cached: compute a fresh one for every clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    pub is_running: bool,
    pub duration: u64,
    pub duration_elapsed: u64,
    pub duration_remaining: u64,
    pub deposit: Amount,
    pub balance_accrued: Amount,
    pub withdrawn: Amount,
    pub withdrawable: Amount,
    /// The clock reading this view was computed for.
    pub computed_at: Timestamp,
}

impl Accrual {
    /// Compute the accrual view of `stream` at `now`.
    pub fn compute(stream: &Stream, now: Timestamp) -> Self {
        let elapsed = duration_elapsed(stream, now);
        let accrued = balance_accrued(stream, now);

        Self {
            is_running: stream.is_running,
            duration: stream.duration,
            duration_elapsed: elapsed,
            duration_remaining: stream.duration - elapsed,
            deposit: stream.deposit,
            balance_accrued: accrued,
            withdrawn: stream.withdrawn,
            withdrawable: (accrued - stream.withdrawn).max(0),
            computed_at: now,
        }
    }

    /// Whether every running second has been banked.
    pub fn is_fully_accrued(&self) -> bool {
        self.duration_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StreamId;
    use crate::validation::StreamParams;

    const T0: Timestamp = 1_700_000_000;

    fn stream(deposit: Amount, duration: u64) -> Stream {
        StreamParams::new("alice", "bob", "DAI", deposit, duration, T0)
            .validate()
            .unwrap()
            .into_stream(StreamId::FIRST)
    }

    #[test]
    fn test_half_way_through() {
        let s = stream(36_000, 3600);
        let view = Accrual::compute(&s, T0 + 1800);

        assert_eq!(view.duration_elapsed, 1800);
        assert_eq!(view.duration_remaining, 1800);
        assert_eq!(view.balance_accrued, 18_000);
        assert_eq!(view.withdrawable, 18_000);
        assert!(view.is_running);
    }

    #[test]
    fn test_clock_before_start_clamps_to_zero() {
        let s = stream(36_000, 3600);
        assert_eq!(seconds_since_start(&s, T0 - 50), 0);
        assert_eq!(duration_elapsed(&s, T0 - 50), 0);
        assert_eq!(duration_remaining(&s, T0 - 50), 3600);
        assert_eq!(balance_accrued(&s, T0 - 50), 0);
    }

    #[test]
    fn test_elapsed_clamps_at_duration() {
        let s = stream(36_000, 3600);
        let view = Accrual::compute(&s, T0 + 10_000);

        assert_eq!(view.duration_elapsed, 3600);
        assert_eq!(view.duration_remaining, 0);
        assert_eq!(view.balance_accrued, 36_000);
        assert!(view.is_fully_accrued());
    }

    #[test]
    fn test_truncated_rate_never_reaches_deposit() {
        // 10 / 3 = 3 per second; the remaining 1 is never released.
        let s = stream(10, 3);
        assert_eq!(balance_accrued(&s, T0 + 3), 9);
        assert_eq!(balance_accrued(&s, T0 + 1_000), 9);
    }

    #[test]
    fn test_paused_stream_uses_banked_time_only() {
        let mut s = stream(36_000, 3600);
        s.is_running = false;
        s.start_time = 0;
        s.stop_time = 0;
        s.accumulated_elapsed = 30;

        assert_eq!(seconds_since_start(&s, T0 + 5_000), 0);
        assert_eq!(duration_elapsed(&s, T0 + 5_000), 30);
        assert_eq!(balance_accrued(&s, T0 + 5_000), 300);
    }

    #[test]
    fn test_withdrawable_subtracts_withdrawn() {
        let mut s = stream(36_000, 3600);
        s.withdrawn = 5_000;
        assert_eq!(withdrawable(&s, T0 + 1000), 5_000);
    }
}
