//! Stream: a single sender-to-recipient, single-asset, time-bounded entitlement.
//!
//! The record is created once from a [`StreamDraft`](crate::StreamDraft) and
//! afterwards only changes through the transitions defined here. Each
//! transition checks everything before writing any field, so an error leaves
//! the record exactly as it was.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::accrual::{self, Accrual};
use crate::error::{CoreError, Result};
use crate::types::{AccountId, Amount, AssetId, StreamId, Timestamp};
use crate::validation::validate_amount;

/// The two states of the pause/resume state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamStatus {
    Running,
    Paused,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamStatus::Running => f.write_str("running"),
            StreamStatus::Paused => f.write_str("paused"),
        }
    }
}

/// The stream record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: StreamId,
    pub sender: AccountId,
    pub recipient: AccountId,
    pub asset: AssetId,

    /// Total amount committed. Immutable.
    pub deposit: Amount,

    /// Running seconds needed to release the deposit. Immutable.
    pub duration: u64,

    /// `deposit / duration`, floored. Immutable.
    pub rate_per_second: Amount,

    /// Start of the current running segment; 0 while paused.
    pub start_time: Timestamp,

    /// Scheduled end of the current running segment; 0 while paused.
    pub stop_time: Timestamp,

    /// Running seconds banked from earlier segments.
    pub accumulated_elapsed: u64,

    /// Cumulative amount paid out to the recipient.
    pub withdrawn: Amount,

    pub is_running: bool,
}

impl Stream {
    pub fn status(&self) -> StreamStatus {
        if self.is_running {
            StreamStatus::Running
        } else {
            StreamStatus::Paused
        }
    }

    /// Derived accrual view at `now`.
    pub fn accrual(&self, now: Timestamp) -> Accrual {
        Accrual::compute(self, now)
    }

    /// True once every running second is banked and the deposit has been
    /// paid out in full. A settled stream accrues nothing further.
    pub fn is_settled(&self, now: Timestamp) -> bool {
        accrual::duration_remaining(self, now) == 0 && self.withdrawn == self.deposit
    }

    /// Bank the current running segment and enter the paused state.
    pub fn pause(&mut self, now: Timestamp) -> Result<()> {
        self.expect_status(StreamStatus::Running)?;

        let banked = self
            .accumulated_elapsed
            .saturating_add(now.saturating_sub(self.start_time))
            .min(self.duration);

        self.accumulated_elapsed = banked;
        self.start_time = 0;
        self.stop_time = 0;
        self.is_running = false;
        Ok(())
    }

    /// Open a new running segment at `now` covering the remaining duration.
    ///
    /// Resuming a fully accrued stream is allowed; its new segment is empty.
    pub fn resume(&mut self, now: Timestamp) -> Result<()> {
        self.expect_status(StreamStatus::Paused)?;

        if now == 0 {
            return Err(CoreError::InvalidParameters(
                "cannot resume at timestamp 0".to_string(),
            ));
        }

        let remaining = self.duration - self.accumulated_elapsed.min(self.duration);
        let stop_time = now
            .checked_add(remaining)
            .ok_or(CoreError::Overflow("resume stop_time"))?;

        self.start_time = now;
        self.stop_time = stop_time;
        self.is_running = true;
        Ok(())
    }

    /// Book a withdrawal of `amount` against what has accrued by `now`.
    ///
    /// Returns the amount that was available before the booking.
    pub fn reserve_withdrawal(&mut self, amount: Amount, now: Timestamp) -> Result<Amount> {
        validate_amount(amount)?;

        let available = accrual::withdrawable(self, now);
        if amount > available {
            return Err(CoreError::InsufficientAccrued {
                requested: amount,
                available,
            });
        }

        self.withdrawn += amount;
        Ok(available)
    }

    /// Undo a booking made by [`Stream::reserve_withdrawal`].
    pub fn release_withdrawal(&mut self, amount: Amount) -> Result<()> {
        validate_amount(amount)?;

        if amount > self.withdrawn {
            return Err(CoreError::InvalidParameters(format!(
                "cannot release {} from withdrawn {}",
                amount, self.withdrawn
            )));
        }

        self.withdrawn -= amount;
        Ok(())
    }

    fn expect_status(&self, expected: StreamStatus) -> Result<()> {
        let actual = self.status();
        if actual != expected {
            return Err(CoreError::InvalidState {
                id: self.id,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::StreamParams;

    const T0: Timestamp = 1_700_000_000;

    fn new_stream() -> Stream {
        StreamParams::new("alice", "bob", "DAI", 36_000, 3600, T0)
            .validate()
            .unwrap()
            .into_stream(StreamId::FIRST)
    }

    #[test]
    fn test_new_stream_is_running() {
        let s = new_stream();
        assert_eq!(s.status(), StreamStatus::Running);
        assert_eq!(s.start_time, T0);
        assert_eq!(s.stop_time, T0 + 3600);
    }

    #[test]
    fn test_pause_banks_elapsed_and_zeroes_times() {
        let mut s = new_stream();
        s.pause(T0 + 30).unwrap();

        assert_eq!(s.status(), StreamStatus::Paused);
        assert_eq!(s.start_time, 0);
        assert_eq!(s.stop_time, 0);
        assert_eq!(s.accumulated_elapsed, 30);
        assert_eq!(s.accrual(T0 + 9_999).duration_elapsed, 30);
    }

    #[test]
    fn test_pause_twice_is_invalid_state() {
        let mut s = new_stream();
        s.pause(T0 + 30).unwrap();
        let before = s.clone();

        let err = s.pause(T0 + 40).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidState {
                id: StreamId::FIRST,
                expected: StreamStatus::Running,
                actual: StreamStatus::Paused,
            }
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_resume_running_is_invalid_state() {
        let mut s = new_stream();
        let before = s.clone();

        assert!(matches!(
            s.resume(T0 + 10),
            Err(CoreError::InvalidState { .. })
        ));
        assert_eq!(s, before);
    }

    #[test]
    fn test_resume_schedules_remaining_duration() {
        let mut s = new_stream();
        s.pause(T0 + 30).unwrap();
        s.resume(T0 + 500).unwrap();

        assert!(s.is_running);
        assert_eq!(s.start_time, T0 + 500);
        assert_eq!(s.stop_time, T0 + 500 + 3570);
        assert_eq!(s.accrual(T0 + 500).duration_elapsed, 30);
        assert_eq!(s.accrual(T0 + 600).duration_elapsed, 130);
    }

    #[test]
    fn test_pause_after_full_accrual_clamps() {
        let mut s = new_stream();
        s.pause(T0 + 50_000).unwrap();
        assert_eq!(s.accumulated_elapsed, 3600);

        s.resume(T0 + 60_000).unwrap();
        assert_eq!(s.stop_time, T0 + 60_000);
        assert_eq!(s.accrual(T0 + 70_000).duration_remaining, 0);
    }

    #[test]
    fn test_pause_before_scheduled_start_banks_nothing() {
        let mut s = new_stream();
        s.pause(T0 - 100).unwrap();
        assert_eq!(s.accumulated_elapsed, 0);
    }

    #[test]
    fn test_resume_at_zero_rejected() {
        let mut s = new_stream();
        s.pause(T0 + 1).unwrap();
        let before = s.clone();

        assert!(matches!(s.resume(0), Err(CoreError::InvalidParameters(_))));
        assert_eq!(s, before);
    }

    #[test]
    fn test_reserve_withdrawal_limits() {
        let mut s = new_stream();

        // Nothing accrued at the start.
        assert_eq!(
            s.reserve_withdrawal(800, T0),
            Err(CoreError::InsufficientAccrued {
                requested: 800,
                available: 0
            })
        );

        assert_eq!(s.reserve_withdrawal(800, T0 + 100).unwrap(), 1_000);
        assert_eq!(s.withdrawn, 800);

        assert!(matches!(
            s.reserve_withdrawal(201, T0 + 100),
            Err(CoreError::InsufficientAccrued { available: 200, .. })
        ));
        assert_eq!(s.withdrawn, 800);
    }

    #[test]
    fn test_reserve_rejects_non_positive_amount() {
        let mut s = new_stream();
        assert!(matches!(
            s.reserve_withdrawal(0, T0 + 100),
            Err(CoreError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_release_withdrawal() {
        let mut s = new_stream();
        s.reserve_withdrawal(500, T0 + 100).unwrap();
        s.release_withdrawal(500).unwrap();
        assert_eq!(s.withdrawn, 0);
        assert!(s.release_withdrawal(1).is_err());
    }

    #[test]
    fn test_settled_after_full_payout() {
        let mut s = new_stream();
        let end = T0 + 3600;
        assert!(!s.is_settled(end));

        s.reserve_withdrawal(36_000, end).unwrap();
        assert!(s.is_settled(end));
    }
}
