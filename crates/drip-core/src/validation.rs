//! Creation parameter validation.
//!
//! A stream can only be built from a [`StreamDraft`], and a draft can only be
//! obtained by validating [`StreamParams`]. This keeps the rate computation
//! and the parameter checks in one place.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::stream::Stream;
use crate::types::{AccountId, Amount, AssetId, StreamId, Timestamp};

/// Caller-supplied parameters for a new stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    /// Who funds the stream.
    pub sender: AccountId,
    /// Who may withdraw from the stream.
    pub recipient: AccountId,
    /// The asset the deposit is denominated in.
    pub asset: AssetId,
    /// Total amount committed.
    pub deposit: Amount,
    /// Running seconds needed to release the whole deposit.
    pub duration: u64,
    /// When the first running segment begins.
    pub start_time: Timestamp,
}

impl StreamParams {
    pub fn new(
        sender: impl Into<AccountId>,
        recipient: impl Into<AccountId>,
        asset: impl Into<AssetId>,
        deposit: Amount,
        duration: u64,
        start_time: Timestamp,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            asset: asset.into(),
            deposit,
            duration,
            start_time,
        }
    }

    /// Validate the parameters and compute the per-second rate.
    pub fn validate(&self) -> Result<StreamDraft> {
        validate_params(self)?;
        Ok(StreamDraft {
            rate_per_second: rate_per_second(self.deposit, self.duration),
            params: self.clone(),
        })
    }
}

/// Validated creation parameters, ready to receive an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDraft {
    params: StreamParams,
    rate_per_second: Amount,
}

impl StreamDraft {
    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    pub fn rate_per_second(&self) -> Amount {
        self.rate_per_second
    }

    /// Materialize the draft as a running stream with the given id.
    pub fn into_stream(self, id: StreamId) -> Stream {
        let StreamParams {
            sender,
            recipient,
            asset,
            deposit,
            duration,
            start_time,
        } = self.params;

        Stream {
            id,
            sender,
            recipient,
            asset,
            deposit,
            duration,
            rate_per_second: self.rate_per_second,
            start_time,
            stop_time: start_time.saturating_add(duration),
            accumulated_elapsed: 0,
            withdrawn: 0,
            is_running: true,
        }
    }
}

/// Check creation parameters.
///
/// `start_time == 0` is rejected because zero marks a paused stream.
pub fn validate_params(params: &StreamParams) -> Result<()> {
    if params.deposit <= 0 {
        return Err(CoreError::InvalidParameters(format!(
            "deposit must be positive, got {}",
            params.deposit
        )));
    }

    if params.duration == 0 {
        return Err(CoreError::InvalidParameters(
            "duration must be positive".to_string(),
        ));
    }

    if params.start_time == 0 {
        return Err(CoreError::InvalidParameters(
            "start_time 0 is reserved for paused streams".to_string(),
        ));
    }

    if params.start_time.checked_add(params.duration).is_none() {
        return Err(CoreError::Overflow("start_time + duration"));
    }

    Ok(())
}

/// Floor division of deposit by duration. The remainder is never released.
pub fn rate_per_second(deposit: Amount, duration: u64) -> Amount {
    deposit / Amount::from(duration)
}

/// Check a withdrawal amount.
pub fn validate_amount(amount: Amount) -> Result<()> {
    if amount <= 0 {
        return Err(CoreError::InvalidParameters(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(deposit: Amount, duration: u64) -> StreamParams {
        StreamParams::new("alice", "bob", "DAI", deposit, duration, 1_000)
    }

    #[test]
    fn test_rate_is_floor_division() {
        assert_eq!(rate_per_second(36, 3600), 0);
        assert_eq!(rate_per_second(36_000, 3600), 10);
        assert_eq!(rate_per_second(3_601, 3600), 1);
        assert_eq!(rate_per_second(7_199, 3600), 1);
    }

    #[test]
    fn test_rate_times_duration_never_exceeds_deposit() {
        for (deposit, duration) in [(10, 3), (1_000_000_007, 3600), (5, 5), (1, 100)] {
            let rate = rate_per_second(deposit, duration);
            assert!(rate * Amount::from(duration) <= deposit);
        }
    }

    #[test]
    fn test_rejects_non_positive_deposit() {
        assert!(matches!(
            params(0, 3600).validate(),
            Err(CoreError::InvalidParameters(_))
        ));
        assert!(matches!(
            params(-5, 3600).validate(),
            Err(CoreError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_rejects_zero_duration() {
        assert!(matches!(
            params(100, 0).validate(),
            Err(CoreError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_rejects_zero_start_time() {
        let mut p = params(100, 10);
        p.start_time = 0;
        assert!(matches!(p.validate(), Err(CoreError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_stop_time_overflow() {
        let mut p = params(100, 10);
        p.start_time = u64::MAX - 5;
        assert_eq!(p.validate(), Err(CoreError::Overflow("start_time + duration")));
    }

    #[test]
    fn test_draft_into_stream() {
        let stream = params(36_000, 3600).validate().unwrap().into_stream(StreamId::FIRST);

        assert_eq!(stream.id, StreamId::FIRST);
        assert_eq!(stream.rate_per_second, 10);
        assert_eq!(stream.start_time, 1_000);
        assert_eq!(stream.stop_time, 4_600);
        assert_eq!(stream.accumulated_elapsed, 0);
        assert_eq!(stream.withdrawn, 0);
        assert!(stream.is_running);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-1).is_err());
    }
}
