//! Accrual vectors: short stream histories with their expected outcome.
//!
//! Every ledger implementation must land on the same numbers for these. They
//! replay against the pure core, so they need no store or clock.

use drip_core::{Accrual, Amount, Stream, StreamId, StreamParams, Timestamp};

/// Start time used by every vector.
pub const VECTOR_START: Timestamp = 1_700_000_000;

/// One whole token of an 18-decimal asset, in base units.
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

/// One step of a vector's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advance(u64),
    Pause,
    Resume,
    Withdraw(Amount),
}

/// An accrual vector.
#[derive(Debug, Clone)]
pub struct AccrualVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub deposit: Amount,
    pub duration: u64,
    pub steps: &'static [Step],
    pub expected_running: bool,
    pub expected_elapsed: u64,
    pub expected_accrued: Amount,
    pub expected_withdrawn: Amount,
    /// Expected `stop_time - VECTOR_START`, or 0 while paused.
    pub expected_stop_offset: u64,
}

/// Get all accrual vectors.
pub fn all_vectors() -> Vec<AccrualVector> {
    vec![
        AccrualVector {
            name: "half way through a one hour stream of 36 tokens",
            deposit: 36 * ONE_TOKEN,
            duration: 3600,
            steps: &[Step::Advance(1800)],
            expected_running: true,
            expected_elapsed: 1800,
            expected_accrued: 18 * ONE_TOKEN,
            expected_withdrawn: 0,
            expected_stop_offset: 3600,
        },
        AccrualVector {
            name: "sub-unit rate accrues nothing",
            deposit: 36,
            duration: 3600,
            steps: &[Step::Advance(1800)],
            expected_running: true,
            expected_elapsed: 1800,
            expected_accrued: 0,
            expected_withdrawn: 0,
            expected_stop_offset: 3600,
        },
        AccrualVector {
            name: "half way with a whole rate",
            deposit: 36_000,
            duration: 3600,
            steps: &[Step::Advance(1800)],
            expected_running: true,
            expected_elapsed: 1800,
            expected_accrued: 18_000,
            expected_withdrawn: 0,
            expected_stop_offset: 3600,
        },
        AccrualVector {
            name: "paused immediately",
            deposit: 36_000,
            duration: 3600,
            steps: &[Step::Pause, Step::Advance(600)],
            expected_running: false,
            expected_elapsed: 0,
            expected_accrued: 0,
            expected_withdrawn: 0,
            expected_stop_offset: 0,
        },
        AccrualVector {
            name: "pause at 30 then resume",
            deposit: 36_000,
            duration: 3600,
            steps: &[Step::Advance(30), Step::Pause, Step::Advance(70), Step::Resume],
            expected_running: true,
            expected_elapsed: 30,
            expected_accrued: 300,
            expected_withdrawn: 0,
            expected_stop_offset: 100 + 3570,
        },
        AccrualVector {
            name: "withdraw part of the accrual",
            deposit: 36_000,
            duration: 3600,
            steps: &[Step::Advance(100), Step::Withdraw(600), Step::Advance(50)],
            expected_running: true,
            expected_elapsed: 150,
            expected_accrued: 1500,
            expected_withdrawn: 600,
            expected_stop_offset: 3600,
        },
        AccrualVector {
            name: "pause long after the end clamps",
            deposit: 1000,
            duration: 100,
            steps: &[Step::Advance(10_000), Step::Pause, Step::Resume],
            expected_running: true,
            expected_elapsed: 100,
            expected_accrued: 1000,
            expected_withdrawn: 0,
            expected_stop_offset: 10_000,
        },
        AccrualVector {
            name: "floor rate leaves a remainder",
            deposit: 1000,
            duration: 3,
            steps: &[Step::Advance(5)],
            expected_running: true,
            expected_elapsed: 3,
            expected_accrued: 999,
            expected_withdrawn: 0,
            expected_stop_offset: 3,
        },
    ]
}

/// Replay a vector against the core, returning the final stream and the
/// clock reading at the end.
///
/// Every step must be accepted; a rejected step is reported as an error.
pub fn replay(vector: &AccrualVector) -> Result<(Stream, Timestamp), String> {
    let mut now = VECTOR_START;
    let mut stream = StreamParams::new(
        "alice",
        "bob",
        "DAI",
        vector.deposit,
        vector.duration,
        VECTOR_START,
    )
    .validate()
    .map_err(|e| e.to_string())?
    .into_stream(StreamId::FIRST);

    for step in vector.steps {
        match *step {
            Step::Advance(secs) => now += secs,
            Step::Pause => stream.pause(now).map_err(|e| e.to_string())?,
            Step::Resume => stream.resume(now).map_err(|e| e.to_string())?,
            Step::Withdraw(amount) => {
                stream
                    .reserve_withdrawal(amount, now)
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    Ok((stream, now))
}

/// Check a replayed stream against the vector's expectations.
pub fn check(vector: &AccrualVector, stream: &Stream, view: &Accrual) -> bool {
    let stop_offset = stream.stop_time.saturating_sub(VECTOR_START);

    view.is_running == vector.expected_running
        && view.duration_elapsed == vector.expected_elapsed
        && view.duration_remaining == vector.duration - vector.expected_elapsed
        && view.balance_accrued == vector.expected_accrued
        && stream.withdrawn == vector.expected_withdrawn
        && stop_offset == vector.expected_stop_offset
}

/// Verify all vectors against the core.
///
/// Returns `(name, passed, detail)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match replay(v) {
            Ok((stream, now)) => {
                let view = stream.accrual(now);
                let detail = format!(
                    "elapsed={} accrued={} withdrawn={} stop_time={}",
                    view.duration_elapsed, view.balance_accrued, stream.withdrawn, stream.stop_time
                );
                (v.name.to_string(), check(v, &stream, &view), detail)
            }
            Err(e) => (v.name.to_string(), false, e),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        for (name, passed, detail) in verify_all_vectors() {
            assert!(passed, "vector '{}' failed: {}", name, detail);
        }
    }

    #[test]
    fn test_rejected_step_is_reported() {
        let vector = AccrualVector {
            name: "resume while running",
            deposit: 100,
            duration: 10,
            steps: &[Step::Resume],
            expected_running: true,
            expected_elapsed: 0,
            expected_accrued: 0,
            expected_withdrawn: 0,
            expected_stop_offset: 10,
        };
        assert!(replay(&vector).is_err());
    }
}
