//! Clock: the source of "now" for every accrual computation.

use drip_core::Timestamp;

/// Supplies the current logical time in seconds.
///
/// Readings are expected to be non-decreasing, but the ledger tolerates a
/// reading earlier than a stream's recorded start (it clamps to zero elapsed).
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock in Unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
