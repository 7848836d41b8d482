//! Proptest generators for property-based testing.

use proptest::prelude::*;

use drip_core::{Amount, Stream, StreamId, StreamParams, Timestamp};

/// Generate a positive deposit.
pub fn deposit() -> impl Strategy<Value = Amount> {
    1i128..=1_000_000_000_000_000
}

/// Generate a positive duration of up to about a year.
pub fn duration() -> impl Strategy<Value = u64> {
    1u64..=31_536_000
}

/// Generate a non-zero start time.
pub fn start_time() -> impl Strategy<Value = Timestamp> {
    1u64..=4_000_000_000
}

/// Generate valid creation parameters.
pub fn stream_params() -> impl Strategy<Value = StreamParams> {
    (deposit(), duration(), start_time()).prop_map(|(deposit, duration, start)| {
        StreamParams::new("alice", "bob", "DAI", deposit, duration, start)
    })
}

/// Generate a freshly created stream.
pub fn stream() -> impl Strategy<Value = Stream> {
    stream_params().prop_filter_map("valid params", |params| {
        params
            .validate()
            .ok()
            .map(|draft| draft.into_stream(StreamId::FIRST))
    })
}

/// A single step applied to a stream in a generated history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Move the clock forward.
    Advance(u64),
    Pause,
    Resume,
    /// Withdraw this fraction (in basis points) of what is currently withdrawable.
    Withdraw(u16),
}

/// Generate one step.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..=5_000).prop_map(Op::Advance),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        2 => (1u16..=10_000).prop_map(Op::Withdraw),
    ]
}

/// Generate a history of up to `max_len` steps.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// Apply `op` to `stream` at `*now`, ignoring rejected transitions.
///
/// Returns true if the stream changed.
pub fn apply_op(stream: &mut Stream, now: &mut Timestamp, op: Op) -> bool {
    match op {
        Op::Advance(secs) => {
            *now = now.saturating_add(secs);
            false
        }
        Op::Pause => stream.pause(*now).is_ok(),
        Op::Resume => stream.resume(*now).is_ok(),
        Op::Withdraw(bps) => {
            let available = stream.accrual(*now).withdrawable;
            let amount = available * Amount::from(bps) / 10_000;
            amount > 0 && stream.reserve_withdrawal(amount, *now).is_ok()
        }
    }
}
