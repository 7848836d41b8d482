//! Error types for the Drip core.

use thiserror::Error;

use crate::stream::StreamStatus;
use crate::types::{Amount, StreamId};

/// Errors raised by pure stream operations.
///
/// Every operation that returns one of these leaves the stream untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A deposit, duration, amount, or timestamp is outside its legal range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A pause/resume was requested from the wrong state.
    #[error("stream {id} is {actual}, expected {expected}")]
    InvalidState {
        id: StreamId,
        expected: StreamStatus,
        actual: StreamStatus,
    },

    /// A withdrawal asked for more than has accrued and not yet been paid out.
    #[error("insufficient accrued balance: requested {requested}, available {available}")]
    InsufficientAccrued { requested: Amount, available: Amount },

    /// Arithmetic on a stream field would overflow.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
