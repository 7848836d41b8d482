//! Error types for the Ledger.

use drip_core::{AccountId, Amount, CoreError, StreamId, StreamStatus};
use drip_store::StoreError;
use thiserror::Error;

use crate::auth::Action;
use crate::treasury::TransferError;

/// Errors that can occur during Ledger operations.
///
/// Every error is a rejected operation: the stream is left as it was before
/// the call.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Stream not found.
    #[error("stream not found: {0}")]
    NotFound(StreamId),

    /// Non-positive deposit, duration or amount, or a reserved timestamp.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Pause of a paused stream, or resume of a running one.
    #[error("stream {id} is {actual}, expected {expected}")]
    InvalidState {
        id: StreamId,
        expected: StreamStatus,
        actual: StreamStatus,
    },

    /// Withdrawal exceeds what has accrued and not been paid out.
    #[error("insufficient accrued balance on {id}: requested {requested}, available {available}")]
    InsufficientAccrued {
        id: StreamId,
        requested: Amount,
        available: Amount,
    },

    /// The treasury refused or failed the transfer.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// The authorizer refused the caller.
    #[error("{caller} may not {action} stream {id}")]
    NotAuthorized {
        caller: AccountId,
        action: Action,
        id: StreamId,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

/// Coarse error classification for callers that branch on the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidParameters,
    InvalidState,
    InsufficientAccrued,
    TransferError,
    NotAuthorized,
    Storage,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidParameters(_) => ErrorKind::InvalidParameters,
            LedgerError::InvalidState { .. } => ErrorKind::InvalidState,
            LedgerError::InsufficientAccrued { .. } => ErrorKind::InsufficientAccrued,
            LedgerError::Transfer(_) => ErrorKind::TransferError,
            LedgerError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            LedgerError::Store(_) => ErrorKind::Storage,
        }
    }

    /// Map a creation-time validation failure.
    pub(crate) fn from_validation(err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameters(msg) => LedgerError::InvalidParameters(msg),
            other => LedgerError::InvalidParameters(other.to_string()),
        }
    }

    /// Attach the stream id to a core error.
    pub(crate) fn from_core(id: StreamId, err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameters(msg) => LedgerError::InvalidParameters(msg),
            CoreError::Overflow(what) => {
                LedgerError::InvalidParameters(format!("arithmetic overflow in {}", what))
            }
            CoreError::InvalidState {
                id,
                expected,
                actual,
            } => LedgerError::InvalidState {
                id,
                expected,
                actual,
            },
            CoreError::InsufficientAccrued {
                requested,
                available,
            } => LedgerError::InsufficientAccrued {
                id,
                requested,
                available,
            },
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => LedgerError::NotFound(id),
            other => LedgerError::Store(other),
        }
    }
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
