//! Authorization seam.
//!
//! The ledger does not decide who may act on a stream. It asks an
//! [`Authorizer`] before any mutation is attempted and rejects the call if the
//! answer is no.

use std::fmt;

use drip_core::{AccountId, Stream};
use serde::{Deserialize, Serialize};

/// A mutating action on an existing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Pause,
    Resume,
    Withdraw,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pause => f.write_str("pause"),
            Action::Resume => f.write_str("resume"),
            Action::Withdraw => f.write_str("withdraw from"),
        }
    }
}

/// Decides whether `caller` may perform `action` on `stream`.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: &AccountId, action: Action, stream: &Stream) -> bool;
}

/// The sender controls pause/resume; the recipient withdraws.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerAuthorizer;

impl Authorizer for OwnerAuthorizer {
    fn is_authorized(&self, caller: &AccountId, action: Action, stream: &Stream) -> bool {
        match action {
            Action::Pause | Action::Resume => caller == &stream.sender,
            Action::Withdraw => caller == &stream.recipient,
        }
    }
}

/// Approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _caller: &AccountId, _action: Action, _stream: &Stream) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_core::{StreamId, StreamParams};

    fn stream() -> Stream {
        StreamParams::new("alice", "bob", "DAI", 100, 10, 1_000)
            .validate()
            .unwrap()
            .into_stream(StreamId::FIRST)
    }

    #[test]
    fn test_owner_authorizer() {
        let s = stream();
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");

        assert!(OwnerAuthorizer.is_authorized(&alice, Action::Pause, &s));
        assert!(OwnerAuthorizer.is_authorized(&alice, Action::Resume, &s));
        assert!(!OwnerAuthorizer.is_authorized(&alice, Action::Withdraw, &s));

        assert!(!OwnerAuthorizer.is_authorized(&bob, Action::Pause, &s));
        assert!(OwnerAuthorizer.is_authorized(&bob, Action::Withdraw, &s));
    }

    #[test]
    fn test_allow_all() {
        let s = stream();
        assert!(AllowAll.is_authorized(&AccountId::from("mallory"), Action::Withdraw, &s));
    }
}
