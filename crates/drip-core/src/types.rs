//! Strong type definitions for the Drip ledger.
//!
//! Identifiers are newtypes to prevent misuse at compile time. Amounts and
//! timestamps are plain aliases because they take part in arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of an asset, in the asset's smallest unit.
pub type Amount = i128;

/// A logical timestamp in whole seconds.
pub type Timestamp = u64;

/// A stream identifier.
///
/// Assigned sequentially by the store starting at 1 and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId(pub u64);

impl StreamId {
    /// The first id a fresh store hands out.
    pub const FIRST: Self = Self(1);

    /// Create a new StreamId from its raw value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The id that follows this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamId({})", self.0)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for StreamId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// An opaque account identifier (sender, recipient, escrow, payout target).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for AccountId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// An opaque asset identifier: the unit a stream's deposit is denominated in.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for AssetId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_sequence() {
        assert_eq!(StreamId::FIRST.get(), 1);
        assert_eq!(StreamId::FIRST.next(), StreamId::new(2));
        assert!(StreamId::new(2) > StreamId::FIRST);
    }

    #[test]
    fn test_stream_id_display() {
        assert_eq!(format!("{}", StreamId::new(7)), "#7");
        assert_eq!(format!("{:?}", StreamId::new(7)), "StreamId(7)");
    }

    #[test]
    fn test_account_id_serializes_as_plain_string() {
        let account = AccountId::from("bob");
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, "\"bob\"");

        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
