//! Ledger configuration.

use drip_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Treasury account that holds deposits until they are withdrawn.
    pub escrow_account: AccountId,
    /// Whether `create_stream` pulls the deposit from the sender into escrow.
    pub fund_on_create: bool,
    /// Whether mutating calls consult the authorizer.
    pub enforce_authorization: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            escrow_account: AccountId::new("drip:escrow"),
            fund_on_create: true,
            enforce_authorization: true,
        }
    }
}

impl LedgerConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| LedgerError::InvalidParameters(format!("ledger config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.escrow_account.as_str(), "drip:escrow");
        assert!(config.fund_on_create);
        assert!(config.enforce_authorization);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LedgerConfig::from_json(r#"{"fund_on_create": false}"#).unwrap();
        assert!(!config.fund_on_create);
        assert!(config.enforce_authorization);
        assert_eq!(config.escrow_account, LedgerConfig::default().escrow_account);
    }

    #[test]
    fn test_bad_json_is_invalid_parameters() {
        assert!(matches!(
            LedgerConfig::from_json("{not json"),
            Err(LedgerError::InvalidParameters(_))
        ));
    }
}
