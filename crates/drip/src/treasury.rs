//! Treasury: the external custodian that actually moves balances.
//!
//! The ledger never touches balances itself. It only instructs the treasury
//! to move an amount of an asset between accounts.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use drip_core::{AccountId, Amount, AssetId};
use thiserror::Error;

/// Errors a treasury can report for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The source account does not hold enough of the asset.
    #[error("insufficient {asset} balance in {account}: needed {needed}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        needed: Amount,
        available: Amount,
    },

    /// The treasury refused the transfer for any other reason.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Executes asset movements on the ledger's instruction.
///
/// A transfer either happens completely or not at all. An implementation may
/// call back into the ledger while a transfer is in flight.
#[async_trait]
pub trait Treasury: Send + Sync {
    async fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> std::result::Result<(), TransferError>;
}

/// In-memory treasury keyed by `(asset, account)`.
#[derive(Debug, Default)]
pub struct MemoryTreasury {
    balances: RwLock<HashMap<(AssetId, AccountId), Amount>>,
}

impl MemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `account` out of thin air.
    pub fn mint(&self, asset: &AssetId, account: &AccountId, amount: Amount) {
        let mut balances = self
            .balances
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *balances
            .entry((asset.clone(), account.clone()))
            .or_insert(0) += amount;
    }

    /// Current balance of `account` in `asset`.
    pub fn balance(&self, asset: &AssetId, account: &AccountId) -> Amount {
        let balances = self
            .balances
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        balances
            .get(&(asset.clone(), account.clone()))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl Treasury for MemoryTreasury {
    async fn transfer(
        &self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> std::result::Result<(), TransferError> {
        if amount <= 0 {
            return Err(TransferError::Rejected(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let mut balances = self
            .balances
            .write()
            .map_err(|e| TransferError::Rejected(format!("treasury lock poisoned: {}", e)))?;

        let available = balances
            .get(&(asset.clone(), from.clone()))
            .copied()
            .unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                account: from.clone(),
                asset: asset.clone(),
                needed: amount,
                available,
            });
        }

        balances.insert((asset.clone(), from.clone()), available - amount);
        *balances.entry((asset.clone(), to.clone())).or_insert(0) += amount;

        tracing::trace!(%asset, %from, %to, amount = %amount, "treasury transfer");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_treasury_transfer() {
        let treasury = MemoryTreasury::new();
        let dai = AssetId::from("DAI");
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");

        treasury.mint(&dai, &alice, 100);
        treasury.transfer(&dai, &alice, &bob, 40).await.unwrap();

        assert_eq!(treasury.balance(&dai, &alice), 60);
        assert_eq!(treasury.balance(&dai, &bob), 40);
    }

    #[tokio::test]
    async fn test_memory_treasury_insufficient_balance() {
        let treasury = MemoryTreasury::new();
        let dai = AssetId::from("DAI");
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");

        treasury.mint(&dai, &alice, 10);
        let err = treasury.transfer(&dai, &alice, &bob, 11).await.unwrap_err();

        assert_eq!(
            err,
            TransferError::InsufficientBalance {
                account: alice.clone(),
                asset: dai.clone(),
                needed: 11,
                available: 10,
            }
        );
        assert_eq!(treasury.balance(&dai, &alice), 10);
        assert_eq!(treasury.balance(&dai, &bob), 0);
    }

    #[tokio::test]
    async fn test_memory_treasury_assets_are_separate() {
        let treasury = MemoryTreasury::new();
        let alice = AccountId::from("alice");

        treasury.mint(&AssetId::from("DAI"), &alice, 10);
        assert_eq!(treasury.balance(&AssetId::from("USDC"), &alice), 0);
    }
}
