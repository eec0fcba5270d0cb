//! Pre-flight balance check for transactions

use crate::chain::BalanceQuery;
use crate::error::TransportError;
use crate::types::{AccountId, Balance};

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceCheckError {
    #[error("Insufficient balance for {account}: have {balance:?}, attached value {value:?}")]
    BelowMinimum {
        account: AccountId,
        balance: Option<Balance>,
        value: Option<Balance>,
    },

    #[error("Balance query failed: {0}")]
    Query(#[from] TransportError),
}

/// Rejects attempts the sender cannot pay for, before any gas is estimated
pub struct BalanceGuard {
    balances: Arc<dyn BalanceQuery>,
}

impl BalanceGuard {
    pub fn new(balances: Arc<dyn BalanceQuery>) -> Self {
        Self { balances }
    }

    /// Check that `account` can attach `value`, returning its reducible balance.
    ///
    /// The balance must be non-zero and strictly greater than the attached
    /// value, so the transfer never drains the account.
    pub async fn check(
        &self,
        account: &AccountId,
        value: Option<Balance>,
    ) -> Result<Balance, BalanceCheckError> {
        let balance = self.balances.reducible_balance(account).await?;
        debug!("Reducible balance of {}: {:?}", account, balance);

        match balance {
            Some(available) if available > 0 && value.map_or(true, |v| available > v) => {
                Ok(available)
            }
            _ => {
                warn!(
                    "Balance of {} ({:?}) does not cover attached value {:?}",
                    account, balance, value
                );
                Err(BalanceCheckError::BelowMinimum {
                    account: account.clone(),
                    balance,
                    value,
                })
            }
        }
    }
}
