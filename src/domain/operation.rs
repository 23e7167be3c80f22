use crate::domain::wallet::{Amount, WalletId};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Deposit => write!(f, "deposit"),
            OperationKind::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// A single balance mutation request against one wallet.
///
/// Operations are ephemeral: they carry no identity beyond arrival order and
/// are never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operation {
    pub wallet: WalletId,
    pub kind: OperationKind,
    pub amount: Amount,
}

impl Operation {
    /// Builds an operation, validating the raw amount.
    pub fn new(wallet: WalletId, kind: OperationKind, amount: Decimal) -> Result<Self> {
        Ok(Self {
            wallet,
            kind,
            amount: Amount::new(amount)?,
        })
    }
}
