use crate::domain::operation::{Operation, OperationKind};
use crate::error::{Result, WalletError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique wallet identifier, the sole key for lookup and locking.
pub type WalletId = Uuid;

/// A positive monetary amount for deposit/withdraw operations.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules: amounts are at least one cent and carry at most two fraction digits.
/// Validation happens at construction, before any storage access.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        // Decimal::new(1, 2) == 0.01, the minimum representable unit
        if value < Decimal::new(1, 2) || value.normalize().scale() > 2 {
            Err(WalletError::InvalidAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = WalletError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// A monetary account record.
///
/// Holds identity, an exact decimal balance, and the concurrency token used by
/// the storage layer to detect lost-update races. The entity owns the
/// arithmetic invariants (`balance >= 0`, exact application of every
/// operation); persistence and locking belong to the store and the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Immutable unique identifier.
    pub id: WalletId,
    /// Current balance. Never negative after a committed operation.
    pub balance: Decimal,
    /// Concurrency token, incremented by the store on every successful save.
    pub version: u64,
}

impl Wallet {
    /// Creates a fresh wallet with a zero balance.
    pub fn new(id: WalletId) -> Self {
        Self {
            id,
            balance: Decimal::ZERO,
            version: 0,
        }
    }

    /// Adds funds. Never fails for a validated `Amount`.
    pub fn deposit(&mut self, amount: Amount) {
        self.balance += amount.value();
    }

    /// Removes funds if the balance covers them.
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        if amount.value() > self.balance {
            return Err(WalletError::InsufficientFunds {
                wallet: self.id,
                balance: self.balance,
                requested: amount.value(),
            });
        }
        self.balance -= amount.value();
        Ok(())
    }

    /// Applies an operation against this wallet's balance.
    ///
    /// The caller must hold exclusive access to the record for the duration of
    /// the attempt; this method only performs the arithmetic.
    pub fn apply(&mut self, operation: &Operation) -> Result<()> {
        match operation.kind {
            OperationKind::Deposit => {
                self.deposit(operation.amount);
                Ok(())
            }
            OperationKind::Withdraw => self.withdraw(operation.amount),
        }
    }
}

/// The `{wallet, balance}` shape returned to callers and serialized by the
/// CSV interface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalletView {
    pub wallet: WalletId,
    pub balance: Decimal,
}

impl From<&Wallet> for WalletView {
    fn from(wallet: &Wallet) -> Self {
        Self {
            wallet: wallet.id,
            balance: wallet.balance,
        }
    }
}
