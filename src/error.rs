use crate::domain::wallet::WalletId;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet {0} not found")]
    NotFound(WalletId),

    #[error("insufficient funds in wallet {wallet}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        wallet: WalletId,
        balance: Decimal,
        requested: Decimal,
    },

    #[error("invalid amount {0}: must be at least 0.01 with at most two decimal places")]
    InvalidAmount(Decimal),

    #[error("operation on wallet {0} requires an amount")]
    MissingAmount(WalletId),

    #[error("wallet {0} already exists")]
    AlreadyExists(WalletId),

    /// The record changed underneath an in-flight attempt. The coordinator
    /// retries these; every other variant is terminal.
    #[error("write conflict on wallet {wallet}")]
    Conflict { wallet: WalletId },

    #[error("operation on wallet {wallet} abandoned after {attempts} conflicting attempts")]
    Contention { wallet: WalletId, attempts: u32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    Rocks(#[from] rocksdb::Error),

    #[error("storage error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl WalletError {
    /// Whether the retry loop may re-attempt after this error.
    pub fn is_conflict(&self) -> bool {
        matches!(self, WalletError::Conflict { .. })
    }
}
