use crate::domain::wallet::{Wallet, WalletId};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

/// An exclusively-held copy of a wallet record.
///
/// Produced by [`WalletStore::find_for_update`] and consumed by
/// [`WalletStore::save`]. The lease carries the lock permit for its wallet;
/// dropping the lease without saving releases the exclusive-access window and
/// discards the attempt. The embedded wallet keeps the version it was read
/// with, so a save against a record that moved on is detectable.
pub struct WalletLease {
    wallet: Wallet,
    _permit: Option<OwnedMutexGuard<()>>,
}

impl WalletLease {
    pub fn new(wallet: Wallet, permit: Option<OwnedMutexGuard<()>>) -> Self {
        Self {
            wallet,
            _permit: permit,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut Wallet {
        &mut self.wallet
    }
}

/// Storage contract for wallet records.
///
/// The store is the sole synchronization mechanism between concurrent
/// attempts: `find_for_update` opens an exclusive-access window scoped to the
/// subsequent `save`, and `save` must fail with `WalletError::Conflict` when
/// the record's version no longer matches the one read at acquisition.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Returns the current record under an exclusive-access window, or `None`
    /// if no wallet exists for the id.
    async fn find_for_update(&self, id: WalletId) -> Result<Option<WalletLease>>;

    /// Point-in-time read of the latest committed record, no locking.
    async fn find(&self, id: WalletId) -> Result<Option<Wallet>>;

    async fn exists(&self, id: WalletId) -> Result<bool>;

    /// Atomic create-if-absent. Fails with `WalletError::AlreadyExists` when
    /// the id is already registered; the existing record is left untouched.
    async fn insert_new(&self, wallet: Wallet) -> Result<Wallet>;

    /// Persists the leased record, incrementing its version. Fails with
    /// `WalletError::Conflict` if the stored version diverged from the one
    /// the lease was read with.
    async fn save(&self, lease: WalletLease) -> Result<Wallet>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;
