use crate::domain::ports::{WalletLease, WalletStore};
use crate::domain::wallet::{Wallet, WalletId};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A thread-safe in-memory wallet store.
///
/// Records live in a `DashMap` for fine-grained sharded access; exclusive
/// windows are per-wallet `tokio::sync::Mutex`es held through the returned
/// lease. Saves still compare versions, so a stale lease (or an external
/// writer in tests) surfaces as a conflict rather than a lost update.
///
/// `Clone` shares the underlying maps.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    records: Arc<DashMap<WalletId, Wallet>>,
    locks: Arc<DashMap<WalletId, Arc<Mutex<()>>>>,
}

impl InMemoryWalletStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn find_for_update(&self, id: WalletId) -> Result<Option<WalletLease>> {
        if !self.records.contains_key(&id) {
            return Ok(None);
        }

        let lock = self.locks.entry(id).or_default().clone();
        let permit = lock.lock_owned().await;

        // Re-read under the lock; the record may have moved on while waiting.
        match self.records.get(&id) {
            Some(record) => Ok(Some(WalletLease::new(record.value().clone(), Some(permit)))),
            None => Ok(None),
        }
    }

    async fn find(&self, id: WalletId) -> Result<Option<Wallet>> {
        Ok(self.records.get(&id).map(|record| record.value().clone()))
    }

    async fn exists(&self, id: WalletId) -> Result<bool> {
        Ok(self.records.contains_key(&id))
    }

    async fn insert_new(&self, wallet: Wallet) -> Result<Wallet> {
        match self.records.entry(wallet.id) {
            Entry::Occupied(_) => Err(WalletError::AlreadyExists(wallet.id)),
            Entry::Vacant(slot) => {
                slot.insert(wallet.clone());
                Ok(wallet)
            }
        }
    }

    async fn save(&self, lease: WalletLease) -> Result<Wallet> {
        let wallet = lease.wallet().clone();
        let updated = match self.records.get_mut(&wallet.id) {
            Some(mut stored) if stored.version == wallet.version => {
                let updated = Wallet {
                    version: wallet.version + 1,
                    ..wallet
                };
                *stored = updated.clone();
                updated
            }
            _ => return Err(WalletError::Conflict { wallet: wallet.id }),
        };
        // The lease (and its lock permit) is released only after the record
        // is committed.
        drop(lease);
        Ok(updated)
    }
}
