use crate::domain::ports::{WalletLease, WalletStore};
use crate::domain::wallet::{Wallet, WalletId};
use crate::error::{Result, WalletError};
use async_trait::async_trait;
use dashmap::DashMap;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing wallet records.
pub const CF_WALLETS: &str = "wallets";

/// A persistent wallet store backed by RocksDB.
///
/// Records are stored as JSON under the wallet id. Exclusive windows use the
/// same per-wallet lock registry as the in-memory store; the version check on
/// save remains the conflict backstop for writers outside this registry.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>` and
/// lock registry).
#[derive(Clone)]
pub struct RocksDbWalletStore {
    db: Arc<DB>,
    locks: Arc<DashMap<WalletId, Arc<Mutex<()>>>>,
}

impl RocksDbWalletStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the wallets column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_wallets = ColumnFamilyDescriptor::new(CF_WALLETS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_wallets])?;

        Ok(Self {
            db: Arc::new(db),
            locks: Arc::new(DashMap::new()),
        })
    }

    fn read(&self, id: WalletId) -> Result<Option<Wallet>> {
        let cf = self.db.cf_handle(CF_WALLETS).ok_or_else(|| {
            WalletError::Internal(Box::new(std::io::Error::other(
                "wallets column family not found",
            )))
        })?;

        match self.db.get_cf(&cf, id.as_bytes())? {
            Some(bytes) => {
                let wallet = serde_json::from_slice(&bytes)
                    .map_err(|e| WalletError::Internal(Box::new(e)))?;
                Ok(Some(wallet))
            }
            None => Ok(None),
        }
    }

    fn write(&self, wallet: &Wallet) -> Result<()> {
        let cf = self.db.cf_handle(CF_WALLETS).ok_or_else(|| {
            WalletError::Internal(Box::new(std::io::Error::other(
                "wallets column family not found",
            )))
        })?;

        let value =
            serde_json::to_vec(wallet).map_err(|e| WalletError::Internal(Box::new(e)))?;
        self.db.put_cf(&cf, wallet.id.as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl WalletStore for RocksDbWalletStore {
    async fn find_for_update(&self, id: WalletId) -> Result<Option<WalletLease>> {
        if self.read(id)?.is_none() {
            return Ok(None);
        }

        let lock = self.locks.entry(id).or_default().clone();
        let permit = lock.lock_owned().await;

        match self.read(id)? {
            Some(record) => Ok(Some(WalletLease::new(record, Some(permit)))),
            None => Ok(None),
        }
    }

    async fn find(&self, id: WalletId) -> Result<Option<Wallet>> {
        self.read(id)
    }

    async fn exists(&self, id: WalletId) -> Result<bool> {
        let cf = self.db.cf_handle(CF_WALLETS).ok_or_else(|| {
            WalletError::Internal(Box::new(std::io::Error::other(
                "wallets column family not found",
            )))
        })?;
        Ok(self.db.get_pinned_cf(&cf, id.as_bytes())?.is_some())
    }

    async fn insert_new(&self, wallet: Wallet) -> Result<Wallet> {
        let lock = self.locks.entry(wallet.id).or_default().clone();
        let _permit = lock.lock_owned().await;

        if self.read(wallet.id)?.is_some() {
            return Err(WalletError::AlreadyExists(wallet.id));
        }
        self.write(&wallet)?;
        Ok(wallet)
    }

    async fn save(&self, lease: WalletLease) -> Result<Wallet> {
        let wallet = lease.wallet().clone();
        match self.read(wallet.id)? {
            Some(stored) if stored.version == wallet.version => {
                let updated = Wallet {
                    version: wallet.version + 1,
                    ..wallet
                };
                self.write(&updated)?;
                drop(lease);
                Ok(updated)
            }
            _ => Err(WalletError::Conflict { wallet: wallet.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_creates_column_family() {
        let dir = tempdir().unwrap();
        let store = RocksDbWalletStore::open(dir.path()).expect("failed to open RocksDB");
        assert!(store.db.cf_handle(CF_WALLETS).is_some());
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let dir = tempdir().unwrap();
        let store = RocksDbWalletStore::open(dir.path()).unwrap();

        let wallet = Wallet::new(WalletId::new_v4());
        store.insert_new(wallet.clone()).await.unwrap();

        let found = store.find(wallet.id).await.unwrap().unwrap();
        assert_eq!(found, wallet);
        assert!(store.exists(wallet.id).await.unwrap());

        let result = store.insert_new(wallet.clone()).await;
        assert!(matches!(result, Err(WalletError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = WalletId::new_v4();

        {
            let store = RocksDbWalletStore::open(dir.path()).unwrap();
            store.insert_new(Wallet::new(id)).await.unwrap();

            let mut lease = store.find_for_update(id).await.unwrap().unwrap();
            lease.wallet_mut().balance = dec!(75.00);
            store.save(lease).await.unwrap();
        }

        let store = RocksDbWalletStore::open(dir.path()).unwrap();
        let wallet = store.find(id).await.unwrap().unwrap();
        assert_eq!(wallet.balance, dec!(75.00));
        assert_eq!(wallet.version, 1);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let dir = tempdir().unwrap();
        let store = RocksDbWalletStore::open(dir.path()).unwrap();
        let id = WalletId::new_v4();
        store.insert_new(Wallet::new(id)).await.unwrap();

        let stale = store.find_for_update(id).await.unwrap().unwrap().wallet().clone();

        let lease = store.find_for_update(id).await.unwrap().unwrap();
        store.save(lease).await.unwrap();

        let result = store.save(WalletLease::new(stale, None)).await;
        assert!(matches!(result, Err(WalletError::Conflict { wallet }) if wallet == id));
    }
}
