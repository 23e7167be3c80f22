use crate::domain::operation::Operation;
use crate::domain::ports::WalletStoreBox;
use crate::domain::wallet::{Wallet, WalletId, WalletView};
use crate::error::{Result, WalletError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Bounds for the coordinator's retry loop.
///
/// Defaults mirror the storage-conflict policy the engine is specified
/// against: three total attempts with exponential backoff starting at 100ms
/// (100, 200, 400). Each attempt's lock acquisition is additionally bounded
/// by `attempt_timeout`; a timed-out acquisition counts as a conflict.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based), doubling each
    /// retry.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.saturating_sub(1))
    }
}

/// The lock-and-retry coordinator.
///
/// Makes a single balance mutation appear atomic to all concurrent callers of
/// the same wallet: exclusive access comes from the storage port, detected
/// write conflicts become transparent bounded retries, and domain errors
/// propagate immediately without burning retry attempts.
pub struct WalletService {
    store: WalletStoreBox,
    retry: RetryPolicy,
}

impl WalletService {
    pub fn new(store: WalletStoreBox) -> Self {
        Self::with_retry_policy(store, RetryPolicy::default())
    }

    pub fn with_retry_policy(store: WalletStoreBox, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Applies a DEPOSIT or WITHDRAW against its wallet and returns the
    /// resulting balance.
    ///
    /// Only the storage-level "record changed underneath me" signal re-enters
    /// the loop; `WalletNotFound` and domain rejections are terminal on the
    /// first attempt they surface. Exhausting the attempt budget on conflicts
    /// yields `WalletError::Contention`, the caller's cue to resubmit.
    pub async fn process_operation(&self, operation: Operation) -> Result<WalletView> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt_operation(&operation).await {
                Ok(view) => {
                    info!(
                        wallet = %operation.wallet,
                        kind = %operation.kind,
                        amount = %operation.amount.value(),
                        balance = %view.balance,
                        "operation applied"
                    );
                    return Ok(view);
                }
                Err(err) if err.is_conflict() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        wallet = %operation.wallet,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "write conflict, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_conflict() => {
                    error!(
                        wallet = %operation.wallet,
                        attempts = attempt,
                        "retry budget exhausted under contention"
                    );
                    return Err(WalletError::Contention {
                        wallet: operation.wallet,
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One acquire-mutate-save cycle. Dropping the lease on any failure path
    /// releases the exclusive window.
    async fn attempt_operation(&self, operation: &Operation) -> Result<WalletView> {
        let lease = tokio::time::timeout(
            self.retry.attempt_timeout,
            self.store.find_for_update(operation.wallet),
        )
        .await
        .map_err(|_| WalletError::Conflict {
            wallet: operation.wallet,
        })??;

        let Some(mut lease) = lease else {
            return Err(WalletError::NotFound(operation.wallet));
        };

        lease.wallet_mut().apply(operation)?;
        let saved = self.store.save(lease).await?;
        Ok(WalletView::from(&saved))
    }

    /// Non-exclusive read of the latest committed balance.
    pub async fn get_balance(&self, id: WalletId) -> Result<WalletView> {
        match self.store.find(id).await? {
            Some(wallet) => Ok(WalletView::from(&wallet)),
            None => Err(WalletError::NotFound(id)),
        }
    }

    /// Registers a new wallet with a zero balance, exactly once per id.
    pub async fn create_wallet(&self, id: WalletId) -> Result<WalletView> {
        if self.store.exists(id).await? {
            return Err(WalletError::AlreadyExists(id));
        }
        let wallet = self.store.insert_new(Wallet::new(id)).await?;
        info!(wallet = %id, "wallet created");
        Ok(WalletView::from(&wallet))
    }
}
