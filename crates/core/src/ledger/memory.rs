//! In-memory ledger repository.
//!
//! Backs the service in tests and local runs. Compare-and-swap and the
//! paired transaction append happen while the wallet's map entry is held,
//! so concurrent writers to the same wallet serialize on that entry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ewallet_shared::types::{PageRequest, WalletId};

use super::error::RepositoryError;
use super::repository::{LedgerRepository, MonthWindow, MonthlyTopUpStats};
use crate::transaction::{Transaction, TransactionType};
use crate::wallet::Wallet;

#[derive(Debug, Default)]
struct Store {
    wallets: DashMap<WalletId, Wallet>,
    transactions: DashMap<WalletId, Vec<Transaction>>,
    fail_writes: AtomicBool,
    offline: AtomicBool,
    read_latency_us: AtomicU64,
}

/// Thread-safe in-memory [`LedgerRepository`].
///
/// Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerRepository {
    store: Arc<Store>,
}

impl InMemoryLedgerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `apply_top_up` fail with
    /// `RepositoryError::Unavailable` until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.store.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `ping` report the store as unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.store.offline.store(offline, Ordering::SeqCst);
    }

    /// Delays every read (`ping`, `exists`, `get_by_id`) by `latency`,
    /// widening the gap between loading a wallet and writing it back.
    pub fn set_read_latency(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.store.read_latency_us.store(micros, Ordering::SeqCst);
    }

    async fn simulate_read_latency(&self) {
        let micros = self.store.read_latency_us.load(Ordering::SeqCst);
        if micros > 0 {
            tokio::time::sleep(Duration::from_micros(micros)).await;
        }
    }

    /// Number of transactions recorded for a wallet.
    #[must_use]
    pub fn transaction_count(&self, wallet_id: WalletId) -> usize {
        self.store
            .transactions
            .get(&wallet_id)
            .map_or(0, |entries| entries.len())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.simulate_read_latency().await;
        if self.store.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }

    async fn exists(&self, wallet_id: WalletId) -> Result<bool, RepositoryError> {
        self.simulate_read_latency().await;
        Ok(self.store.wallets.contains_key(&wallet_id))
    }

    async fn get_by_id(&self, wallet_id: WalletId) -> Result<Option<Wallet>, RepositoryError> {
        self.simulate_read_latency().await;
        Ok(self
            .store
            .wallets
            .get(&wallet_id)
            .map(|wallet| wallet.value().clone()))
    }

    async fn create(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        match self.store.wallets.entry(wallet.id()) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(format!(
                "wallet {}",
                wallet.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(wallet.clone());
                Ok(())
            }
        }
    }

    async fn apply_top_up(
        &self,
        wallet: &Wallet,
        transaction: &Transaction,
    ) -> Result<(), RepositoryError> {
        let Some(mut stored) = self.store.wallets.get_mut(&wallet.id()) else {
            return Err(RepositoryError::Conflict(wallet.id()));
        };

        if stored.version() != wallet.version() {
            return Err(RepositoryError::Conflict(wallet.id()));
        }

        if self.store.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "write failure injected".to_string(),
            ));
        }

        let mut updated = wallet.clone();
        updated.mark_persisted();
        *stored = updated;

        self.store
            .transactions
            .entry(transaction.wallet_id)
            .or_default()
            .push(transaction.clone());

        Ok(())
    }

    async fn monthly_top_up_stats(
        &self,
        wallet_id: WalletId,
        window: MonthWindow,
    ) -> Result<MonthlyTopUpStats, RepositoryError> {
        let Some(entries) = self.store.transactions.get(&wallet_id) else {
            return Ok(MonthlyTopUpStats::default());
        };

        Ok(entries
            .iter()
            .filter(|tx| tx.transaction_type == TransactionType::TopUp)
            .filter(|tx| window.contains(tx.created_at))
            .fold(MonthlyTopUpStats::default(), |acc, tx| MonthlyTopUpStats {
                count: acc.count + 1,
                sum: acc.sum + tx.amount,
            }))
    }

    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let Some(entries) = self.store.transactions.get(&wallet_id) else {
            return Ok(Vec::new());
        };

        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(entries.iter().rev().skip(skip).take(take).cloned().collect())
    }
}
