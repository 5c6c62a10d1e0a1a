//! Storage port for wallets and their transactions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use ewallet_shared::types::{PageRequest, WalletId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::RepositoryError;
use crate::transaction::Transaction;
use crate::wallet::Wallet;

/// Half-open calendar-month window `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// First instant of the month.
    pub start: DateTime<Utc>,
    /// First instant of the following month.
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Returns the calendar month containing `instant`.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let first_day = instant.date_naive() - Days::new(u64::from(instant.day0()));
        let next_first_day = first_day + Months::new(1);
        Self {
            start: first_day.and_time(NaiveTime::MIN).and_utc(),
            end: next_first_day.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Returns true if `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Count and sum of a wallet's top-ups in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonthlyTopUpStats {
    /// Number of top-ups.
    pub count: u64,
    /// Total amount topped up.
    pub sum: Decimal,
}

/// Persistence operations the ledger service depends on.
///
/// `apply_top_up` is the only write path for balances. Implementations
/// must persist the balance change and the transaction record together or
/// not at all, and must refuse the write with `RepositoryError::Conflict`
/// if the stored wallet version differs from `wallet.version()`.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Returns true if a wallet with this id exists.
    async fn exists(&self, wallet_id: WalletId) -> Result<bool, RepositoryError>;

    /// Loads a wallet.
    async fn get_by_id(&self, wallet_id: WalletId) -> Result<Option<Wallet>, RepositoryError>;

    /// Persists a newly provisioned wallet.
    async fn create(&self, wallet: &Wallet) -> Result<(), RepositoryError>;

    /// Atomically stores the wallet's new balance and appends `transaction`.
    async fn apply_top_up(
        &self,
        wallet: &Wallet,
        transaction: &Transaction,
    ) -> Result<(), RepositoryError>;

    /// Count and sum of top-ups for a wallet inside `window`.
    async fn monthly_top_up_stats(
        &self,
        wallet_id: WalletId,
        window: MonthWindow,
    ) -> Result<MonthlyTopUpStats, RepositoryError>;

    /// Transactions of a wallet, newest first.
    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, RepositoryError>;
}

#[async_trait]
impl<T: LedgerRepository + ?Sized> LedgerRepository for Arc<T> {
    async fn ping(&self) -> Result<(), RepositoryError> {
        (**self).ping().await
    }

    async fn exists(&self, wallet_id: WalletId) -> Result<bool, RepositoryError> {
        (**self).exists(wallet_id).await
    }

    async fn get_by_id(&self, wallet_id: WalletId) -> Result<Option<Wallet>, RepositoryError> {
        (**self).get_by_id(wallet_id).await
    }

    async fn create(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        (**self).create(wallet).await
    }

    async fn apply_top_up(
        &self,
        wallet: &Wallet,
        transaction: &Transaction,
    ) -> Result<(), RepositoryError> {
        (**self).apply_top_up(wallet, transaction).await
    }

    async fn monthly_top_up_stats(
        &self,
        wallet_id: WalletId,
        window: MonthWindow,
    ) -> Result<MonthlyTopUpStats, RepositoryError> {
        (**self).monthly_top_up_stats(wallet_id, window).await
    }

    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        (**self).list_transactions(wallet_id, page).await
    }
}
