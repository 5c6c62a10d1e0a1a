//! Ledger service: the use-cases exposed to clients.
//!
//! Every balance change is validated against the wallet's tier before it
//! reaches storage. Top-ups use optimistic concurrency: the wallet is
//! loaded, changed in memory and written back with a version check. A
//! version conflict reloads the wallet and tries again after a jittered
//! backoff, for as long as the [`RetryPolicy`] budget allows.

use chrono::Utc;
use ewallet_shared::types::{PageRequest, WalletId};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::error::{LedgerError, RepositoryError};
use super::repository::{LedgerRepository, MonthWindow, MonthlyTopUpStats};
use super::retry::RetryPolicy;
use crate::transaction::{Transaction, TransactionType};

/// Largest number of decimal places a top-up amount may carry.
pub const MAX_AMOUNT_SCALE: u32 = 4;

const TOP_UP_DESCRIPTION: &str = "Wallet top-up";

/// Wallet ledger use-cases over a [`LedgerRepository`].
#[derive(Debug, Clone)]
pub struct LedgerService<R> {
    repository: R,
    retry: RetryPolicy,
}

impl<R: LedgerRepository> LedgerService<R> {
    /// Creates a service with the default retry policy.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides how long a top-up keeps retrying version conflicts.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Checks that the backing store answers.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store is unreachable.
    pub async fn ping(&self) -> Result<(), LedgerError> {
        Ok(self.repository.ping().await?)
    }

    /// Returns true if the wallet exists.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the lookup fails.
    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn check_exists(&self, wallet_id: WalletId) -> Result<bool, LedgerError> {
        Ok(self.repository.exists(wallet_id).await?)
    }

    /// Credits `amount` to the wallet and records a top-up transaction.
    ///
    /// Both effects are persisted together or not at all. Concurrent top-ups
    /// of the same wallet all take effect; none is lost.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `amount` is not positive or has more
    ///   than [`MAX_AMOUNT_SCALE`] decimal places
    /// - `LedgerError::WalletNotFound` if the wallet does not exist
    /// - `LedgerError::CeilingExceeded` if the new balance would exceed the ceiling
    /// - `LedgerError::Storage` if storage fails, or keeps conflicting past
    ///   the retry budget
    #[instrument(skip(self), fields(wallet_id = %wallet_id, amount = %amount))]
    pub async fn top_up(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;

        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let mut wallet = self
                .repository
                .get_by_id(wallet_id)
                .await?
                .ok_or(LedgerError::WalletNotFound(wallet_id))?;

            let new_balance = wallet.apply_delta(amount)?;
            let transaction = Transaction::create(
                wallet.id(),
                TransactionType::TopUp,
                amount,
                TOP_UP_DESCRIPTION,
            )?;

            match self.repository.apply_top_up(&wallet, &transaction).await {
                Ok(()) => {
                    info!(
                        transaction_id = %transaction.id,
                        balance = %new_balance,
                        attempt,
                        "Wallet topped up"
                    );
                    return Ok(transaction);
                }
                Err(RepositoryError::Conflict(_)) if self.can_retry(started, attempt) => {
                    let delay = self.retry.backoff(attempt);
                    debug!(
                        attempt,
                        delay = ?delay,
                        "Concurrent wallet update, retrying top-up"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Top-up failed");
                    return Err(err.into());
                }
            }
        }
    }

    fn can_retry(&self, started: Instant, attempt: u32) -> bool {
        started.elapsed() + self.retry.backoff_ceiling(attempt) < self.retry.budget
    }

    /// Current balance of the wallet.
    ///
    /// # Errors
    ///
    /// - `LedgerError::WalletNotFound` if the wallet does not exist
    /// - `LedgerError::Storage` if the lookup fails
    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn get_balance(&self, wallet_id: WalletId) -> Result<Decimal, LedgerError> {
        let wallet = self
            .repository
            .get_by_id(wallet_id)
            .await?
            .ok_or(LedgerError::WalletNotFound(wallet_id))?;
        Ok(wallet.balance())
    }

    /// Count and sum of top-ups in the current UTC calendar month.
    ///
    /// A wallet with no top-ups this month, or no wallet at all, yields
    /// `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the query fails.
    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn monthly_top_up_stats(
        &self,
        wallet_id: WalletId,
    ) -> Result<MonthlyTopUpStats, LedgerError> {
        let window = MonthWindow::containing(Utc::now());
        Ok(self
            .repository
            .monthly_top_up_stats(wallet_id, window)
            .await?)
    }

    /// One page of the wallet's transactions, newest first.
    ///
    /// # Errors
    ///
    /// - `LedgerError::WalletNotFound` if the wallet does not exist
    /// - `LedgerError::Storage` if the query fails
    #[instrument(skip(self), fields(wallet_id = %wallet_id))]
    pub async fn transactions(
        &self,
        wallet_id: WalletId,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.ensure_exists(wallet_id).await?;
        Ok(self.repository.list_transactions(wallet_id, page).await?)
    }

    async fn ensure_exists(&self, wallet_id: WalletId) -> Result<(), LedgerError> {
        if self.repository.exists(wallet_id).await? {
            Ok(())
        } else {
            Err(LedgerError::WalletNotFound(wallet_id))
        }
    }
}

/// Checks that a top-up amount is positive with at most four decimal places.
///
/// # Errors
///
/// Returns `LedgerError::InvalidAmount` otherwise.
pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}
