//! Ledger error types.
//!
//! `RepositoryError` is what storage adapters report. `LedgerError` is what
//! the service reports to its callers, and maps onto `AppError` for the
//! outer layers.

use ewallet_shared::AppError;
use ewallet_shared::types::WalletId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::transaction::TransactionError;
use crate::wallet::BalanceError;

/// Errors reported by a ledger repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The wallet changed between load and write.
    #[error("Wallet {0} was modified concurrently")]
    Conflict(WalletId),

    /// A record with the same id already exists.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// The storage backend failed.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// No wallet exists with the given id.
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    // ========== Validation Errors ==========
    /// Top-up amount is not positive or has more than 4 decimal places.
    #[error("Invalid amount {0}: must be positive with at most 4 decimal places")]
    InvalidAmount(Decimal),

    // ========== Balance Rule Errors ==========
    /// The change would take the balance below zero.
    #[error("Insufficient funds: balance {balance}, change {amount}")]
    InsufficientFunds {
        /// Balance before the change.
        balance: Decimal,
        /// Requested signed change.
        amount: Decimal,
    },

    /// The change would take the balance above the tier ceiling.
    #[error("Balance would exceed maximum of {ceiling}: balance {balance}, change {amount}")]
    CeilingExceeded {
        /// Balance before the change.
        balance: Decimal,
        /// Requested signed change.
        amount: Decimal,
        /// Ceiling of the wallet's tier.
        ceiling: Decimal,
    },

    // ========== Storage Errors ==========
    /// Storage failed or kept conflicting. Safe to retry.
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<BalanceError> for LedgerError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InsufficientFunds { balance, amount } => {
                Self::InsufficientFunds { balance, amount }
            }
            BalanceError::CeilingExceeded {
                balance,
                amount,
                ceiling,
            } => Self::CeilingExceeded {
                balance,
                amount,
                ceiling,
            },
            BalanceError::OutOfRange { .. } => {
                Self::Storage(RepositoryError::Corrupt(err.to_string()))
            }
        }
    }
}

impl From<TransactionError> for LedgerError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::MissingWallet => {
                Self::Storage(RepositoryError::Corrupt(err.to_string()))
            }
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::WalletNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::InvalidAmount(_) => Self::Validation(err.to_string()),
            LedgerError::InsufficientFunds { .. } | LedgerError::CeilingExceeded { .. } => {
                Self::BusinessRule(err.to_string())
            }
            LedgerError::Storage(_) => Self::Database(err.to_string()),
        }
    }
}
