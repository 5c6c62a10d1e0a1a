//! Append-only wallet transaction records.

use chrono::{DateTime, Utc};
use ewallet_shared::types::{TransactionId, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of balance movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Funds credited to the wallet.
    TopUp,
}

impl TransactionType {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopUp => "TOP_UP",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TOP_UP" => Ok(Self::TopUp),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// Errors from building a transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The wallet reference is the nil id.
    #[error("Transaction must reference a wallet")]
    MissingWallet,
}

/// A recorded balance movement.
///
/// Records are created once through [`Transaction::create`] and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identifier.
    pub id: TransactionId,
    /// Wallet the movement applies to.
    pub wallet_id: WalletId,
    /// Kind of movement.
    pub transaction_type: TransactionType,
    /// Magnitude of the movement, always positive.
    pub amount: Decimal,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Equal to `created_at`, kept for storage symmetry.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a new transaction with a fresh id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::MissingWallet` if `wallet_id` is nil.
    pub fn create(
        wallet_id: WalletId,
        transaction_type: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Result<Self, TransactionError> {
        if wallet_id.is_nil() {
            return Err(TransactionError::MissingWallet);
        }

        let now = Utc::now();
        Ok(Self {
            id: TransactionId::new(),
            wallet_id,
            transaction_type,
            amount,
            description: description.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The amount with the sign of its effect on the wallet balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::TopUp => self.amount,
        }
    }
}
