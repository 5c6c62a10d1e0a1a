//! Balance rule violations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised when a balance change would break the wallet's range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
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

    /// A stored balance lies outside `[0, ceiling]`.
    #[error("Stored balance {balance} is outside [0, {ceiling}]")]
    OutOfRange {
        /// The stored balance.
        balance: Decimal,
        /// Ceiling of the stored tier.
        ceiling: Decimal,
    },
}
