//! Stored-value wallets and their balance rules.
//!
//! A wallet's balance always lies in `[0, ceiling]`, where the ceiling is
//! fixed by its [`WalletType`]. All balance changes go through
//! [`Wallet::apply_delta`].

mod error;
mod types;

#[cfg(test)]
mod types_props;

pub use error::BalanceError;
pub use types::{IDENTIFIED_CEILING, UNIDENTIFIED_CEILING, Wallet, WalletRecord, WalletType};
