//! Wallet domain types.

use chrono::{DateTime, Utc};
use ewallet_shared::types::{Currency, WalletId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BalanceError;

/// Maximum balance of an identified wallet.
pub const IDENTIFIED_CEILING: i64 = 100_000;

/// Maximum balance of an unidentified wallet.
pub const UNIDENTIFIED_CEILING: i64 = 10_000;

/// Identification tier of a wallet. Fixed for the wallet's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletType {
    /// Owner identity has been verified.
    Identified,
    /// Anonymous wallet with a lower ceiling.
    Unidentified,
}

impl WalletType {
    /// Returns the maximum balance allowed for this tier.
    #[must_use]
    pub fn ceiling(self) -> Decimal {
        match self {
            Self::Identified => Decimal::from(IDENTIFIED_CEILING),
            Self::Unidentified => Decimal::from(UNIDENTIFIED_CEILING),
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identified => "IDENTIFIED",
            Self::Unidentified => "UNIDENTIFIED",
        }
    }
}

impl std::fmt::Display for WalletType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WalletType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDENTIFIED" => Ok(Self::Identified),
            "UNIDENTIFIED" => Ok(Self::Unidentified),
            _ => Err(format!("Unknown wallet type: {s}")),
        }
    }
}

/// Raw wallet state as read back from storage.
///
/// Repositories fill this in and hand it to [`Wallet::restore`], which
/// re-checks the balance range before the value is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletRecord {
    /// Wallet identifier.
    pub id: WalletId,
    /// Identification tier.
    pub wallet_type: WalletType,
    /// Stored balance.
    pub balance: Decimal,
    /// Wallet currency.
    pub currency: Currency,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A stored-value wallet.
///
/// The balance is private: the only way to change it is [`Wallet::apply_delta`],
/// which keeps it inside `[0, ceiling]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    id: WalletId,
    wallet_type: WalletType,
    balance: Decimal,
    currency: Currency,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Provisions a new empty wallet.
    #[must_use]
    pub fn new(wallet_type: WalletType, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new(),
            wallet_type,
            balance: Decimal::ZERO,
            currency,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a wallet from stored state.
    ///
    /// # Errors
    ///
    /// Returns `BalanceError::OutOfRange` if the stored balance is negative
    /// or above the ceiling of the stored tier.
    pub fn restore(record: WalletRecord) -> Result<Self, BalanceError> {
        let ceiling = record.wallet_type.ceiling();
        if record.balance < Decimal::ZERO || record.balance > ceiling {
            return Err(BalanceError::OutOfRange {
                balance: record.balance,
                ceiling,
            });
        }

        Ok(Self {
            id: record.id,
            wallet_type: record.wallet_type,
            balance: record.balance,
            currency: record.currency,
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Wallet identifier.
    #[must_use]
    pub const fn id(&self) -> WalletId {
        self.id
    }

    /// Identification tier.
    #[must_use]
    pub const fn wallet_type(&self) -> WalletType {
        self.wallet_type
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Wallet currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Version this wallet was loaded at. Repositories use it as the
    /// compare-and-swap token when persisting a balance change.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Maximum balance for this wallet's tier.
    #[must_use]
    pub fn ceiling(&self) -> Decimal {
        self.wallet_type.ceiling()
    }

    /// Adds a signed amount to the balance.
    ///
    /// On success the balance and `updated_at` change and the new balance is
    /// returned. On failure the wallet is left untouched.
    ///
    /// # Errors
    ///
    /// - `BalanceError::InsufficientFunds` if the result would be negative
    /// - `BalanceError::CeilingExceeded` if the result would exceed the ceiling
    pub fn apply_delta(&mut self, delta: Decimal) -> Result<Decimal, BalanceError> {
        let ceiling = self.ceiling();
        let overflowed = || {
            if delta.is_sign_positive() {
                BalanceError::CeilingExceeded {
                    balance: self.balance,
                    amount: delta,
                    ceiling,
                }
            } else {
                BalanceError::InsufficientFunds {
                    balance: self.balance,
                    amount: delta,
                }
            }
        };

        let new_balance = self.balance.checked_add(delta).ok_or_else(overflowed)?;

        if new_balance < Decimal::ZERO {
            return Err(BalanceError::InsufficientFunds {
                balance: self.balance,
                amount: delta,
            });
        }
        if new_balance > ceiling {
            return Err(BalanceError::CeilingExceeded {
                balance: self.balance,
                amount: delta,
                ceiling,
            });
        }

        self.balance = new_balance;
        self.updated_at = Utc::now();
        Ok(new_balance)
    }

    /// Advances the version after a successful compare-and-swap.
    pub(crate) fn mark_persisted(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn wallet_with(wallet_type: WalletType, balance: Decimal) -> Wallet {
        let now = Utc::now();
        Wallet::restore(WalletRecord {
            id: WalletId::new(),
            wallet_type,
            balance,
            currency: Currency::Tjs,
            version: 3,
            created_at: now,
            updated_at: now,
        })
        .unwrap()
    }

    #[rstest]
    #[case(WalletType::Identified, dec!(100000))]
    #[case(WalletType::Unidentified, dec!(10000))]
    fn test_ceiling_by_tier(#[case] wallet_type: WalletType, #[case] expected: Decimal) {
        assert_eq!(wallet_type.ceiling(), expected);
        assert_eq!(Wallet::new(wallet_type, Currency::Tjs).ceiling(), expected);
    }

    #[test]
    fn test_new_wallet_is_empty() {
        let wallet = Wallet::new(WalletType::Identified, Currency::Usd);
        assert_eq!(wallet.balance(), Decimal::ZERO);
        assert_eq!(wallet.version(), 0);
        assert_eq!(wallet.currency(), Currency::Usd);
        assert!(!wallet.id().is_nil());
    }

    #[test]
    fn test_unidentified_top_up_within_ceiling() {
        let mut wallet = wallet_with(WalletType::Unidentified, dec!(9000));
        assert_eq!(wallet.apply_delta(dec!(1000)).unwrap(), dec!(10000));
        assert_eq!(wallet.balance(), dec!(10000));
    }

    #[test]
    fn test_unidentified_top_up_over_ceiling() {
        let mut wallet = wallet_with(WalletType::Unidentified, dec!(9000));
        let err = wallet.apply_delta(dec!(1000.01)).unwrap_err();
        assert_eq!(
            err,
            BalanceError::CeilingExceeded {
                balance: dec!(9000),
                amount: dec!(1000.01),
                ceiling: dec!(10000),
            }
        );
        assert_eq!(wallet.balance(), dec!(9000));
    }

    #[test]
    fn test_identified_reaches_exact_ceiling() {
        let mut wallet = wallet_with(WalletType::Identified, dec!(99999.99));
        assert_eq!(wallet.apply_delta(dec!(0.01)).unwrap(), dec!(100000));
    }

    #[test]
    fn test_negative_delta_insufficient_funds() {
        let mut wallet = wallet_with(WalletType::Identified, dec!(50));
        let before = wallet.clone();
        let err = wallet.apply_delta(dec!(-50.0001)).unwrap_err();
        assert!(matches!(err, BalanceError::InsufficientFunds { .. }));
        assert_eq!(wallet, before);

        assert_eq!(wallet.apply_delta(dec!(-50)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_delta_is_rejected() {
        let mut wallet = wallet_with(WalletType::Identified, dec!(1));
        let err = wallet.apply_delta(Decimal::MAX).unwrap_err();
        assert!(matches!(err, BalanceError::CeilingExceeded { .. }));
        assert_eq!(wallet.balance(), dec!(1));
    }

    #[test]
    fn test_apply_delta_keeps_version() {
        let mut wallet = wallet_with(WalletType::Identified, dec!(10));
        wallet.apply_delta(dec!(5)).unwrap();
        assert_eq!(wallet.version(), 3);
        wallet.mark_persisted();
        assert_eq!(wallet.version(), 4);
    }

    #[rstest]
    #[case(WalletType::Unidentified, dec!(10000.0001))]
    #[case(WalletType::Identified, dec!(-1))]
    fn test_restore_rejects_out_of_range(#[case] wallet_type: WalletType, #[case] balance: Decimal) {
        let now = Utc::now();
        let result = Wallet::restore(WalletRecord {
            id: WalletId::new(),
            wallet_type,
            balance,
            currency: Currency::Tjs,
            version: 0,
            created_at: now,
            updated_at: now,
        });
        assert!(matches!(result, Err(BalanceError::OutOfRange { .. })));
    }

    #[test]
    fn test_wallet_type_parse() {
        assert_eq!(
            WalletType::from_str("IDENTIFIED").unwrap(),
            WalletType::Identified
        );
        assert_eq!(
            WalletType::from_str("UNIDENTIFIED").unwrap(),
            WalletType::Unidentified
        );
        assert!(WalletType::from_str("identified").is_err());
        assert_eq!(WalletType::Unidentified.to_string(), "UNIDENTIFIED");
    }
}
