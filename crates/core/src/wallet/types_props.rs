//! Property-based tests for wallet balance rules.
//!
//! - Property 1: the balance never leaves `[0, ceiling]`
//! - Property 2: a rejected change leaves the wallet untouched
//! - Property 3: an accepted change moves the balance by exactly the delta

use ewallet_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{BalanceError, Wallet, WalletType};

/// Signed deltas between -20,000.0000 and 20,000.0000 with up to 4 decimals.
fn signed_delta() -> impl Strategy<Value = Decimal> {
    (-200_000_000i64..200_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

fn wallet_type_strategy() -> impl Strategy<Value = WalletType> {
    prop_oneof![Just(WalletType::Identified), Just(WalletType::Unidentified)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_balance_stays_in_range(
        wallet_type in wallet_type_strategy(),
        deltas in prop::collection::vec(signed_delta(), 1..50),
    ) {
        let mut wallet = Wallet::new(wallet_type, Currency::Tjs);
        for delta in deltas {
            let _ = wallet.apply_delta(delta);
            prop_assert!(wallet.balance() >= Decimal::ZERO);
            prop_assert!(wallet.balance() <= wallet.ceiling());
        }
    }

    #[test]
    fn prop_apply_delta_is_exact_or_untouched(
        wallet_type in wallet_type_strategy(),
        deltas in prop::collection::vec(signed_delta(), 1..50),
    ) {
        let mut wallet = Wallet::new(wallet_type, Currency::Tjs);
        for delta in deltas {
            let before = wallet.clone();
            match wallet.apply_delta(delta) {
                Ok(new_balance) => {
                    prop_assert_eq!(new_balance, before.balance() + delta);
                    prop_assert_eq!(wallet.balance(), new_balance);
                }
                Err(BalanceError::InsufficientFunds { .. }) => {
                    prop_assert!(before.balance() + delta < Decimal::ZERO);
                    prop_assert_eq!(&wallet, &before);
                }
                Err(BalanceError::CeilingExceeded { .. }) => {
                    prop_assert!(before.balance() + delta > before.ceiling());
                    prop_assert_eq!(&wallet, &before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}
