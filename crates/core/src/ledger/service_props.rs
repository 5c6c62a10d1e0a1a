//! Property-based tests for LedgerService.
//!
//! - Property 1: balance equals the sum of recorded top-ups
//! - Property 2: balance never leaves `[0, ceiling]`
//! - Property 3: every rejected top-up leaves balance and history untouched

use ewallet_shared::types::{Currency, PageRequest};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::memory::InMemoryLedgerRepository;
use super::repository::LedgerRepository;
use super::service::LedgerService;
use crate::wallet::{Wallet, WalletType};

/// Amounts from -100.0000 to 5,000.00000 with up to 5 decimals, so that
/// negative, zero and over-precise inputs all show up.
fn raw_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (-1_000_000i64..50_000_000i64).prop_map(|units| Decimal::new(units, 4)),
        (1i64..500_000_000i64).prop_map(|units| Decimal::new(units, 5)),
    ]
}

fn wallet_type_strategy() -> impl Strategy<Value = WalletType> {
    prop_oneof![Just(WalletType::Identified), Just(WalletType::Unidentified)]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_balance_matches_history(
        wallet_type in wallet_type_strategy(),
        amounts in prop::collection::vec(raw_amount(), 1..30),
    ) {
        let outcome: Result<(), TestCaseError> = runtime().block_on(async {
            let repo = InMemoryLedgerRepository::new();
            let wallet = Wallet::new(wallet_type, Currency::Tjs);
            repo.create(&wallet).await.unwrap();
            let service = LedgerService::new(repo.clone());

            for amount in amounts {
                let before = service.get_balance(wallet.id()).await.unwrap();
                let count_before = repo.transaction_count(wallet.id());

                match service.top_up(wallet.id(), amount).await {
                    Ok(tx) => {
                        prop_assert_eq!(tx.amount, amount);
                        prop_assert_eq!(
                            service.get_balance(wallet.id()).await.unwrap(),
                            before + amount
                        );
                    }
                    Err(LedgerError::InvalidAmount(_) | LedgerError::CeilingExceeded { .. }) => {
                        prop_assert_eq!(service.get_balance(wallet.id()).await.unwrap(), before);
                        prop_assert_eq!(repo.transaction_count(wallet.id()), count_before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {}", other),
                }

                let balance = service.get_balance(wallet.id()).await.unwrap();
                prop_assert!(balance >= Decimal::ZERO);
                prop_assert!(balance <= wallet_type.ceiling());
            }

            let history = service
                .transactions(wallet.id(), PageRequest::new(1, 100))
                .await
                .unwrap();
            let recorded: Decimal = history.iter().map(|tx| tx.signed_amount()).sum();
            prop_assert_eq!(service.get_balance(wallet.id()).await.unwrap(), recorded);
            Ok(())
        });
        outcome?;
    }
}
