//! Development data seeder for ewallet.
//!
//! Registers three API clients, gives each an identified and an unidentified
//! TJS wallet, and credits every wallet with a handful of random top-ups
//! through the ledger service. Client credentials are printed so requests can
//! be signed against the seeded data.
//!
//! Usage: cargo run --bin seeder

use ewallet_core::ledger::{LedgerRepository, LedgerService, RetryPolicy};
use ewallet_core::wallet::{Wallet, WalletType};
use ewallet_db::{ClientRepository, PgLedgerRepository, RegisteredClient};
use ewallet_shared::AppConfig;
use ewallet_shared::types::Currency;
use rust_decimal::Decimal;

const CLIENT_NAMES: [&str; 3] = ["Client 1", "Client 2", "Client 3"];

/// Largest seeded top-up, in hundredths.
const MAX_TOP_UP_CENTS: i64 = 100_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    println!("Connecting to database...");
    let db = ewallet_db::connect(&config.database).await?;

    let clients = ClientRepository::new(db.clone());
    let ledger = LedgerService::new(PgLedgerRepository::new(db))
        .with_retry_policy(RetryPolicy::with_budget(config.ledger.top_up_retry_budget()));

    println!("Seeding clients...");
    let mut registered = Vec::with_capacity(CLIENT_NAMES.len());
    for name in CLIENT_NAMES {
        registered.push(clients.register(name).await?);
    }

    println!("Seeding wallets and top-ups...");
    let mut wallet_count = 0;
    let mut top_up_count = 0;
    for client in &registered {
        for wallet_type in [WalletType::Identified, WalletType::Unidentified] {
            let wallet = Wallet::new(wallet_type, Currency::Tjs);
            ledger.repository().create(&wallet).await?;
            wallet_count += 1;

            for _ in 0..rand::random_range(1..=10) {
                ledger.top_up(wallet.id(), random_amount()).await?;
                top_up_count += 1;
            }

            let balance = ledger.get_balance(wallet.id()).await?;
            println!(
                "  {} wallet {} for {}: balance {balance}",
                wallet_type, wallet.id(), client.name
            );
        }
    }

    println!("Seeded {} clients, {wallet_count} wallets, {top_up_count} top-ups", registered.len());
    print_credentials(&registered);
    println!("Seeding complete!");
    Ok(())
}

/// A random amount between 0.01 and 1000.00.
fn random_amount() -> Decimal {
    Decimal::new(rand::random_range(1..=MAX_TOP_UP_CENTS), 2)
}

fn print_credentials(clients: &[RegisteredClient]) {
    println!();
    println!("Client credentials (send the API key as X-UserId):");
    for client in clients {
        println!("  {}", client.name);
        println!("    id:         {}", client.credentials.id);
        println!("    api key:    {}", client.credentials.api_key);
        println!("    secret key: {}", client.credentials.secret_key);
    }
}
