//! Schema migration runner for the wallet ledger database.
//!
//! Reads `DATABASE_URL` and accepts the standard sea-orm-migration commands:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the ledger schema
//!   migrator status  - List applied migrations
//!   migrator fresh   - Drop everything and re-apply

use ewallet_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    cli::run_cli(Migrator).await;
}
