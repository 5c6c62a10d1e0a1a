//! Initial wallet ledger schema.
//!
//! Creates the wallet and transaction enums, the clients, wallets and
//! transactions tables, and the trigger that keeps transactions append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS
        // ============================================================
        db.execute_unprepared(APPEND_ONLY_TRIGGER_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Wallet identification tier
CREATE TYPE wallet_type AS ENUM ('IDENTIFIED', 'UNIDENTIFIED');

-- Transaction kind
CREATE TYPE transaction_type AS ENUM ('TOP_UP');
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    api_key VARCHAR(128) NOT NULL UNIQUE,
    secret_key VARCHAR(128) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_clients_active_key ON clients(api_key) WHERE active;
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_type wallet_type NOT NULL,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency VARCHAR(3) NOT NULL,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_wallet_balance_floor CHECK (balance >= 0),
    CONSTRAINT chk_wallet_balance_ceiling CHECK (
        (wallet_type = 'IDENTIFIED' AND balance <= 100000)
        OR (wallet_type = 'UNIDENTIFIED' AND balance <= 10000)
    ),
    CONSTRAINT chk_wallet_currency CHECK (currency ~ '^[A-Z]{3}$'),
    CONSTRAINT chk_wallet_version CHECK (version >= 0)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    wallet_id UUID NOT NULL REFERENCES wallets(id) ON DELETE RESTRICT,
    transaction_type transaction_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_transaction_amount_positive CHECK (amount > 0)
);

-- Wallet history, newest first
CREATE INDEX idx_transactions_wallet_created ON transactions(wallet_id, created_at DESC);

-- Monthly top-up aggregates
CREATE INDEX idx_transactions_wallet_type_created
    ON transactions(wallet_id, transaction_type, created_at);
";

const APPEND_ONLY_TRIGGER_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_transaction_modification
-- Recorded transactions are never updated
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_transaction_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Transactions are append-only.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_transaction_update
BEFORE UPDATE ON transactions
FOR EACH ROW
EXECUTE FUNCTION prevent_transaction_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_prevent_transaction_update ON transactions;
DROP FUNCTION IF EXISTS prevent_transaction_modification();

DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS clients CASCADE;

DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS wallet_type;
";
