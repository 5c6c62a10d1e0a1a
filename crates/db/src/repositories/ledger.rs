//! Postgres ledger repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use ewallet_core::ledger::{LedgerRepository, MonthWindow, MonthlyTopUpStats, RepositoryError};
use ewallet_core::transaction::Transaction;
use ewallet_core::wallet::{Wallet, WalletRecord};
use ewallet_shared::types::{Currency, PageRequest, TransactionId, WalletId};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, instrument};

use super::storage_error;
use crate::entities::sea_orm_active_enums::TransactionType;
use crate::entities::{transactions, wallets};

/// Aggregate row for the monthly top-up query.
#[derive(Debug, FromQueryResult)]
struct TopUpTotals {
    count: i64,
    sum: Option<Decimal>,
}

/// [`LedgerRepository`] backed by Postgres.
///
/// `apply_top_up` runs in one database transaction and guards the wallet
/// update with `WHERE version = <loaded version>`. Under READ COMMITTED a
/// concurrent writer blocks on the row lock and then sees zero matching rows,
/// which is reported as `RepositoryError::Conflict`.
#[derive(Debug, Clone)]
pub struct PgLedgerRepository {
    db: DatabaseConnection,
}

impl PgLedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn wallet_from_model(model: wallets::Model) -> Result<Wallet, RepositoryError> {
    let currency = Currency::from_str(&model.currency).map_err(RepositoryError::Corrupt)?;

    Wallet::restore(WalletRecord {
        id: WalletId::from_uuid(model.id),
        wallet_type: model.wallet_type.into(),
        balance: model.balance,
        currency,
        version: model.version,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
    .map_err(|e| RepositoryError::Corrupt(format!("wallet {}: {e}", model.id)))
}

fn transaction_from_model(model: transactions::Model) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        wallet_id: WalletId::from_uuid(model.wallet_id),
        transaction_type: model.transaction_type.into(),
        amount: model.amount,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl LedgerRepository for PgLedgerRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.db.ping().await.map_err(storage_error)
    }

    async fn exists(&self, wallet_id: WalletId) -> Result<bool, RepositoryError> {
        let count = wallets::Entity::find_by_id(wallet_id.into_inner())
            .count(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(count > 0)
    }

    async fn get_by_id(&self, wallet_id: WalletId) -> Result<Option<Wallet>, RepositoryError> {
        wallets::Entity::find_by_id(wallet_id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage_error)?
            .map(wallet_from_model)
            .transpose()
    }

    async fn create(&self, wallet: &Wallet) -> Result<(), RepositoryError> {
        wallets::ActiveModel {
            id: Set(wallet.id().into_inner()),
            wallet_type: Set(wallet.wallet_type().into()),
            balance: Set(wallet.balance()),
            currency: Set(wallet.currency().code().to_string()),
            version: Set(wallet.version()),
            created_at: Set(wallet.created_at().into()),
            updated_at: Set(wallet.updated_at().into()),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    #[instrument(skip_all, fields(wallet_id = %wallet.id(), version = wallet.version()))]
    async fn apply_top_up(
        &self,
        wallet: &Wallet,
        transaction: &Transaction,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await.map_err(storage_error)?;

        let updated = wallets::Entity::update_many()
            .col_expr(wallets::Column::Balance, Expr::value(wallet.balance()))
            .col_expr(wallets::Column::Version, Expr::value(wallet.version() + 1))
            .col_expr(wallets::Column::UpdatedAt, Expr::value(wallet.updated_at()))
            .filter(wallets::Column::Id.eq(wallet.id().into_inner()))
            .filter(wallets::Column::Version.eq(wallet.version()))
            .exec(&txn)
            .await
            .map_err(storage_error)?;

        if updated.rows_affected == 0 {
            txn.rollback().await.map_err(storage_error)?;
            debug!("Wallet version changed since load");
            return Err(RepositoryError::Conflict(wallet.id()));
        }

        transactions::ActiveModel {
            id: Set(transaction.id.into_inner()),
            wallet_id: Set(transaction.wallet_id.into_inner()),
            transaction_type: Set(transaction.transaction_type.into()),
            amount: Set(transaction.amount),
            description: Set(transaction.description.clone()),
            created_at: Set(transaction.created_at.into()),
            updated_at: Set(transaction.updated_at.into()),
        }
        .insert(&txn)
        .await
        .map_err(storage_error)?;

        txn.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn monthly_top_up_stats(
        &self,
        wallet_id: WalletId,
        window: MonthWindow,
    ) -> Result<MonthlyTopUpStats, RepositoryError> {
        let totals = transactions::Entity::find()
            .select_only()
            .column_as(
                SimpleExpr::from(Func::count(Expr::col(transactions::Column::Id))),
                "count",
            )
            .column_as(
                SimpleExpr::from(Func::sum(Expr::col(transactions::Column::Amount))),
                "sum",
            )
            .filter(transactions::Column::WalletId.eq(wallet_id.into_inner()))
            .filter(transactions::Column::TransactionType.eq(TransactionType::TopUp))
            .filter(transactions::Column::CreatedAt.gte(window.start))
            .filter(transactions::Column::CreatedAt.lt(window.end))
            .into_model::<TopUpTotals>()
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        let Some(totals) = totals else {
            return Ok(MonthlyTopUpStats::default());
        };

        Ok(MonthlyTopUpStats {
            count: u64::try_from(totals.count)
                .map_err(|_| RepositoryError::Corrupt(format!("negative count {}", totals.count)))?,
            sum: totals.sum.unwrap_or(Decimal::ZERO),
        })
    }

    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: PageRequest,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::WalletId.eq(wallet_id.into_inner()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(transaction_from_model).collect())
    }
}
