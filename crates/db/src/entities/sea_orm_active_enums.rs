//! `SeaORM` active enums mirroring the Postgres enum types.

use ewallet_core::{transaction, wallet};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_type")]
pub enum WalletType {
    #[sea_orm(string_value = "IDENTIFIED")]
    Identified,
    #[sea_orm(string_value = "UNIDENTIFIED")]
    Unidentified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "TOP_UP")]
    TopUp,
}

impl From<WalletType> for wallet::WalletType {
    fn from(value: WalletType) -> Self {
        match value {
            WalletType::Identified => Self::Identified,
            WalletType::Unidentified => Self::Unidentified,
        }
    }
}

impl From<wallet::WalletType> for WalletType {
    fn from(value: wallet::WalletType) -> Self {
        match value {
            wallet::WalletType::Identified => Self::Identified,
            wallet::WalletType::Unidentified => Self::Unidentified,
        }
    }
}

impl From<TransactionType> for transaction::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::TopUp => Self::TopUp,
        }
    }
}

impl From<transaction::TransactionType> for TransactionType {
    fn from(value: transaction::TransactionType) -> Self {
        match value {
            transaction::TransactionType::TopUp => Self::TopUp,
        }
    }
}
