//! `SeaORM` entity prelude.

pub use super::clients::Entity as Clients;
pub use super::transactions::Entity as Transactions;
pub use super::wallets::Entity as Wallets;
