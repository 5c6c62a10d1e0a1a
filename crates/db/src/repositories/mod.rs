//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Both implement ports defined in `ewallet-core`, so errors are reported as
//! `RepositoryError`.

pub mod client;
pub mod ledger;

pub use client::{ClientRepository, RegisteredClient};
pub use ledger::PgLedgerRepository;

use ewallet_core::ledger::RepositoryError;
use sea_orm::{DbErr, SqlErr};

/// Maps a `SeaORM` error onto the repository error taxonomy.
pub(crate) fn storage_error(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Duplicate(detail),
        _ => RepositoryError::Unavailable(err.to_string()),
    }
}
