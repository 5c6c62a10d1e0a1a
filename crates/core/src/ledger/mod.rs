//! Wallet ledger: balance changes, their persistence port and the service
//! that coordinates them.
//!
//! - `repository` - Storage port and monthly statistics types
//! - `memory` - In-memory repository for tests and local runs
//! - `retry` - Backoff policy for conflicting top-ups
//! - `service` - Use-cases: existence check, top-up, balance, statistics
//! - `error` - Service and repository error types

pub mod error;
pub mod memory;
pub mod repository;
pub mod retry;
pub mod service;

#[cfg(test)]
mod service_props;

pub use error::{LedgerError, RepositoryError};
pub use memory::InMemoryLedgerRepository;
pub use repository::{LedgerRepository, MonthWindow, MonthlyTopUpStats};
pub use retry::{DEFAULT_TOP_UP_RETRY_BUDGET, RetryPolicy};
pub use service::{LedgerService, MAX_AMOUNT_SCALE, validate_amount};
