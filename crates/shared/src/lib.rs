//! Shared types, errors, and configuration for ewallet.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for wallets, transactions and API clients
//! - Supported currency codes
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig, ServerConfig};
pub use error::AppError;
