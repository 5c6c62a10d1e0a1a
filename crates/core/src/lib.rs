//! Core business logic for ewallet.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached through the repository traits defined here.
//!
//! # Modules
//!
//! - `wallet` - Wallet tiers, ceilings and the balance invariant
//! - `transaction` - Append-only transaction records
//! - `ledger` - Repository port and the ledger service
//! - `auth` - API client digest authentication

pub mod auth;
pub mod ledger;
pub mod transaction;
pub mod wallet;
