//! Common types used across the application.

pub mod currency;
pub mod id;
pub mod pagination;

pub use currency::Currency;
pub use id::*;
pub use pagination::PageRequest;
