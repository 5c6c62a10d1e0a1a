//! Request middleware.

pub mod digest;

pub use digest::digest_middleware;
