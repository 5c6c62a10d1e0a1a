//! Request authentication for API clients.
//!
//! Each client holds an API key and a shared secret. A request carries the
//! API key and a hex HMAC-SHA256 digest of its raw body; the authenticator
//! looks the secret up and recomputes the digest.

mod digest;
mod memory;

pub use digest::{compute_digest, verify_digest};
pub use memory::InMemoryClientStore;

use async_trait::async_trait;
use ewallet_shared::AppError;
use ewallet_shared::types::ClientId;
use thiserror::Error;
use tracing::debug;

use crate::ledger::RepositoryError;

/// Credentials of a registered API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// Client identifier.
    pub id: ClientId,
    /// Public key sent with every request.
    pub api_key: String,
    /// Shared secret used to key request digests.
    pub secret_key: String,
}

/// Lookup of client secrets by API key.
#[async_trait]
pub trait ClientSecretStore: Send + Sync {
    /// Returns the credentials of the active client with this API key.
    async fn find_active_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ClientCredentials>, RepositoryError>;
}

#[async_trait]
impl<T: ClientSecretStore + ?Sized> ClientSecretStore for std::sync::Arc<T> {
    async fn find_active_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ClientCredentials>, RepositoryError> {
        (**self).find_active_by_api_key(api_key).await
    }
}

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// API key or digest was not supplied.
    #[error("Missing authentication headers")]
    MissingCredentials,

    /// No active client has this API key.
    #[error("Unknown client")]
    UnknownClient,

    /// The digest does not match the request body.
    #[error("Invalid request digest")]
    InvalidDigest,

    /// The secret could not key the MAC.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The client lookup failed.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::UnknownClient | AuthError::InvalidDigest => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::InvalidKey(_) => Self::Internal(err.to_string()),
            AuthError::Store(_) => Self::Database(err.to_string()),
        }
    }
}

/// Verifies request digests against a [`ClientSecretStore`].
#[derive(Debug, Clone)]
pub struct RequestAuthenticator<S> {
    store: S,
}

impl<S: ClientSecretStore> RequestAuthenticator<S> {
    /// Creates an authenticator over a secret store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Authenticates a request and returns the calling client's id.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if either header value is absent or blank
    /// - `AuthError::UnknownClient` if no active client has the API key
    /// - `AuthError::InvalidDigest` if the digest does not match `body`
    /// - `AuthError::Store` if the client lookup fails
    pub async fn authenticate(
        &self,
        api_key: Option<&str>,
        digest: Option<&str>,
        body: &[u8],
    ) -> Result<ClientId, AuthError> {
        let (Some(api_key), Some(digest)) = (
            api_key.filter(|v| !v.trim().is_empty()),
            digest.filter(|v| !v.trim().is_empty()),
        ) else {
            return Err(AuthError::MissingCredentials);
        };

        let client = self
            .store
            .find_active_by_api_key(api_key.trim())
            .await?
            .ok_or(AuthError::UnknownClient)?;

        if !verify_digest(client.secret_key.as_bytes(), body, digest)? {
            debug!(client_id = %client.id, "Request digest mismatch");
            return Err(AuthError::InvalidDigest);
        }

        Ok(client.id)
    }
}
