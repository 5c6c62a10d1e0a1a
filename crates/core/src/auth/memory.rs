//! In-memory client secret store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ClientCredentials, ClientSecretStore};
use crate::ledger::RepositoryError;

/// [`ClientSecretStore`] keyed by API key. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClientStore {
    clients: Arc<DashMap<String, (ClientCredentials, bool)>>,
}

impl InMemoryClientStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an active client, replacing any client with the same key.
    pub fn insert(&self, credentials: ClientCredentials) {
        self.clients
            .insert(credentials.api_key.clone(), (credentials, true));
    }

    /// Marks a client inactive. Returns false if the key is unknown.
    pub fn deactivate(&self, api_key: &str) -> bool {
        match self.clients.get_mut(api_key) {
            Some(mut entry) => {
                entry.1 = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ClientSecretStore for InMemoryClientStore {
    async fn find_active_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ClientCredentials>, RepositoryError> {
        Ok(self
            .clients
            .get(api_key)
            .filter(|entry| entry.1)
            .map(|entry| entry.0.clone()))
    }
}
