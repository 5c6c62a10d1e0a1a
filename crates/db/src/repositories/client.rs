//! API client repository.

use async_trait::async_trait;
use chrono::Utc;
use ewallet_core::auth::{ClientCredentials, ClientSecretStore};
use ewallet_core::ledger::RepositoryError;
use ewallet_shared::types::ClientId;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::storage_error;
use crate::entities::clients;

/// A newly registered client with its generated credentials.
#[derive(Debug, Clone)]
pub struct RegisteredClient {
    /// Display name.
    pub name: String,
    /// Generated credentials.
    pub credentials: ClientCredentials,
}

/// Client repository for registration and secret lookup.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a random URL-safe key.
    #[must_use]
    pub fn generate_key() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    /// Registers an active client with a fresh API key and secret.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Duplicate` on an API key collision and
    /// `RepositoryError::Unavailable` if the insert fails.
    pub async fn register(&self, name: &str) -> Result<RegisteredClient, RepositoryError> {
        let now = Utc::now().into();
        let credentials = ClientCredentials {
            id: ClientId::new(),
            api_key: Self::generate_key(),
            secret_key: Self::generate_key(),
        };

        clients::ActiveModel {
            id: Set(credentials.id.into_inner()),
            name: Set(name.to_string()),
            api_key: Set(credentials.api_key.clone()),
            secret_key: Set(credentials.secret_key.clone()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(storage_error)?;

        Ok(RegisteredClient {
            name: name.to_string(),
            credentials,
        })
    }

    /// Deactivates a client. Returns false if no such client exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` if the update fails.
    pub async fn deactivate(&self, id: ClientId) -> Result<bool, RepositoryError> {
        let result = clients::Entity::update_many()
            .col_expr(
                clients::Column::Active,
                sea_orm::sea_query::Expr::value(false),
            )
            .col_expr(
                clients::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(clients::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl ClientSecretStore for ClientRepository {
    async fn find_active_by_api_key(
        &self,
        api_key: &str,
    ) -> Result<Option<ClientCredentials>, RepositoryError> {
        let client = clients::Entity::find()
            .filter(clients::Column::ApiKey.eq(api_key))
            .filter(clients::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(storage_error)?;

        Ok(client.map(|model| ClientCredentials {
            id: ClientId::from_uuid(model.id),
            api_key: model.api_key,
            secret_key: model.secret_key,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_url_safe_and_distinct() {
        let a = ClientRepository::generate_key();
        let b = ClientRepository::generate_key();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
