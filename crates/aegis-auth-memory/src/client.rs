//! In-memory OAuth client storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use aegis_auth::AuthResult;
use aegis_auth::credentials::verify_password;
use aegis_auth::error::AuthError;
use aegis_auth::storage::ClientStorage;
use aegis_auth::types::Client;

/// In-memory [`ClientStorage`] backed by a `RwLock<HashMap>`.
///
/// Client secrets are expected to be stored as Argon2 hashes;
/// `verify_secret` compares against the hash, never plaintext.
#[derive(Default)]
pub struct MemoryClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl MemoryClientStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns `true` if no clients are registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[async_trait]
impl ClientStorage for MemoryClientStorage {
    async fn create(&self, client: &Client) -> AuthResult<()> {
        client
            .validate()
            .map_err(|e| AuthError::storage(format!("Invalid client registration: {e}")))?;

        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.client_id) {
            return Err(AuthError::storage(format!(
                "Client '{}' already exists",
                client.client_id
            )));
        }
        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let clients = self.clients.read().await;
        let Some(client) = clients.get(client_id) else {
            return Ok(false);
        };
        let Some(ref hash) = client.client_secret else {
            return Ok(false);
        };

        verify_password(secret, hash).map_err(|e| {
            tracing::error!(client_id, error = %e, "Malformed client secret hash in storage");
            AuthError::internal("malformed client secret hash")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_auth::credentials::hash_password;
    use aegis_auth::types::GrantType;

    fn public_client(client_id: &str) -> Client {
        Client {
            client_id: client_id.to_string(),
            client_secret: None,
            name: "Test Client".to_string(),
            description: None,
            grant_types: vec![GrantType::AuthorizationCode],
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            scopes: vec![],
            confidential: false,
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = MemoryClientStorage::new();
        storage.create(&public_client("spa")).await.unwrap();

        let found = storage.find_by_client_id("spa").await.unwrap().unwrap();
        assert_eq!(found.name, "Test Client");
        assert!(storage.find_by_client_id("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_client_rejected() {
        let storage = MemoryClientStorage::new();
        storage.create(&public_client("spa")).await.unwrap();

        let result = storage.create(&public_client("spa")).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_invalid_registration_rejected() {
        let storage = MemoryClientStorage::new();
        let mut client = public_client("broken");
        client.redirect_uris.clear();

        let result = storage.create(&client).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_verify_secret() {
        let storage = MemoryClientStorage::new();
        let mut client = public_client("backend");
        client.confidential = true;
        client.client_secret = Some(hash_password("s3cret").unwrap());
        storage.create(&client).await.unwrap();

        assert!(storage.verify_secret("backend", "s3cret").await.unwrap());
        assert!(!storage.verify_secret("backend", "wrong").await.unwrap());
        // Unknown clients and public clients report false, not an error
        assert!(!storage.verify_secret("ghost", "s3cret").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_secret_public_client_is_false() {
        let storage = MemoryClientStorage::new();
        storage.create(&public_client("spa")).await.unwrap();
        assert!(!storage.verify_secret("spa", "anything").await.unwrap());
    }
}
