//! OAuth client storage trait.
//!
//! Defines the interface for client registration persistence. Registrations
//! are immutable during flow processing and looked up by identifier for
//! every authorize/token request.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage operations for OAuth client registrations.
///
/// # Example Implementation
///
/// ```ignore
/// use aegis_auth::storage::ClientStorage;
/// use aegis_auth::types::Client;
/// use aegis_auth::AuthResult;
///
/// struct InMemoryClientStorage {
///     clients: tokio::sync::RwLock<std::collections::HashMap<String, Client>>,
/// }
///
/// #[async_trait::async_trait]
/// impl ClientStorage for InMemoryClientStorage {
///     async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
///         Ok(self.clients.read().await.get(client_id).cloned())
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Registers a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if a client with the same `client_id` already
    /// exists or the storage operation fails.
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// Finds a client by its identifier.
    ///
    /// Returns `None` if the client is not registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a confidential client's secret.
    ///
    /// Compares the provided secret against the stored hash.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the secret matches
    /// - `Ok(false)` if the secret doesn't match, the client is unknown,
    ///   or the client has no secret
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
