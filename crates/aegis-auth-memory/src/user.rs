//! In-memory user storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use aegis_auth::AuthResult;
use aegis_auth::error::AuthError;
use aegis_auth::storage::{User, UserStorage};

/// In-memory [`UserStorage`] backed by a `RwLock<HashMap>`.
///
/// Keyed by username; ID lookups scan the map. Fine for the seed-scale
/// data a development server holds.
#[derive(Default)]
pub struct MemoryUserStorage {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == user_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(AuthError::storage(format!(
                "User '{}' already exists",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_auth::storage::UserBuilder;

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = MemoryUserStorage::new();
        let user = UserBuilder::new("alice").email("alice@example.com").build();

        storage.create(&user).await.unwrap();
        assert_eq!(storage.len().await, 1);

        let by_name = storage.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = storage.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let storage = MemoryUserStorage::new();
        assert!(storage.find_by_username("ghost").await.unwrap().is_none());
        assert!(storage.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let storage = MemoryUserStorage::new();
        storage
            .create(&UserBuilder::new("alice").build())
            .await
            .unwrap();

        let result = storage.create(&UserBuilder::new("alice").build()).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_username_lookup_is_case_sensitive() {
        let storage = MemoryUserStorage::new();
        storage
            .create(&UserBuilder::new("alice").build())
            .await
            .unwrap();

        assert!(storage.find_by_username("Alice").await.unwrap().is_none());
    }
}
