//! In-memory refresh token storage.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use aegis_auth::AuthResult;
use aegis_auth::error::AuthError;
use aegis_auth::storage::RefreshTokenStorage;
use aegis_auth::types::RefreshToken;

/// In-memory [`RefreshTokenStorage`] backed by a `RwLock<HashMap>`.
///
/// Keyed by token hash. `consume` is a check-and-set under one write lock,
/// so concurrent rotations of the same token yield exactly one success.
#[derive(Default)]
pub struct MemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records (revoked included).
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStorage for MemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(AuthError::storage("Duplicate refresh token hash"));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn consume(&self, token_hash: &str) -> AuthResult<RefreshToken> {
        // Revoke-if-active under one write lock: the rotation atomicity
        // contract.
        let mut tokens = self.tokens.write().await;

        let token = tokens
            .get_mut(token_hash)
            .ok_or_else(|| AuthError::invalid_grant("Invalid refresh token"))?;

        if token.is_revoked() {
            return Err(AuthError::invalid_grant("Refresh token has been revoked"));
        }

        token.revoked_at = Some(OffsetDateTime::now_utc());
        Ok(token.clone())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<bool> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_hash) {
            Some(token) if !token.is_revoked() => {
                token.revoked_at = Some(OffsetDateTime::now_utc());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0u64;
        for token in tokens.values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(OffsetDateTime::now_utc());
                count += 1;
            }
        }
        Ok(count)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired() && !t.is_revoked());
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn test_token(value: &str, user_id: Uuid, expires_in: Duration) -> RefreshToken {
        let now = OffsetDateTime::now_utc();
        RefreshToken {
            id: Uuid::new_v4(),
            token_hash: RefreshToken::hash_token(value),
            client_id: "test-client".to_string(),
            user_id,
            scope: "openid".to_string(),
            created_at: now,
            expires_at: now + expires_in,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_hash() {
        let storage = MemoryRefreshTokenStorage::new();
        let token = test_token("token-1", Uuid::new_v4(), Duration::days(30));
        storage.create(&token).await.unwrap();

        let hash = RefreshToken::hash_token("token-1");
        let found = storage.find_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(found.id, token.id);
        assert!(found.is_valid());
    }

    #[tokio::test]
    async fn test_consume_revokes() {
        let storage = MemoryRefreshTokenStorage::new();
        let token = test_token("token-1", Uuid::new_v4(), Duration::days(30));
        storage.create(&token).await.unwrap();

        let hash = RefreshToken::hash_token("token-1");
        let consumed = storage.consume(&hash).await.unwrap();
        assert!(consumed.is_revoked());

        // Consuming again fails closed (rotation replay)
        let result = storage.consume(&hash).await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let storage = MemoryRefreshTokenStorage::new();
        let token = test_token("token-1", Uuid::new_v4(), Duration::days(30));
        storage.create(&token).await.unwrap();

        let hash = RefreshToken::hash_token("token-1");
        assert!(storage.revoke(&hash).await.unwrap());
        assert!(!storage.revoke(&hash).await.unwrap());
        assert!(!storage.revoke("unknown-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_revoke_by_user() {
        let storage = MemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();
        storage
            .create(&test_token("a", user, Duration::days(30)))
            .await
            .unwrap();
        storage
            .create(&test_token("b", user, Duration::days(30)))
            .await
            .unwrap();
        storage
            .create(&test_token("c", Uuid::new_v4(), Duration::days(30)))
            .await
            .unwrap();

        let revoked = storage.revoke_by_user(user).await.unwrap();
        assert_eq!(revoked, 2);

        // The other user's token is untouched
        let hash_c = RefreshToken::hash_token("c");
        assert!(storage.find_by_hash(&hash_c).await.unwrap().unwrap().is_valid());
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_and_revoked() {
        let storage = MemoryRefreshTokenStorage::new();
        let user = Uuid::new_v4();
        storage
            .create(&test_token("live", user, Duration::days(30)))
            .await
            .unwrap();
        storage
            .create(&test_token("expired", user, Duration::minutes(-1)))
            .await
            .unwrap();
        storage
            .create(&test_token("revoked", user, Duration::days(30)))
            .await
            .unwrap();
        storage
            .revoke(&RefreshToken::hash_token("revoked"))
            .await
            .unwrap();

        let removed = storage.cleanup_expired().await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(storage.len().await, 1);
    }
}
