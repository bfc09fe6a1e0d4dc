//! In-memory authorization code storage.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use aegis_auth::AuthResult;
use aegis_auth::error::AuthError;
use aegis_auth::oauth::AuthorizationCode;
use aegis_auth::storage::AuthorizationCodeStorage;

/// In-memory [`AuthorizationCodeStorage`] backed by a `RwLock<HashMap>`.
///
/// `consume` performs its check-and-set under a single write lock, which
/// gives the one-success guarantee for concurrent exchanges of the same
/// code. A database backend would use a conditional `UPDATE ... WHERE
/// consumed_at IS NULL` checked by affected-row count instead.
#[derive(Default)]
pub struct MemoryAuthorizationCodeStorage {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl MemoryAuthorizationCodeStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored codes (consumed included).
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    /// Returns `true` if no codes are stored.
    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for MemoryAuthorizationCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        let mut codes = self.codes.write().await;
        if codes.contains_key(&code.code) {
            // 256-bit random values never collide in practice; a duplicate
            // means the caller reused a code value.
            return Err(AuthError::storage("Duplicate authorization code"));
        }
        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        Ok(self.codes.read().await.get(code).cloned())
    }

    async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode> {
        // Check-and-set under one write lock: the atomicity contract.
        let mut codes = self.codes.write().await;

        let record = codes
            .get_mut(code)
            .ok_or_else(|| AuthError::invalid_grant("Invalid authorization code"))?;

        if record.is_consumed() {
            return Err(AuthError::invalid_grant(
                "Authorization code has already been used",
            ));
        }

        record.consumed_at = Some(OffsetDateTime::now_utc());
        Ok(record.clone())
    }

    async fn delete(&self, code: &str) -> AuthResult<bool> {
        Ok(self.codes.write().await.remove(code).is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, c| !c.is_expired());
        Ok((before - codes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;
    use uuid::Uuid;

    fn test_code(value: &str, expires_in: Duration) -> AuthorizationCode {
        let now = OffsetDateTime::now_utc();
        AuthorizationCode {
            id: Uuid::new_v4(),
            code: value.to_string(),
            client_id: "test-client".to_string(),
            user_id: Uuid::new_v4(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid".to_string(),
            code_challenge: "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
            nonce: None,
            created_at: now,
            expires_at: now + expires_in,
            consumed_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = MemoryAuthorizationCodeStorage::new();
        storage
            .create(&test_code("code-1", Duration::minutes(5)))
            .await
            .unwrap();

        let found = storage.find_by_code("code-1").await.unwrap().unwrap();
        assert!(found.is_valid());
        assert!(storage.find_by_code("code-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_marks_used() {
        let storage = MemoryAuthorizationCodeStorage::new();
        storage
            .create(&test_code("code-1", Duration::minutes(5)))
            .await
            .unwrap();

        let consumed = storage.consume("code-1").await.unwrap();
        assert!(consumed.is_consumed());

        // Second consume fails closed
        let result = storage.consume("code-1").await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_consume_unknown_code() {
        let storage = MemoryAuthorizationCodeStorage::new();
        let result = storage.consume("ghost").await;
        assert!(matches!(result, Err(AuthError::InvalidGrant { .. })));
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = MemoryAuthorizationCodeStorage::new();
        storage
            .create(&test_code("code-1", Duration::minutes(5)))
            .await
            .unwrap();

        assert!(storage.delete("code-1").await.unwrap());
        assert!(!storage.delete("code-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = MemoryAuthorizationCodeStorage::new();
        storage
            .create(&test_code("fresh", Duration::minutes(5)))
            .await
            .unwrap();
        storage
            .create(&test_code("stale", Duration::minutes(-1)))
            .await
            .unwrap();

        let removed = storage.cleanup_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(storage.find_by_code("fresh").await.unwrap().is_some());
        assert!(storage.find_by_code("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let storage = MemoryAuthorizationCodeStorage::new();
        storage
            .create(&test_code("code-1", Duration::minutes(5)))
            .await
            .unwrap();

        let result = storage.create(&test_code("code-1", Duration::minutes(5))).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }
}
