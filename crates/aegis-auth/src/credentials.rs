//! Resource-owner credential verification.
//!
//! This module provides Argon2id-based password hashing and the
//! [`CredentialVerifier`] used by the login flow.
//!
//! # Security
//!
//! - Hashing uses Argon2id (hybrid mode) with default parameters
//! - Salts are generated using OsRng (cryptographically secure RNG)
//! - Authentication does not distinguish "unknown user" from "wrong
//!   password", preventing username enumeration

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthResult;
use crate::storage::{User, UserStorage};

/// Hash a password for secure storage using Argon2id.
///
/// Uses a cryptographically secure random salt and the default Argon2id
/// parameters, producing a PHC string suitable for database storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
///
/// # Example
///
/// ```
/// use aegis_auth::credentials::hash_password;
///
/// let hash = hash_password("correct horse battery staple").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// # Returns
///
/// `Ok(true)` if the password matches the hash, `Ok(false)` if it doesn't.
/// Returns `Err` only if the hash format itself is invalid.
///
/// # Example
///
/// ```
/// use aegis_auth::credentials::{hash_password, verify_password};
///
/// let hash = hash_password("secret").unwrap();
/// assert!(verify_password("secret", &hash).unwrap());
/// assert!(!verify_password("wrong", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Authenticates resource owners against stored password hashes.
///
/// A single synchronous check per attempt; no retries, no lockout. The
/// caller decides how to render the failure (the login form re-renders
/// with a generic message).
pub struct CredentialVerifier {
    user_storage: Arc<dyn UserStorage>,
}

impl CredentialVerifier {
    /// Creates a new credential verifier.
    #[must_use]
    pub fn new(user_storage: Arc<dyn UserStorage>) -> Self {
        Self { user_storage }
    }

    /// Authenticates a user by username and password.
    ///
    /// The username lookup is case-sensitive. Returns `None` (not an error)
    /// when the user does not exist, has no password, is inactive, or the
    /// password does not match — deliberately indistinguishable cases.
    ///
    /// # Errors
    ///
    /// Returns an error only for storage failures; credential mismatches
    /// are reported as `Ok(None)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<Option<User>> {
        let Some(user) = self.user_storage.find_by_username(username).await? else {
            tracing::debug!("Login attempt for unknown username");
            return Ok(None);
        };

        if !user.active {
            tracing::debug!(user_id = %user.id, "Login attempt for inactive user");
            return Ok(None);
        }

        let Some(ref hash) = user.password_hash else {
            tracing::debug!(user_id = %user.id, "Login attempt for user without password");
            return Ok(None);
        };

        match verify_password(password, hash) {
            Ok(true) => Ok(Some(user)),
            Ok(false) => {
                tracing::debug!(user_id = %user.id, "Password mismatch");
                Ok(None)
            }
            Err(e) => {
                // A stored hash that cannot be parsed is a data problem,
                // not a bad credential.
                tracing::error!(user_id = %user.id, error = %e, "Malformed password hash in storage");
                Err(crate::error::AuthError::internal(
                    "malformed password hash",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserBuilder;
    use std::collections::HashMap;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    struct TestUserStorage {
        users: RwLock<HashMap<String, User>>,
    }

    impl TestUserStorage {
        fn new() -> Self {
            Self {
                users: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl UserStorage for TestUserStorage {
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
            self.users
                .write()
                .await
                .insert(user.username.clone(), user.clone());
            Ok(())
        }
    }

    async fn verifier_with_user(username: &str, password: &str) -> CredentialVerifier {
        let storage = Arc::new(TestUserStorage::new());
        let user = UserBuilder::new(username)
            .password_hash(hash_password(password).unwrap())
            .build();
        storage.create(&user).await.unwrap();
        CredentialVerifier::new(storage)
    }

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1).unwrap());
        assert!(verify_password("same-password", &h2).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("right").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let verifier = verifier_with_user("alice", "wonderland").await;
        let user = verifier.authenticate("alice", "wonderland").await.unwrap();
        assert!(user.is_some());
        assert_eq!(user.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let verifier = verifier_with_user("alice", "wonderland").await;
        let user = verifier.authenticate("alice", "looking-glass").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let verifier = verifier_with_user("alice", "wonderland").await;
        let user = verifier.authenticate("bob", "wonderland").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_is_case_sensitive() {
        let verifier = verifier_with_user("alice", "wonderland").await;
        let user = verifier.authenticate("Alice", "wonderland").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_inactive_user() {
        let storage = Arc::new(TestUserStorage::new());
        let user = UserBuilder::new("carol")
            .password_hash(hash_password("pw").unwrap())
            .active(false)
            .build();
        storage.create(&user).await.unwrap();
        let verifier = CredentialVerifier::new(storage);

        let result = verifier.authenticate("carol", "pw").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_user_without_password() {
        let storage = Arc::new(TestUserStorage::new());
        let user = UserBuilder::new("dave").build();
        storage.create(&user).await.unwrap();
        let verifier = CredentialVerifier::new(storage);

        let result = verifier.authenticate("dave", "anything").await.unwrap();
        assert!(result.is_none());
    }
}
