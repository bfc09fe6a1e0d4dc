//! User storage trait.
//!
//! Defines the user domain type and the interface for user persistence.
//! Users are created at seed time and are read-only during auth flows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;

/// Default datetime value for deserialization when field is missing.
fn default_datetime() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

// =============================================================================
// User Type
// =============================================================================

/// A user (resource owner) in the authentication system.
///
/// The `id` is the canonical, stable, non-reassignable identifier and is
/// used as the `sub` claim of every issued token. The username is only a
/// login handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique, stable identifier for the user.
    pub id: Uuid,

    /// Username for authentication (unique, case-sensitive).
    pub username: String,

    /// Email address (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Full display name of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Argon2id-hashed password (None for users that cannot log in).
    ///
    /// Note: this field is stored for password authentication. When
    /// exposing User via API, filter this field out manually.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Whether the user account is active.
    ///
    /// Inactive users cannot authenticate.
    pub active: bool,

    /// When the user was created.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the user was last updated.
    #[serde(default = "default_datetime", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with the given username.
    ///
    /// The user is active by default with no password. A new UUID is
    /// generated as the ID.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            name: None,
            password_hash: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user builder.
    #[must_use]
    pub fn builder(username: impl Into<String>) -> UserBuilder {
        UserBuilder::new(username)
    }

    /// Returns `true` if the user account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

// =============================================================================
// User Builder
// =============================================================================

/// Builder for creating `User` instances.
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    /// Creates a builder for a user with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            user: User::new(username),
        }
    }

    /// Sets the user ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.user.id = id;
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Sets the full name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = Some(name.into());
        self
    }

    /// Sets the password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.user.password_hash = Some(hash.into());
        self
    }

    /// Sets whether the user is active.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.user.active = active;
        self
    }

    /// Builds the user.
    #[must_use]
    pub fn build(self) -> User {
        self.user
    }
}

// =============================================================================
// User Storage Trait
// =============================================================================

/// Storage operations for users.
///
/// This trait defines the interface for persisting and retrieving users.
/// The core never mutates users; password updates are out of scope.
///
/// # Example
///
/// ```ignore
/// use aegis_auth::storage::UserStorage;
///
/// async fn example(storage: &impl UserStorage) {
///     if let Some(user) = storage.find_by_username("alice").await? {
///         println!("Found user: {}", user.id);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Find a user by their unique ID.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: Uuid) -> AuthResult<Option<User>>;

    /// Find a user by their username (case-sensitive).
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A user with the same username already exists
    /// - The storage operation fails
    async fn create(&self, user: &User) -> AuthResult<()>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("testuser");
        assert_eq!(user.username, "testuser");
        assert!(user.active);
        assert!(user.email.is_none());
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn test_user_builder() {
        let user = User::builder("testuser")
            .email("test@example.com")
            .name("Test User")
            .password_hash("$argon2id$...")
            .active(true)
            .build();

        assert_eq!(user.username, "testuser");
        assert_eq!(user.email, Some("test@example.com".to_string()));
        assert_eq!(user.name, Some("Test User".to_string()));
        assert!(user.password_hash.is_some());
        assert!(user.is_active());
    }

    #[test]
    fn test_user_builder_with_id() {
        let id = Uuid::new_v4();
        let user = User::builder("testuser").id(id).build();
        assert_eq!(user.id, id);
    }

    #[test]
    fn test_user_serialization() {
        let user = User::builder("testuser")
            .email("test@example.com")
            .password_hash("$argon2id$stub")
            .build();

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("testuser"));
        assert!(json.contains("test@example.com"));
        // password_hash is serialized for storage (filter it out when exposing via API)
        assert!(json.contains("password_hash"));
    }

    #[test]
    fn test_user_deserialization_without_optional_fields() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{
                "id": "{id}",
                "username": "admin",
                "active": true
            }}"#
        );

        let user: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "admin");
        assert!(user.email.is_none());
        assert!(user.password_hash.is_none());
    }
}
