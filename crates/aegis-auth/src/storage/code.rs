//! Authorization code storage trait.
//!
//! This module defines the storage interface for one-time authorization
//! codes used during the OAuth 2.0 authorization code flow.
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Ensure consume is atomic to prevent replay attacks
//! - Expired codes should be cleaned up periodically

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::code::AuthorizationCode;

/// Storage trait for authorization codes.
///
/// Codes are created after a successful login and consumed when exchanged
/// for tokens. Implementations must guarantee that consumption is atomic
/// per code value.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Creates a new authorization code record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored (e.g., duplicate
    /// code, storage unavailable).
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Finds a record by authorization code value.
    ///
    /// Returns `Some(record)` if found, `None` if not found. Records are
    /// returned regardless of their consumed/expired status; callers check
    /// `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Consumes an authorization code (marks it used).
    ///
    /// This operation must be atomic so that the same code cannot be
    /// exchanged twice, even by concurrent requests handled by independent
    /// processes.
    ///
    /// # Returns
    ///
    /// Returns the consumed record on success, with `consumed_at` set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if:
    /// - The code is not found
    /// - The code is already consumed
    ///
    /// # Atomicity
    ///
    /// Implementations must ensure this operation is atomic. For a SQL
    /// backend the natural shape is a conditional update checked by
    /// affected-row count:
    ///
    /// ```sql
    /// UPDATE authorization_code
    /// SET consumed_at = NOW()
    /// WHERE code = $1 AND consumed_at IS NULL
    /// RETURNING *
    /// ```
    async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode>;

    /// Deletes a record by code value.
    ///
    /// Used to discard expired codes when an exchange fails on expiry.
    ///
    /// # Returns
    ///
    /// Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, code: &str) -> AuthResult<bool>;

    /// Deletes expired records.
    ///
    /// Hygiene operation; correctness does not depend on it because expiry
    /// is checked at validation time.
    ///
    /// # Returns
    ///
    /// Returns the number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
