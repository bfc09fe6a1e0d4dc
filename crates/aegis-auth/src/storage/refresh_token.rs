//! Refresh token storage trait.
//!
//! This module defines the storage interface for OAuth 2.0 refresh tokens.
//!
//! # Security Considerations
//!
//! - Tokens are stored as SHA-256 hashes only
//! - Rotation consumes the presented token atomically; a rotated token
//!   presented again must fail closed
//! - Expired tokens should be cleaned up periodically

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::refresh_token::RefreshToken;

/// Storage trait for refresh tokens.
///
/// Implementations must ensure the atomicity of [`consume`], which is what
/// makes rotation anti-replay hold across concurrent requests and
/// independent processes.
///
/// [`consume`]: RefreshTokenStorage::consume
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Stores a new refresh token record.
    ///
    /// # Arguments
    ///
    /// * `token` - The refresh token to store (with hashed token value)
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored (e.g., duplicate
    /// hash, storage unavailable).
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by its hash.
    ///
    /// Returns tokens regardless of expiration/revocation status; callers
    /// should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Atomically consumes a refresh token for rotation.
    ///
    /// Marks the token revoked if and only if it is currently active
    /// (not already revoked) and returns the record. Two concurrent
    /// consume calls for the same hash must yield exactly one success.
    ///
    /// # Returns
    ///
    /// Returns the previously-active record, now revoked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the token is not found or was already
    /// revoked (rotation replay).
    ///
    /// # Atomicity
    ///
    /// For a SQL backend the natural shape is a conditional update checked
    /// by affected-row count:
    ///
    /// ```sql
    /// UPDATE refresh_token
    /// SET revoked_at = NOW()
    /// WHERE token_hash = $1 AND revoked_at IS NULL
    /// RETURNING *
    /// ```
    async fn consume(&self, token_hash: &str) -> AuthResult<RefreshToken>;

    /// Revokes a refresh token unconditionally.
    ///
    /// Idempotent: unknown or already-revoked tokens are not errors.
    ///
    /// # Returns
    ///
    /// Returns `true` if a previously-active record was revoked.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<bool>;

    /// Revokes all refresh tokens for a user.
    ///
    /// Used when a user's sessions are invalidated (logout everywhere,
    /// account compromise).
    ///
    /// # Returns
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn revoke_by_user(&self, user_id: Uuid) -> AuthResult<u64>;

    /// Deletes expired and revoked tokens.
    ///
    /// Hygiene operation to bound storage growth; correctness does not
    /// depend on it because expiry is checked at validation time.
    ///
    /// # Returns
    ///
    /// Returns the number of tokens deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
