//! Authorization code entity.
//!
//! The authorization code is the short-lived, single-use artifact minted
//! after a successful login and exchanged for tokens.
//!
//! # Lifecycle
//!
//! 1. Created when the resource owner authenticates at the login endpoint
//! 2. Returned to the client via redirect
//! 3. Consumed exactly once at the token endpoint (atomic)
//! 4. Expired records are deleted on a failed exchange or by cleanup
//!
//! # Security
//!
//! - Codes are cryptographically random (256 bits)
//! - Codes expire after a short time (default 5 minutes)
//! - Codes are single-use; consumption is atomic per code
//! - The PKCE challenge is stored for verification at token exchange

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Authorization code record persisted between login and token exchange.
///
/// The record binds the code to the exact client, redirect URI, scope, and
/// PKCE challenge from the authorization request; the token endpoint
/// validates against these stored values, never against re-supplied ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// Unique record identifier.
    pub id: Uuid,

    /// Authorization code value (one-time use).
    /// 256-bit random value, base64url-encoded.
    pub code: String,

    /// Client identifier that initiated the request.
    pub client_id: String,

    /// Authenticated resource owner.
    pub user_id: Uuid,

    /// Redirect URI from the authorization request.
    /// Must match the redirect_uri in the token request.
    pub redirect_uri: String,

    /// Granted scopes (space-separated).
    pub scope: String,

    /// PKCE code challenge from the authorization request (S256).
    pub code_challenge: String,

    /// OpenID Connect nonce for ID token binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Timestamp when the code was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the code expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the code was exchanged (consumed).
    /// None until the code is used.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationCode {
    /// Generates a new cryptographically secure authorization code value.
    ///
    /// The code is 256 bits (32 bytes) of random data, encoded as
    /// base64url without padding (43 characters). This exceeds the
    /// OAuth 2.0 recommendation of at least 128 bits of entropy.
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the code has expired.
    ///
    /// Expired codes must never produce tokens.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the code has been consumed.
    ///
    /// Consumed codes cannot be used again (single-use requirement).
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the code is valid for exchange.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_generate_code_length() {
        let code = AuthorizationCode::generate_code();
        // 32 bytes = 256 bits, base64url encoded = 43 characters (no padding)
        assert_eq!(code.len(), 43);
    }

    #[test]
    fn test_generate_code_is_base64url() {
        let code = AuthorizationCode::generate_code();
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_code_uniqueness() {
        let codes: Vec<String> = (0..100)
            .map(|_| AuthorizationCode::generate_code())
            .collect();

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();
        assert_eq!(codes.len(), unique_codes.len());
    }

    #[test]
    fn test_is_expired() {
        let now = OffsetDateTime::now_utc();

        let code = create_test_code(now + Duration::minutes(5), None);
        assert!(!code.is_expired());

        let code = create_test_code(now - Duration::minutes(1), None);
        assert!(code.is_expired());
    }

    #[test]
    fn test_is_consumed() {
        let now = OffsetDateTime::now_utc();

        let code = create_test_code(now + Duration::minutes(5), None);
        assert!(!code.is_consumed());

        let code = create_test_code(now + Duration::minutes(5), Some(now));
        assert!(code.is_consumed());
    }

    #[test]
    fn test_is_valid() {
        let now = OffsetDateTime::now_utc();

        // Valid: not expired, not consumed
        let code = create_test_code(now + Duration::minutes(5), None);
        assert!(code.is_valid());

        // Invalid: expired
        let code = create_test_code(now - Duration::minutes(1), None);
        assert!(!code.is_valid());

        // Invalid: consumed
        let code = create_test_code(now + Duration::minutes(5), Some(now));
        assert!(!code.is_valid());

        // Invalid: both expired and consumed
        let code = create_test_code(now - Duration::minutes(1), Some(now));
        assert!(!code.is_valid());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let now = OffsetDateTime::now_utc();
        let code = create_test_code(now + Duration::minutes(5), None);

        let json = serde_json::to_string(&code).unwrap();
        let deserialized: AuthorizationCode = serde_json::from_str(&json).unwrap();

        assert_eq!(code.id, deserialized.id);
        assert_eq!(code.code, deserialized.code);
        assert_eq!(code.client_id, deserialized.client_id);
        assert_eq!(code.user_id, deserialized.user_id);
        assert_eq!(code.scope, deserialized.scope);
        assert_eq!(code.code_challenge, deserialized.code_challenge);
    }

    /// Helper function to create a test code record.
    fn create_test_code(
        expires_at: OffsetDateTime,
        consumed_at: Option<OffsetDateTime>,
    ) -> AuthorizationCode {
        AuthorizationCode {
            id: Uuid::new_v4(),
            code: AuthorizationCode::generate_code(),
            client_id: "test-client".to_string(),
            user_id: Uuid::new_v4(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid profile".to_string(),
            code_challenge: "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string(),
            nonce: None,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
            consumed_at,
        }
    }
}
