//! Token service for issuing and rotating tokens.
//!
//! This module provides the token service that handles OAuth 2.0 token
//! operations:
//!
//! - Authorization code exchange
//! - Refresh token rotation
//! - Refresh token revocation
//! - Access and ID token generation
//!
//! # Usage
//!
//! ```ignore
//! use aegis_auth::token::{TokenService, TokenConfig};
//!
//! let config = TokenConfig::new("https://id.example.com");
//! let service = TokenService::new(jwt_service, code_storage, refresh_storage, user_storage, config);
//!
//! let response = service.exchange_code(&request, &client).await?;
//! ```

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
#[cfg(test)]
use crate::oauth::code::AuthorizationCode;
use crate::oauth::pkce::{CodeChallenge, CodeVerifier};
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::code::AuthorizationCodeStorage;
use crate::storage::refresh_token::RefreshTokenStorage;
use crate::storage::user::{User, UserStorage};
use crate::token::jwt::{AccessTokenClaims, IdTokenClaims, JwtService};
use crate::types::refresh_token::RefreshToken;
use crate::types::{Client, GrantType};

/// Token service for generating and managing OAuth tokens.
pub struct TokenService {
    /// JWT service for encoding/decoding tokens.
    jwt_service: Arc<JwtService>,

    /// Storage for authorization codes.
    code_storage: Arc<dyn AuthorizationCodeStorage>,

    /// Refresh token storage.
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,

    /// User storage for ID token claims.
    user_storage: Arc<dyn UserStorage>,

    /// Service configuration.
    config: TokenConfig,
}

/// Configuration for the token service.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Server issuer URL (included in tokens as `iss`).
    pub issuer: String,

    /// Default access token lifetime.
    /// Can be overridden per-client.
    pub access_token_lifetime: Duration,

    /// Default refresh token lifetime.
    /// Can be overridden per-client.
    pub refresh_token_lifetime: Duration,

    /// ID token lifetime.
    pub id_token_lifetime: Duration,
}

impl TokenConfig {
    /// Creates a new token configuration with defaults.
    ///
    /// # Arguments
    ///
    /// * `issuer` - The authorization server's issuer URL
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            access_token_lifetime: Duration::minutes(15),
            refresh_token_lifetime: Duration::days(30),
            id_token_lifetime: Duration::hours(1),
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets the ID token lifetime.
    #[must_use]
    pub fn with_id_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.id_token_lifetime = lifetime;
        self
    }
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        jwt_service: Arc<JwtService>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        user_storage: Arc<dyn UserStorage>,
        config: TokenConfig,
    ) -> Self {
        Self {
            jwt_service,
            code_storage,
            refresh_token_storage,
            user_storage,
            config,
        }
    }

    /// Exchanges an authorization code for tokens.
    ///
    /// Validates the token request against the *stored* code record (never
    /// against re-supplied values), verifies PKCE, consumes the code, and
    /// generates tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `grant_type` is not "authorization_code"
    /// - Required fields are missing
    /// - The code is unknown, expired, or already consumed
    /// - The stored client ID doesn't match the authenticated client
    /// - The stored redirect URI doesn't match the request
    /// - PKCE verification fails
    ///
    /// # Security
    ///
    /// - A mismatched client, redirect URI, or PKCE verifier fails the
    ///   request without consuming the code; there are no retry semantics
    /// - The consume step itself is atomic: two concurrent exchanges of
    ///   the same code yield exactly one success
    /// - An expired code is deleted as a side effect of the failed exchange
    /// - Codes and tokens are never logged
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type
        if request.grant_type != "authorization_code" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }

        // 2. Extract required fields
        let code = request
            .code
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing code parameter"))?;

        let redirect_uri = request
            .redirect_uri
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing redirect_uri parameter"))?;

        let code_verifier = request
            .code_verifier
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing code_verifier parameter"))?;

        // 3. Fetch the stored record
        let record = self
            .code_storage
            .find_by_code(code)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid authorization code"))?;

        // 4. Expired codes never produce tokens, regardless of PKCE
        //    correctness; the stale record is discarded.
        if record.is_expired() {
            let _ = self.code_storage.delete(code).await?;
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }

        // 5. Validate against the stored client ID
        if record.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to a different client",
            ));
        }

        // 6. Validate against the stored redirect URI (exact match)
        if record.redirect_uri != *redirect_uri {
            return Err(AuthError::invalid_grant(
                "Redirect URI does not match authorization request",
            ));
        }

        // 7. Verify the presented verifier against the stored challenge
        let challenge = CodeChallenge::parse(&record.code_challenge)
            .map_err(|_| AuthError::invalid_grant("Stored PKCE challenge is malformed"))?;

        let verifier = CodeVerifier::parse(code_verifier)
            .map_err(|_| AuthError::invalid_grant("Malformed code_verifier"))?;

        if !challenge.matches(&verifier) {
            return Err(AuthError::PkceVerificationFailed);
        }

        // 8. Consume the code (atomic one-time use). Concurrent exchanges
        //    of the same code race here; exactly one wins.
        let record = self.code_storage.consume(code).await?;

        // 9. Load the user bound to the code
        let user = self
            .user_storage
            .find_by_id(record.user_id)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Unknown user"))?;

        // 10. Generate tokens
        self.issue_tokens(&user, client, &record.scope, record.nonce.as_deref())
            .await
    }

    /// Issues a full token set for an authenticated user.
    ///
    /// Produces a signed access token, persists a new refresh token record
    /// bound to the user and client, and signs an ID token. The ID token is
    /// issued unconditionally.
    async fn issue_tokens(
        &self,
        user: &User,
        client: &Client,
        scope: &str,
        nonce: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        let now = OffsetDateTime::now_utc();

        // Determine token lifetimes (client-specific or default)
        let access_lifetime = client
            .access_token_lifetime
            .map(Duration::seconds)
            .unwrap_or(self.config.access_token_lifetime);

        let refresh_lifetime = client
            .refresh_token_lifetime
            .map(Duration::seconds)
            .unwrap_or(self.config.refresh_token_lifetime);

        // Access token: sub is the stable user id, aud the requesting client
        let access_claims = AccessTokenClaims {
            iss: self.config.issuer.clone(),
            sub: user.id.to_string(),
            aud: vec![client.client_id.clone()],
            exp: (now + access_lifetime).unix_timestamp(),
            iat: now.unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
            scope: scope.to_string(),
            client_id: client.client_id.clone(),
        };

        let access_token = self
            .jwt_service
            .encode(&access_claims)
            .map_err(|e| AuthError::internal(format!("Failed to encode access token: {e}")))?;

        // Refresh token: opaque value, hash persisted server-side
        let refresh_token = self
            .generate_refresh_token(user.id, client, scope, refresh_lifetime, now)
            .await?;

        // ID token
        let id_claims = IdTokenClaims {
            iss: self.config.issuer.clone(),
            sub: user.id.to_string(),
            aud: client.client_id.clone(),
            exp: (now + self.config.id_token_lifetime).unix_timestamp(),
            iat: now.unix_timestamp(),
            name: user.name.clone(),
            email: user.email.clone(),
            nonce: nonce.map(ToString::to_string),
        };

        let id_token = self
            .jwt_service
            .encode(&id_claims)
            .map_err(|e| AuthError::internal(format!("Failed to encode ID token: {e}")))?;

        Ok(
            TokenResponse::new(
                access_token,
                access_lifetime.whole_seconds() as u64,
                scope.to_string(),
            )
            .with_refresh_token(refresh_token)
            .with_id_token(id_token),
        )
    }

    /// Generates and stores a refresh token, returning the plaintext value.
    async fn generate_refresh_token(
        &self,
        user_id: Uuid,
        client: &Client,
        scope: &str,
        lifetime: Duration,
        now: OffsetDateTime,
    ) -> AuthResult<String> {
        let token_value = RefreshToken::generate_token();
        let token_hash = RefreshToken::hash_token(&token_value);

        let record = RefreshToken {
            id: Uuid::new_v4(),
            token_hash,
            client_id: client.client_id.clone(),
            user_id,
            scope: scope.to_string(),
            created_at: now,
            expires_at: now + lifetime,
            revoked_at: None,
        };

        self.refresh_token_storage.create(&record).await?;

        // Return plaintext token to the client; only the hash was stored
        Ok(token_value)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The presented token is invalidated *before* the successor pair is
    /// returned; a rotated token presented again fails closed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the token is unknown, already rotated or
    /// revoked, expired, or bound to a different client.
    ///
    /// # Security
    ///
    /// - The consume step is atomic: concurrent refreshes of the same
    ///   token yield exactly one success
    /// - Reuse of a rotated token is logged as a probable replay
    /// - ID tokens are not reissued on refresh
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate grant type
        if request.grant_type != "refresh_token" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }

        // 2. Validate client is allowed refresh_token grant
        if !client.is_grant_type_allowed(GrantType::RefreshToken) {
            return Err(AuthError::invalid_client(
                "Client not authorized for refresh_token grant",
            ));
        }

        // 3. Get refresh token from request
        let refresh_token_value = request
            .refresh_token
            .as_ref()
            .ok_or_else(|| AuthError::invalid_grant("Missing refresh_token parameter"))?;

        // 4. Atomically consume the presented token. This must happen
        //    before anything is returned to the caller (anti-replay).
        let token_hash = RefreshToken::hash_token(refresh_token_value);
        let stored_token = match self.refresh_token_storage.consume(&token_hash).await {
            Ok(token) => token,
            Err(e) => {
                // An already-revoked token resurfacing is the reuse signal
                if let Ok(Some(existing)) =
                    self.refresh_token_storage.find_by_hash(&token_hash).await
                    && existing.is_revoked()
                {
                    tracing::warn!(
                        client_id = %client.client_id,
                        token_id = %existing.id,
                        "Rotated refresh token presented again; possible replay"
                    );
                }
                return Err(e);
            }
        };

        // 5. Validate the consumed token
        if stored_token.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was issued to a different client",
            ));
        }

        if stored_token.is_expired() {
            return Err(AuthError::invalid_grant("Refresh token has expired"));
        }

        // 6. Determine scope (can be narrowed, not expanded)
        let scope = self.determine_refresh_scope(request, &stored_token)?;

        // 7. Generate the new access token
        let now = OffsetDateTime::now_utc();

        let access_lifetime = client
            .access_token_lifetime
            .map(Duration::seconds)
            .unwrap_or(self.config.access_token_lifetime);

        let access_claims = AccessTokenClaims {
            iss: self.config.issuer.clone(),
            sub: stored_token.user_id.to_string(),
            aud: vec![client.client_id.clone()],
            exp: (now + access_lifetime).unix_timestamp(),
            iat: now.unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
            scope: scope.clone(),
            client_id: client.client_id.clone(),
        };

        let access_token = self
            .jwt_service
            .encode(&access_claims)
            .map_err(|e| AuthError::internal(format!("Failed to encode access token: {e}")))?;

        // 8. Mint the successor refresh token. Rotation is unconditional:
        //    the presented token was revoked in step 4, so the chain must
        //    always continue with a fresh value.
        let new_token_value = RefreshToken::generate_token();
        let new_token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: RefreshToken::hash_token(&new_token_value),
            client_id: client.client_id.clone(),
            user_id: stored_token.user_id,
            scope: scope.clone(),
            created_at: now,
            expires_at: stored_token.expires_at, // Keep original expiration
            revoked_at: None,
        };

        self.refresh_token_storage.create(&new_token).await?;

        // 9. Build response (no ID token on refresh)
        Ok(
            TokenResponse::new(access_token, access_lifetime.whole_seconds() as u64, scope)
                .with_refresh_token(new_token_value),
        )
    }

    /// Revokes a refresh token.
    ///
    /// Idempotent: an unknown or already-revoked token is not an error.
    ///
    /// # Returns
    ///
    /// Returns `true` if a previously-active record was revoked.
    ///
    /// # Errors
    ///
    /// Returns an error only for storage failures.
    pub async fn revoke(&self, token_value: &str) -> AuthResult<bool> {
        let token_hash = RefreshToken::hash_token(token_value);
        let revoked = self.refresh_token_storage.revoke(&token_hash).await?;
        if revoked {
            tracing::info!("Refresh token revoked");
        }
        Ok(revoked)
    }

    /// Determines the scope to use for a refreshed token.
    ///
    /// Per OAuth 2.0, the scope can be narrowed but not expanded.
    fn determine_refresh_scope(
        &self,
        request: &TokenRequest,
        stored_token: &RefreshToken,
    ) -> AuthResult<String> {
        match request.scope.as_deref() {
            None => {
                // No scope requested - use original
                Ok(stored_token.scope.clone())
            }
            Some(requested) => {
                // Requested scope must be subset of original
                let original_scopes: std::collections::HashSet<&str> =
                    stored_token.scope.split_whitespace().collect();
                let requested_scopes: std::collections::HashSet<&str> =
                    requested.split_whitespace().collect();

                if !requested_scopes.is_subset(&original_scopes) {
                    return Err(AuthError::invalid_scope(
                        "Requested scope exceeds original grant",
                    ));
                }

                Ok(requested.to_string())
            }
        }
    }

    /// Gets the JWT service reference.
    #[must_use]
    pub fn jwt_service(&self) -> &Arc<JwtService> {
        &self.jwt_service
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Returns the issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}
