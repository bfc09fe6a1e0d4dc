//! Bearer token authentication extractor.
//!
//! This module provides an Axum extractor for validating Bearer tokens
//! and extracting authentication context from requests.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use aegis_auth::middleware::{BearerAuth, VerifierState};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.claims.sub)
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(verifier_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::error::AuthError;
use crate::storage::user::{User, UserStorage};
use crate::token::jwt::AccessTokenClaims;
use crate::token::verifier::TokenVerifier;

// =============================================================================
// Verifier State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include this in your application state and make it available to the
/// `BearerAuth` extractor via `FromRef`.
#[derive(Clone)]
pub struct VerifierState {
    /// Token verifier sharing the process-wide signing key.
    pub verifier: Arc<TokenVerifier>,

    /// User storage for loading the token subject.
    pub user_storage: Arc<dyn UserStorage>,
}

impl VerifierState {
    /// Creates a new verifier state.
    pub fn new(verifier: Arc<TokenVerifier>, user_storage: Arc<dyn UserStorage>) -> Self {
        Self {
            verifier,
            user_storage,
        }
    }
}

// =============================================================================
// Auth Context
// =============================================================================

/// Authentication context extracted from a validated bearer token.
#[derive(Clone)]
pub struct AuthContext {
    /// Validated access token claims.
    pub claims: AccessTokenClaims,

    /// The resource owner the token was issued to.
    pub user: User,
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates Bearer tokens and extracts auth context.
///
/// This extractor:
/// 1. Extracts the `Authorization: Bearer <token>` header
/// 2. Decodes and validates the JWT (signature, issuer, expiry)
/// 3. Loads the user named by the `sub` claim and verifies it is active
///
/// The issuing server accepts its own tokens for any registered relying
/// party; external resource servers pin the audience via
/// [`TokenVerifier::verify`] instead.
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) if:
/// - Authorization header is missing or malformed
/// - Token is invalid or expired
/// - The subject no longer exists or is inactive
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    VerifierState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier_state = VerifierState::from_ref(state);

        // 1. Extract the bearer token
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("Missing bearer token"))?;

        // 2. Validate signature, issuer, and expiry
        let claims = verifier_state.verifier.decode(token)?;

        // 3. Load the subject
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::invalid_token("Malformed subject claim"))?;

        let user = verifier_state
            .user_storage
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Token subject no longer exists");
                AuthError::invalid_token("Unknown subject")
            })?;

        if !user.active {
            tracing::warn!(user_id = %user.id, "Token presented for inactive user");
            return Err(AuthError::invalid_token("User is inactive"));
        }

        tracing::debug!(
            client_id = %claims.client_id,
            subject = %claims.sub,
            "Bearer token validated"
        );

        Ok(BearerAuth(AuthContext { claims, user }))
    }
}
