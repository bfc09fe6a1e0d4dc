//! # aegis-auth
//!
//! OAuth 2.0 and OpenID Connect core for the Aegis ID authorization server.
//!
//! This crate provides:
//! - OAuth 2.0 authorization code flow with mandatory PKCE (S256 only)
//! - RS256 JWT access and ID token issuance
//! - Rotating, server-side revocable refresh tokens
//! - Resource-side access token verification
//! - Discovery and JWKS metadata
//!
//! ## Overview
//!
//! The crate is built around a small set of explicitly constructed,
//! dependency-injected services. The signing key pair and storage handles
//! are loaded once at process start and shared via `Arc`; no ambient
//! globals are used. Persistence is abstracted behind async storage traits
//! so backends can enforce the per-entity atomicity the code and refresh
//! token lifecycles require.
//!
//! ## Modules
//!
//! - [`config`] - Issuer, token lifetime, and signing configuration
//! - [`credentials`] - Password hashing and resource-owner authentication
//! - [`oauth`] - Authorization endpoint types, PKCE, authorization codes
//! - [`token`] - JWT signing/verification, token issuance and rotation
//! - [`storage`] - Storage traits for auth-related data
//! - [`http`] - Axum HTTP handlers for the OAuth/OIDC endpoints
//! - [`middleware`] - Bearer token extraction for protected resources

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod middleware;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError, OAuthConfig, SigningConfig};
pub use credentials::CredentialVerifier;
pub use error::{AuthError, ErrorCategory};
pub use http::{
    AuthorizeState, DiscoveryState, JwksState, RevocationState, TokenState, UserInfoResponse,
    authorize_handler, discovery_handler, jwks_handler, login_handler, revoke_handler,
    token_handler, userinfo_handler,
};
pub use middleware::{AuthContext, BearerAuth, VerifierState};
pub use oauth::{
    AuthorizationCode, AuthorizationError, AuthorizationErrorCode, AuthorizationRequest,
    AuthorizationResponse, AuthorizationService, CodeChallenge, CodeVerifier,
};
pub use storage::{
    AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage, User, UserBuilder, UserStorage,
};
pub use token::{
    AccessTokenClaims, IdTokenClaims, Jwk, Jwks, JwtError, JwtService, SigningAlgorithm,
    SigningKeyPair, TokenConfig, TokenService, TokenVerifier,
};
pub use types::{Client, ClientValidationError, GrantType, RefreshToken};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use aegis_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::credentials::CredentialVerifier;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthContext, BearerAuth, VerifierState};
    pub use crate::oauth::{
        AuthorizationCode, AuthorizationRequest, AuthorizationService, CodeChallenge, CodeVerifier,
    };
    pub use crate::storage::{
        AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage, User, UserStorage,
    };
    pub use crate::token::{
        AccessTokenClaims, IdTokenClaims, JwtService, SigningKeyPair, TokenConfig, TokenService,
        TokenVerifier,
    };
    pub use crate::types::{Client, GrantType, RefreshToken};
}
