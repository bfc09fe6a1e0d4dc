//! OAuth 2.0 authorization code flow.
//!
//! This module contains the authorization-endpoint request/response types,
//! the PKCE implementation, the authorization-code entity, and the
//! [`AuthorizationService`] that validates authorize requests and mints
//! codes after a successful login.

pub mod authorize;
pub mod code;
pub mod pkce;
pub mod service;
pub mod token;

pub use authorize::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationRequest, AuthorizationResponse,
};
pub use code::AuthorizationCode;
pub use pkce::{CHALLENGE_METHOD_S256, CodeChallenge, CodeVerifier, require_s256};
pub use service::{AuthorizationService, LoginOutcome};
pub use token::{TokenErrorBody, TokenErrorCode, TokenRequest, TokenResponse};
