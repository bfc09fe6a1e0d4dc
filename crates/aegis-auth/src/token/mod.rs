//! Token generation, validation, and management.
//!
//! - [`jwt`] - RS256 signing key management and JWT encode/decode
//! - [`service`] - Token issuance: code exchange, refresh rotation, revocation
//! - [`verifier`] - Resource-side access token verification

pub mod jwt;
pub mod service;
pub mod verifier;

pub use jwt::{
    AccessTokenClaims, IdTokenClaims, Jwk, Jwks, JwtError, JwtService, SigningAlgorithm,
    SigningKeyPair,
};
pub use service::{TokenConfig, TokenService};
pub use verifier::TokenVerifier;
