//! HTTP middleware for protected-resource authentication.
//!
//! - [`auth`] - `BearerAuth` extractor validating access tokens
//! - [`error`] - `IntoResponse` mapping for [`crate::error::AuthError`]

pub mod auth;
pub mod error;

pub use auth::{AuthContext, BearerAuth, VerifierState};
