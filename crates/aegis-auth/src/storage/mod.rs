//! Storage traits for authentication and authorization data.
//!
//! This module defines storage interfaces for:
//!
//! - Users (resource owners)
//! - OAuth client registrations
//! - Authorization codes
//! - Refresh tokens
//!
//! The authorization-code and refresh-token stores carry the per-entity
//! atomicity contract the protocol depends on: concurrent consume attempts
//! for the same code or token must yield exactly one success.
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `aegis-auth-memory` - in-memory backend for development and tests

pub mod client;
pub mod code;
pub mod refresh_token;
pub mod user;

pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use refresh_token::RefreshTokenStorage;
pub use user::{User, UserBuilder, UserStorage};
