//! Domain types shared across the auth crate.

pub mod client;
pub mod refresh_token;

pub use client::{Client, ClientValidationError, GrantType};
pub use refresh_token::RefreshToken;
