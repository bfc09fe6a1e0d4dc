//! # aegis-auth-memory
//!
//! In-memory implementations of the `aegis-auth` storage traits, intended
//! for development servers and tests.
//!
//! Every store keeps its records under a single `tokio::sync::RwLock`, so
//! the conditional consume operations (`AuthorizationCodeStorage::consume`,
//! `RefreshTokenStorage::consume`) are check-and-set mutations under one
//! write lock. That is the in-process realization of the atomicity
//! contract a database backend would express as a conditional `UPDATE`
//! checked by affected-row count.
//!
//! Data does not survive a process restart.

mod client;
mod code;
mod refresh_token;
mod user;

pub use client::MemoryClientStorage;
pub use code::MemoryAuthorizationCodeStorage;
pub use refresh_token::MemoryRefreshTokenStorage;
pub use user::MemoryUserStorage;
