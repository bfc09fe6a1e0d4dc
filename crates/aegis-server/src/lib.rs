//! Aegis ID authorization server.
//!
//! Thin process bootstrap around the `aegis-auth` core: configuration
//! loading, tracing initialization, signing-key provisioning, storage
//! seeding, and Axum router assembly.

pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod routes;

pub use bootstrap::{BootstrapError, Services};
pub use config::{SeedClient, SeedUser, ServerConfig, load_config};
