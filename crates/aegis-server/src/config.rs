//! Server configuration.
//!
//! Loaded from a TOML file at startup. Every section has sensible
//! development defaults; a missing file at the default path is not an
//! error, but an explicitly requested path that cannot be read is.
//!
//! # Example (TOML)
//!
//! ```toml
//! bind_addr = "127.0.0.1:8080"
//!
//! [auth]
//! issuer = "https://id.example.com"
//!
//! [auth.signing]
//! kid = "aegis-key-1"
//! private_key_path = "keys/signing.pem"
//! public_key_path = "keys/signing.pub.pem"
//!
//! [[seed.users]]
//! username = "alice"
//! password = "wonderland"
//! name = "Alice Example"
//! email = "alice@example.com"
//!
//! [[seed.clients]]
//! client_id = "spa-client"
//! name = "Demo SPA"
//! redirect_uris = ["http://localhost:3000/callback"]
//! ```

use serde::{Deserialize, Serialize};

use aegis_auth::config::{AuthConfig, ConfigError};

/// Root server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,

    /// Authentication and token configuration.
    pub auth: AuthConfig,

    /// Users and clients seeded into storage at startup.
    pub seed: SeedConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            auth: AuthConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty bind address or an invalid
    /// auth section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.is_empty() {
            return Err(ConfigError::missing_field("bind_addr"));
        }
        self.auth.validate()
    }
}

/// Seed data applied to storage at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Users to create.
    pub users: Vec<SeedUser>,

    /// Clients to register.
    pub clients: Vec<SeedClient>,
}

/// A user seeded at startup.
///
/// The plaintext password is hashed with Argon2id before storage; it only
/// ever lives in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUser {
    /// Login username (unique).
    pub username: String,

    /// Plaintext password, hashed at seed time.
    pub password: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

/// A client registration seeded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedClient {
    /// Client identifier (unique).
    pub client_id: String,

    /// Display name.
    pub name: String,

    /// Allow-listed redirect URIs (exact match).
    pub redirect_uris: Vec<String>,

    /// Allowed scopes; empty means all scopes.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether the client is confidential. Confidential clients must set
    /// `client_secret`.
    #[serde(default)]
    pub confidential: bool,

    /// Plaintext client secret, hashed at seed time (confidential only).
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Loads the server configuration.
///
/// With `Some(path)` the file must exist and parse. With `None` the
/// default path `aegis.toml` is tried and defaults are used when the file
/// is absent.
///
/// # Errors
///
/// Returns a [`ConfigError`] if an explicitly requested file cannot be
/// read, or any file fails to parse or validate.
pub fn load_config(path: Option<&str>) -> Result<ServerConfig, ConfigError> {
    let (contents, required) = match path {
        Some(p) => (std::fs::read_to_string(p), true),
        None => (std::fs::read_to_string("aegis.toml"), false),
    };

    let config = match contents {
        Ok(text) => {
            toml::from_str::<ServerConfig>(&text).map_err(|e| ConfigError::parse(e.to_string()))?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => ServerConfig::default(),
        Err(e) => return Err(ConfigError::io(e.to_string())),
    };

    config.validate()?;
    Ok(config)
}
