//! Authentication and authorization configuration.
//!
//! Configuration types for the Aegis ID auth module: issuer identity,
//! OAuth 2.0 token lifetimes, and JWT signing settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root authentication and authorization configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://id.example.com"
///
/// [auth.oauth]
/// authorization_code_lifetime = "5m"
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "30d"
///
/// [auth.signing]
/// kid = "aegis-key-1"
/// private_key_path = "keys/signing.pem"
/// public_key_path = "keys/signing.pub.pem"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used in token `iss` claim and discovery metadata).
    /// This should be the public base URL of the authorization server.
    pub issuer: String,

    /// OAuth 2.0 configuration.
    pub oauth: OAuthConfig,

    /// Token signing configuration.
    pub signing: SigningConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            oauth: OAuthConfig::default(),
            signing: SigningConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the issuer is empty, the refresh token
    /// lifetime is outside the supported 7-30 day window, or the signing
    /// section is inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::missing_field("issuer"));
        }

        let refresh = self.oauth.refresh_token_lifetime;
        let min = Duration::from_secs(7 * 24 * 3600);
        let max = Duration::from_secs(30 * 24 * 3600);
        if refresh < min || refresh > max {
            return Err(ConfigError::invalid_value(
                "oauth.refresh_token_lifetime",
                "must be between 7 and 30 days",
            ));
        }

        self.signing.validate()
    }
}

/// OAuth 2.0 configuration.
///
/// Controls token lifetimes for the authorization server. Refresh tokens
/// are always rotated on use; the presented token is revoked before its
/// successor is returned.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    /// Codes are single-use and should be short-lived.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    /// Shorter lifetimes are more secure but require more frequent refresh.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime. Must be between 7 and 30 days.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// ID token lifetime.
    #[serde(with = "humantime_serde")]
    pub id_token_lifetime: Duration,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(300), // 5 minutes
            access_token_lifetime: Duration::from_secs(900),       // 15 minutes
            refresh_token_lifetime: Duration::from_secs(30 * 24 * 3600), // 30 days
            id_token_lifetime: Duration::from_secs(3600),          // 1 hour
        }
    }
}

/// Token signing configuration.
///
/// The server signs every token with a single RS256 RSA key pair whose
/// public half is published at the JWKS endpoint under `kid`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signing algorithm. Only "RS256" is supported.
    pub algorithm: String,

    /// Key ID embedded in token headers and the published JWK.
    pub kid: String,

    /// Path to the PEM-encoded PKCS#8 private key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,

    /// Path to the PEM-encoded SPKI public key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<String>,

    /// Generate an ephemeral key pair at startup when no key files are
    /// configured. Intended for local development only; tokens do not
    /// survive a restart.
    pub generate_dev_key: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: "RS256".to_string(),
            kid: "aegis-key-1".to_string(),
            private_key_path: None,
            public_key_path: None,
            generate_dev_key: true,
        }
    }
}

impl SigningConfig {
    /// Validates the signing configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the algorithm is unsupported, the key ID
    /// is empty, or only one of the two key paths is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.algorithm != "RS256" {
            return Err(ConfigError::invalid_value(
                "signing.algorithm",
                "only RS256 is supported",
            ));
        }

        if self.kid.is_empty() {
            return Err(ConfigError::missing_field("signing.kid"));
        }

        if self.private_key_path.is_some() != self.public_key_path.is_some() {
            return Err(ConfigError::invalid_value(
                "signing",
                "private_key_path and public_key_path must be set together",
            ));
        }

        if self.private_key_path.is_none() && !self.generate_dev_key {
            return Err(ConfigError::invalid_value(
                "signing",
                "no key files configured and generate_dev_key is disabled",
            ));
        }

        Ok(())
    }

    /// Returns `true` if key material should be loaded from files.
    #[must_use]
    pub fn has_key_files(&self) -> bool {
        self.private_key_path.is_some() && self.public_key_path.is_some()
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required field is missing or empty.
    #[error("Missing required configuration field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A field has an invalid value.
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("Failed to read configuration: {message}")]
    Io {
        /// Description of the I/O failure.
        message: String,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },
}

impl ConfigError {
    /// Creates a new `MissingField` error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a new `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AuthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.oauth.authorization_code_lifetime.as_secs(), 300);
        assert_eq!(config.oauth.access_token_lifetime.as_secs(), 900);
        assert_eq!(config.oauth.id_token_lifetime.as_secs(), 3600);
    }

    #[test]
    fn test_empty_issuer_rejected() {
        let config = AuthConfig {
            issuer: String::new(),
            ..AuthConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_refresh_lifetime_bounds() {
        let mut config = AuthConfig::default();

        config.oauth.refresh_token_lifetime = Duration::from_secs(24 * 3600); // 1 day
        assert!(config.validate().is_err());

        config.oauth.refresh_token_lifetime = Duration::from_secs(60 * 24 * 3600); // 60 days
        assert!(config.validate().is_err());

        config.oauth.refresh_token_lifetime = Duration::from_secs(7 * 24 * 3600);
        assert!(config.validate().is_ok());

        config.oauth.refresh_token_lifetime = Duration::from_secs(30 * 24 * 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let mut config = AuthConfig::default();
        config.signing.algorithm = "ES384".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_key_paths_must_come_together() {
        let mut config = AuthConfig::default();
        config.signing.private_key_path = Some("keys/signing.pem".to_string());
        assert!(config.validate().is_err());

        config.signing.public_key_path = Some("keys/signing.pub.pem".to_string());
        assert!(config.validate().is_ok());
        assert!(config.signing.has_key_files());
    }

    #[test]
    fn test_no_keys_and_no_dev_generation_rejected() {
        let mut config = AuthConfig::default();
        config.signing.generate_dev_key = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_durations() {
        let config = AuthConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.oauth.access_token_lifetime,
            config.oauth.access_token_lifetime
        );
        assert_eq!(parsed.signing.kid, config.signing.kid);
    }
}
