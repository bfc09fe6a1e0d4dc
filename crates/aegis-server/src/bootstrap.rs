//! Process bootstrap: key loading, service construction, and seeding.
//!
//! Every failure here is fatal. The process must not begin serving
//! traffic with a missing signing key or a half-applied seed.

use std::sync::Arc;

use aegis_auth::config::SigningConfig;
use aegis_auth::credentials::{CredentialVerifier, hash_password};
use aegis_auth::oauth::AuthorizationService;
use aegis_auth::storage::{
    AuthorizationCodeStorage, ClientStorage, UserBuilder, UserStorage,
};
use aegis_auth::storage::RefreshTokenStorage;
use aegis_auth::token::{JwtService, SigningKeyPair, TokenConfig, TokenService, TokenVerifier};
use aegis_auth::types::{Client, GrantType};
use aegis_auth_memory::{
    MemoryAuthorizationCodeStorage, MemoryClientStorage, MemoryRefreshTokenStorage,
    MemoryUserStorage,
};

use crate::config::{SeedClient, SeedUser, ServerConfig};

/// Errors that abort server startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// A signing key file could not be read.
    #[error("Failed to read signing key file '{path}': {message}")]
    KeyFile {
        /// Path that could not be read.
        path: String,
        /// Description of the I/O failure.
        message: String,
    },

    /// The signing key material is missing or malformed.
    #[error("Invalid signing key material: {0}")]
    KeyMaterial(#[from] aegis_auth::token::JwtError),

    /// Seeding users or clients failed.
    #[error("Failed to seed storage: {0}")]
    Seed(#[from] aegis_auth::error::AuthError),

    /// Seed password hashing failed.
    #[error("Failed to hash seed credential: {0}")]
    Hash(String),
}

/// The fully wired service graph.
///
/// Services are constructed once at startup and shared via `Arc`; request
/// handlers receive them through per-endpoint Axum state. There are no
/// process-wide globals.
pub struct Services {
    /// Server configuration the services were built from.
    pub config: ServerConfig,

    /// Process-wide JWT signing/verification.
    pub jwt_service: Arc<JwtService>,

    /// Authorization request validation and code minting.
    pub authorization_service: Arc<AuthorizationService>,

    /// Code exchange, refresh rotation, and revocation.
    pub token_service: Arc<TokenService>,

    /// Resource-side token verification.
    pub verifier: Arc<TokenVerifier>,

    /// User storage handle.
    pub user_storage: Arc<dyn UserStorage>,

    /// Client storage handle.
    pub client_storage: Arc<dyn ClientStorage>,

    /// Authorization code storage handle.
    pub code_storage: Arc<dyn AuthorizationCodeStorage>,

    /// Refresh token storage handle.
    pub refresh_token_storage: Arc<dyn RefreshTokenStorage>,
}

/// Builds the service graph from configuration.
///
/// Loads (or generates) the signing key, constructs the in-memory storage
/// backends, seeds them, and wires the services.
///
/// # Errors
///
/// Returns a [`BootstrapError`] on any failure; callers exit the process.
pub async fn build_services(config: ServerConfig) -> Result<Services, BootstrapError> {
    let signing_key = load_signing_key(&config.auth.signing)?;
    tracing::info!(kid = %signing_key.kid, "Signing key ready");

    let jwt_service = Arc::new(JwtService::new(signing_key, config.auth.issuer.clone()));

    let user_storage: Arc<dyn UserStorage> = Arc::new(MemoryUserStorage::new());
    let client_storage: Arc<dyn ClientStorage> = Arc::new(MemoryClientStorage::new());
    let code_storage: Arc<dyn AuthorizationCodeStorage> =
        Arc::new(MemoryAuthorizationCodeStorage::new());
    let refresh_token_storage: Arc<dyn RefreshTokenStorage> =
        Arc::new(MemoryRefreshTokenStorage::new());

    seed_users(&config.seed.users, user_storage.as_ref()).await?;
    seed_clients(&config.seed.clients, client_storage.as_ref()).await?;

    let authorization_service = Arc::new(AuthorizationService::new(
        client_storage.clone(),
        code_storage.clone(),
        CredentialVerifier::new(user_storage.clone()),
        config.auth.oauth.authorization_code_lifetime,
    ));

    let token_config = TokenConfig::new(config.auth.issuer.clone())
        .with_access_token_lifetime(to_time_duration(config.auth.oauth.access_token_lifetime))
        .with_refresh_token_lifetime(to_time_duration(config.auth.oauth.refresh_token_lifetime))
        .with_id_token_lifetime(to_time_duration(config.auth.oauth.id_token_lifetime));

    let token_service = Arc::new(TokenService::new(
        jwt_service.clone(),
        code_storage.clone(),
        refresh_token_storage.clone(),
        user_storage.clone(),
        token_config,
    ));

    let verifier = Arc::new(TokenVerifier::new(jwt_service.clone()));

    Ok(Services {
        config,
        jwt_service,
        authorization_service,
        token_service,
        verifier,
        user_storage,
        client_storage,
        code_storage,
        refresh_token_storage,
    })
}

/// Loads the signing key from PEM files, or generates an ephemeral dev key.
fn load_signing_key(signing: &SigningConfig) -> Result<SigningKeyPair, BootstrapError> {
    if signing.has_key_files() {
        // validate() guarantees both paths are present together
        let private_path = signing.private_key_path.as_deref().unwrap_or_default();
        let public_path = signing.public_key_path.as_deref().unwrap_or_default();

        let private_pem = std::fs::read_to_string(private_path).map_err(|e| {
            BootstrapError::KeyFile {
                path: private_path.to_string(),
                message: e.to_string(),
            }
        })?;
        let public_pem =
            std::fs::read_to_string(public_path).map_err(|e| BootstrapError::KeyFile {
                path: public_path.to_string(),
                message: e.to_string(),
            })?;

        Ok(SigningKeyPair::from_pem(
            signing.kid.clone(),
            &private_pem,
            &public_pem,
        )?)
    } else {
        tracing::warn!(
            "No signing key files configured; generating an ephemeral key. \
             Tokens will not survive a restart."
        );
        Ok(SigningKeyPair::generate_rsa(signing.kid.clone())?)
    }
}

/// Seeds users, hashing their passwords.
async fn seed_users(
    users: &[SeedUser],
    storage: &dyn UserStorage,
) -> Result<(), BootstrapError> {
    for seed in users {
        let hash = hash_password(&seed.password).map_err(|e| BootstrapError::Hash(e.to_string()))?;

        let mut builder = UserBuilder::new(seed.username.as_str()).password_hash(hash);
        if let Some(ref name) = seed.name {
            builder = builder.name(name.as_str());
        }
        if let Some(ref email) = seed.email {
            builder = builder.email(email.as_str());
        }

        let user = builder.build();
        storage.create(&user).await?;
        tracing::info!(username = %user.username, user_id = %user.id, "Seeded user");
    }
    Ok(())
}

/// Seeds client registrations, hashing any secrets.
async fn seed_clients(
    clients: &[SeedClient],
    storage: &dyn ClientStorage,
) -> Result<(), BootstrapError> {
    for seed in clients {
        let client_secret = match seed.client_secret.as_deref() {
            Some(secret) => {
                Some(hash_password(secret).map_err(|e| BootstrapError::Hash(e.to_string()))?)
            }
            None => None,
        };

        let client = Client {
            client_id: seed.client_id.clone(),
            client_secret,
            name: seed.name.clone(),
            description: None,
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            redirect_uris: seed.redirect_uris.clone(),
            scopes: seed.scopes.clone(),
            confidential: seed.confidential,
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        };

        storage.create(&client).await?;
        tracing::info!(client_id = %client.client_id, "Seeded client");
    }
    Ok(())
}

/// Converts a `std::time::Duration` to a `time::Duration`.
fn to_time_duration(d: std::time::Duration) -> time::Duration {
    time::Duration::seconds(d.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;

    fn test_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.auth.issuer = "https://id.test.example".to_string();
        config.seed = SeedConfig {
            users: vec![SeedUser {
                username: "alice".to_string(),
                password: "wonderland".to_string(),
                name: Some("Alice Example".to_string()),
                email: Some("alice@example.com".to_string()),
            }],
            clients: vec![SeedClient {
                client_id: "spa-client".to_string(),
                name: "Demo SPA".to_string(),
                redirect_uris: vec!["http://localhost:3000/callback".to_string()],
                scopes: vec![],
                confidential: false,
                client_secret: None,
            }],
        };
        config
    }

    #[tokio::test]
    async fn test_build_services_seeds_storage() {
        let services = build_services(test_config()).await.unwrap();

        let user = services
            .user_storage
            .find_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name.as_deref(), Some("Alice Example"));
        assert!(user.password_hash.as_deref().unwrap().starts_with("$argon2id$"));

        let client = services
            .client_storage
            .find_by_client_id("spa-client")
            .await
            .unwrap()
            .unwrap();
        assert!(!client.confidential);
        assert_eq!(client.redirect_uris.len(), 1);
    }

    #[tokio::test]
    async fn test_build_services_dev_key() {
        let services = build_services(test_config()).await.unwrap();
        assert_eq!(services.jwt_service.current_kid(), "aegis-key-1");
        assert_eq!(services.jwt_service.issuer(), "https://id.test.example");
    }

    #[tokio::test]
    async fn test_missing_key_file_is_fatal() {
        let mut config = test_config();
        config.auth.signing.private_key_path = Some("/nonexistent/key.pem".to_string());
        config.auth.signing.public_key_path = Some("/nonexistent/key.pub.pem".to_string());

        let result = build_services(config).await;
        assert!(matches!(result, Err(BootstrapError::KeyFile { .. })));
    }

    #[tokio::test]
    async fn test_confidential_seed_client_secret_is_hashed() {
        let mut config = test_config();
        config.seed.clients[0].confidential = true;
        config.seed.clients[0].client_secret = Some("topsecret".to_string());

        let services = build_services(config).await.unwrap();
        let client = services
            .client_storage
            .find_by_client_id("spa-client")
            .await
            .unwrap()
            .unwrap();

        let stored = client.client_secret.unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert_ne!(stored, "topsecret");

        assert!(
            services
                .client_storage
                .verify_secret("spa-client", "topsecret")
                .await
                .unwrap()
        );
    }
}
