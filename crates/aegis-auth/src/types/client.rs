//! OAuth 2.0 Client domain types.
//!
//! This module defines the `Client` struct and related types for OAuth 2.0
//! client registrations. Registrations are immutable during flow processing
//! and looked up by identifier for every authorize/token request.

use serde::{Deserialize, Serialize};

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types.
///
/// Defines the authorization flows a client is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow (with mandatory PKCE).
    AuthorizationCode,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 client registration.
///
/// Represents a registered relying party with credentials and configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Argon2-hashed client secret (for confidential clients).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// Detailed description of the client application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// OAuth 2.0 grant types this client is allowed to use.
    pub grant_types: Vec<GrantType>,

    /// Allowed redirect URIs for authorization code flow.
    /// Compared by exact match.
    #[serde(default)]
    pub redirect_uris: Vec<String>,

    /// OAuth scopes this client is allowed to request.
    /// Empty list means all scopes are allowed.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Whether this is a confidential client (has client secret).
    pub confidential: bool,

    /// Whether this client is currently active and can be used.
    pub active: bool,

    /// Access token lifetime in seconds, overriding the server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,

    /// Refresh token lifetime in seconds, overriding the server default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,
}

impl Client {
    /// Validates the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client configuration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.grant_types.is_empty() {
            return Err(ClientValidationError::NoGrantTypes);
        }

        // Confidential clients must have a client secret
        if self.confidential && self.client_secret.is_none() {
            return Err(ClientValidationError::MissingSecret);
        }

        // Authorization code flow requires redirect URIs
        if self.grant_types.contains(&GrantType::AuthorizationCode) && self.redirect_uris.is_empty()
        {
            return Err(ClientValidationError::NoRedirectUris);
        }

        Ok(())
    }

    /// Checks if the given redirect URI is allowed for this client.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }

    /// Checks if the given scope is allowed for this client.
    ///
    /// An empty scopes list means all scopes are allowed.
    #[must_use]
    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        if self.scopes.is_empty() {
            return true;
        }
        self.scopes.iter().any(|allowed| allowed == scope)
    }

    /// Checks if the given grant type is allowed for this client.
    #[must_use]
    pub fn is_grant_type_allowed(&self, grant_type: GrantType) -> bool {
        self.grant_types.contains(&grant_type)
    }

    /// Returns the access token lifetime in seconds, if overridden.
    #[must_use]
    pub fn access_token_lifetime_secs(&self) -> Option<i64> {
        self.access_token_lifetime
    }

    /// Returns the refresh token lifetime in seconds, if overridden.
    #[must_use]
    pub fn refresh_token_lifetime_secs(&self) -> Option<i64> {
        self.refresh_token_lifetime
    }
}

/// Errors from validating a client registration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClientValidationError {
    /// The client_id field is empty.
    #[error("client_id must not be empty")]
    EmptyClientId,

    /// The name field is empty.
    #[error("name must not be empty")]
    EmptyName,

    /// No grant types are configured.
    #[error("at least one grant type is required")]
    NoGrantTypes,

    /// A confidential client has no secret.
    #[error("confidential clients must have a client secret")]
    MissingSecret,

    /// Authorization code flow without redirect URIs.
    #[error("authorization_code grant requires at least one redirect URI")]
    NoRedirectUris,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_client() -> Client {
        Client {
            client_id: "spa-client".to_string(),
            client_secret: None,
            name: "Single Page App".to_string(),
            description: None,
            grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            scopes: vec![],
            confidential: false,
            active: true,
            access_token_lifetime: None,
            refresh_token_lifetime: None,
        }
    }

    #[test]
    fn test_grant_type_as_str() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
        assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
    }

    #[test]
    fn test_valid_client_passes() {
        assert!(valid_client().validate().is_ok());
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let mut client = valid_client();
        client.client_id = String::new();
        assert_eq!(
            client.validate(),
            Err(ClientValidationError::EmptyClientId)
        );
    }

    #[test]
    fn test_confidential_without_secret_rejected() {
        let mut client = valid_client();
        client.confidential = true;
        assert_eq!(client.validate(), Err(ClientValidationError::MissingSecret));
    }

    #[test]
    fn test_auth_code_without_redirects_rejected() {
        let mut client = valid_client();
        client.redirect_uris.clear();
        assert_eq!(
            client.validate(),
            Err(ClientValidationError::NoRedirectUris)
        );
    }

    #[test]
    fn test_redirect_uri_exact_match() {
        let client = valid_client();
        assert!(client.is_redirect_uri_allowed("https://app.example.com/callback"));
        // No prefix or case-insensitive matching
        assert!(!client.is_redirect_uri_allowed("https://app.example.com/callback/extra"));
        assert!(!client.is_redirect_uri_allowed("https://APP.example.com/callback"));
        assert!(!client.is_redirect_uri_allowed("http://app.example.com/callback"));
    }

    #[test]
    fn test_scope_allowed_empty_list_allows_all() {
        let client = valid_client();
        assert!(client.is_scope_allowed("openid"));
        assert!(client.is_scope_allowed("anything"));
    }

    #[test]
    fn test_scope_allowed_restricted() {
        let mut client = valid_client();
        client.scopes = vec!["openid".to_string(), "profile".to_string()];
        assert!(client.is_scope_allowed("openid"));
        assert!(client.is_scope_allowed("profile"));
        assert!(!client.is_scope_allowed("email"));
    }

    #[test]
    fn test_grant_type_allowed() {
        let client = valid_client();
        assert!(client.is_grant_type_allowed(GrantType::AuthorizationCode));
        assert!(client.is_grant_type_allowed(GrantType::RefreshToken));

        let mut no_refresh = valid_client();
        no_refresh.grant_types = vec![GrantType::AuthorizationCode];
        assert!(!no_refresh.is_grant_type_allowed(GrantType::RefreshToken));
    }

    #[test]
    fn test_serialization_skips_secret_when_absent() {
        let client = valid_client();
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains(r#""clientId":"spa-client""#));
        assert!(!json.contains("clientSecret"));
    }
}
