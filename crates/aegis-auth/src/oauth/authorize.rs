//! Authorization endpoint types.
//!
//! Request parsing, redirect building, and error codes for the OAuth 2.0
//! authorization endpoint.
//!
//! # OAuth 2.0 Authorization Code Flow
//!
//! 1. Client redirects the resource owner to the authorization endpoint
//! 2. The owner authenticates with username and password
//! 3. Server redirects back to the client with an authorization code
//! 4. Client exchanges the code (plus PKCE verifier) at the token endpoint
//!
//! # Security Requirements
//!
//! - PKCE is required for every request (`code_challenge` and
//!   `code_challenge_method=S256`); the "plain" method is rejected
//! - The redirect URI must exactly match a registered URI

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization request parameters.
///
/// Received as query string parameters on the authorization endpoint and
/// carried through the login form. PKCE parameters are mandatory.
///
/// # Example
///
/// ```ignore
/// GET /authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &scope=openid profile
///   &state=abc123xyz
///   &code_challenge=E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM
///   &code_challenge_method=S256
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Must be "code" for authorization code flow.
    pub response_type: String,

    /// Client identifier issued during registration.
    pub client_id: String,

    /// Redirect URI where the response will be sent.
    /// Must exactly match one of the registered redirect URIs.
    pub redirect_uri: String,

    /// Requested scopes (space-separated). Optional.
    #[serde(default)]
    pub scope: String,

    /// CSRF protection state parameter, echoed back to the client. Optional.
    #[serde(default)]
    pub state: Option<String>,

    /// PKCE code challenge.
    /// Base64url-encoded SHA-256 hash of the code verifier.
    pub code_challenge: String,

    /// PKCE code challenge method. Must be "S256".
    pub code_challenge_method: String,

    /// OpenID Connect nonce (optional).
    /// Used to associate a client session with an ID token for replay protection.
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Authorization response parameters.
///
/// Returned as query string parameters on the redirect URI after a
/// successful login.
///
/// # Example
///
/// ```ignore
/// HTTP/1.1 302 Found
/// Location: https://app.example.com/callback?
///   code=SplxlOBeZQQYbYS6WxSbIA
///   &state=abc123xyz
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationResponse {
    /// Authorization code to be exchanged for tokens.
    /// Single-use; expires after a short time (5 minutes by default).
    pub code: String,

    /// Echoed state parameter for CSRF validation, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Creates a new authorization response.
    #[must_use]
    pub fn new(code: String, state: Option<String>) -> Self {
        Self { code, state }
    }

    /// Builds the redirect URL with response parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &self.code);
            if let Some(ref state) = self.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }
}

/// Authorization error response.
///
/// Communicated via redirect to the client's redirect URI (when the
/// redirect URI itself has been validated) or rendered to the user.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationError {
    /// OAuth 2.0 error code.
    pub error: AuthorizationErrorCode,

    /// Human-readable error description (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    /// Echoed state parameter, when supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl AuthorizationError {
    /// Creates a new authorization error.
    #[must_use]
    pub fn new(error: AuthorizationErrorCode, state: Option<String>) -> Self {
        Self {
            error,
            error_description: None,
            state,
        }
    }

    /// Creates a new authorization error with description.
    #[must_use]
    pub fn with_description(
        error: AuthorizationErrorCode,
        description: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
            state,
        }
    }

    /// Builds the redirect URL with error parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI cannot be parsed.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, url::ParseError> {
        let mut url = url::Url::parse(redirect_uri)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("error", self.error.as_str());
            if let Some(ref desc) = self.error_description {
                pairs.append_pair("error_description", desc);
            }
            if let Some(ref state) = self.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.to_string())
    }
}

/// OAuth 2.0 authorization error codes (RFC 6749 §4.1.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationErrorCode {
    /// The request is missing a required parameter, includes an invalid
    /// parameter value, or is otherwise malformed.
    InvalidRequest,

    /// The client is not authorized to request an authorization code
    /// using this method.
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    AccessDenied,

    /// The authorization server does not support obtaining an authorization
    /// code using this method.
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    InvalidScope,

    /// The authorization server encountered an unexpected condition.
    ServerError,
}

impl AuthorizationErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_request_deserialize() {
        let json = r#"{
            "response_type": "code",
            "client_id": "my-app",
            "redirect_uri": "https://app.example.com/callback",
            "scope": "openid profile",
            "state": "abc123xyz",
            "code_challenge": "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            "code_challenge_method": "S256"
        }"#;

        let request: AuthorizationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.response_type, "code");
        assert_eq!(request.client_id, "my-app");
        assert_eq!(request.redirect_uri, "https://app.example.com/callback");
        assert_eq!(request.scope, "openid profile");
        assert_eq!(request.state, Some("abc123xyz".to_string()));
        assert_eq!(
            request.code_challenge,
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
        assert_eq!(request.code_challenge_method, "S256");
        assert!(request.nonce.is_none());
    }

    #[test]
    fn test_authorization_request_optional_state() {
        let json = r#"{
            "response_type": "code",
            "client_id": "my-app",
            "redirect_uri": "https://app.example.com/callback",
            "code_challenge": "challenge123",
            "code_challenge_method": "S256",
            "nonce": "nonce-456"
        }"#;

        let request: AuthorizationRequest = serde_json::from_str(json).unwrap();
        assert!(request.state.is_none());
        assert!(request.scope.is_empty());
        assert_eq!(request.nonce, Some("nonce-456".to_string()));
    }

    #[test]
    fn test_authorization_response_to_redirect_url() {
        let response = AuthorizationResponse::new(
            "code123".to_string(),
            Some("state456".to_string()),
        );

        let url = response
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(url.starts_with("https://app.example.com/callback?"));
        assert!(url.contains("code=code123"));
        assert!(url.contains("state=state456"));
    }

    #[test]
    fn test_authorization_response_without_state() {
        let response = AuthorizationResponse::new("code123".to_string(), None);

        let url = response
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(url.contains("code=code123"));
        assert!(!url.contains("state="));
    }

    #[test]
    fn test_authorization_error_serialize() {
        let error = AuthorizationError::with_description(
            AuthorizationErrorCode::InvalidRequest,
            "Missing required parameter: code_challenge",
            Some("abc123".to_string()),
        );

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""error":"invalid_request""#));
        assert!(json.contains(r#""error_description":"Missing required parameter: code_challenge""#));
        assert!(json.contains(r#""state":"abc123""#));
    }

    #[test]
    fn test_authorization_error_to_redirect_url() {
        let error = AuthorizationError::with_description(
            AuthorizationErrorCode::InvalidScope,
            "Unknown scope",
            Some("state123".to_string()),
        );

        let url = error
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();

        assert!(url.starts_with("https://app.example.com/callback?"));
        assert!(url.contains("error=invalid_scope"));
        assert!(url.contains("error_description=Unknown+scope"));
        assert!(url.contains("state=state123"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(
            AuthorizationErrorCode::InvalidRequest.as_str(),
            "invalid_request"
        );
        assert_eq!(
            AuthorizationErrorCode::UnauthorizedClient.as_str(),
            "unauthorized_client"
        );
        assert_eq!(
            AuthorizationErrorCode::AccessDenied.as_str(),
            "access_denied"
        );
        assert_eq!(
            AuthorizationErrorCode::UnsupportedResponseType.as_str(),
            "unsupported_response_type"
        );
        assert_eq!(AuthorizationErrorCode::ServerError.as_str(), "server_error");
    }

    #[test]
    fn test_error_code_serde_roundtrip() {
        let codes = vec![
            AuthorizationErrorCode::InvalidRequest,
            AuthorizationErrorCode::UnauthorizedClient,
            AuthorizationErrorCode::AccessDenied,
            AuthorizationErrorCode::UnsupportedResponseType,
            AuthorizationErrorCode::InvalidScope,
            AuthorizationErrorCode::ServerError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let deserialized: AuthorizationErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, deserialized);
        }
    }
}
