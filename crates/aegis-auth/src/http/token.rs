//! OAuth 2.0 Token endpoint handler.
//!
//! This module provides the HTTP handler for the token endpoint (`/token`).
//! It supports the following grant types:
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `refresh_token` - Rotate a refresh token into a new pair
//!
//! # Example
//!
//! ```ignore
//! POST /token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! &code_verifier=dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk
//! &client_id=my-app
//! ```

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::Engine;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::oauth::token::{TokenErrorBody, TokenErrorCode, TokenRequest, TokenResponse};
use crate::storage::ClientStorage;
use crate::token::service::TokenService;
use crate::types::Client;

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    /// Token service for issuing and rotating tokens.
    pub token_service: Arc<TokenService>,
    /// Client storage for authenticating clients.
    pub client_storage: Arc<dyn ClientStorage>,
}

impl TokenState {
    /// Creates a new token state.
    pub fn new(token_service: Arc<TokenService>, client_storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            token_service,
            client_storage,
        }
    }
}

/// OAuth 2.0 token endpoint handler.
///
/// Handles POST requests to `/token` with an
/// `application/x-www-form-urlencoded` body.
///
/// # Client Authentication
///
/// Clients can authenticate using:
/// - HTTP Basic Auth header: `Authorization: Basic <base64(client_id:client_secret)>`
/// - Request body: `client_id` and `client_secret` parameters
/// - Public client: just the `client_id` parameter (authorization_code with PKCE)
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(mut request): Form<TokenRequest>,
) -> Response {
    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "Processing token request"
    );

    // Extract client credentials from Authorization header or request body
    let client_auth = extract_client_auth(&headers, &request);

    // Look up and authenticate the client
    let client = match authenticate_client(&state.client_storage, client_auth, &mut request).await {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Client authentication failed");
            return token_error_response(&e);
        }
    };

    // Process the grant based on grant_type
    let result = match request.grant_type.as_str() {
        "authorization_code" => state.token_service.exchange_code(&request, &client).await,
        "refresh_token" => state.token_service.refresh(&request, &client).await,
        other => {
            warn!(grant_type = other, "Unsupported grant type");
            Err(AuthError::unsupported_grant_type(other))
        }
    };

    match result {
        Ok(response) => {
            info!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                "Token issued successfully"
            );
            token_success_response(response)
        }
        Err(e) => {
            warn!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                error = %e,
                "Token request failed"
            );
            token_error_response(&e)
        }
    }
}

/// Client authentication credentials extracted from the request.
pub(crate) enum ClientAuth {
    /// HTTP Basic authentication.
    Basic {
        client_id: String,
        client_secret: String,
    },
    /// Client credentials in request body.
    Body {
        client_id: String,
        client_secret: String,
    },
    /// Public client (no secret).
    Public { client_id: String },
    /// No client credentials provided.
    None,
}

/// Parses an `Authorization: Basic ...` header into id/secret.
pub(crate) fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let creds = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = creds.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}

/// Extract client authentication from headers and request.
pub(crate) fn extract_client_auth(headers: &HeaderMap, request: &TokenRequest) -> ClientAuth {
    // Try HTTP Basic Auth first
    if let Some(auth_header) = headers.get("authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some((client_id, client_secret)) = parse_basic_auth(auth_str)
    {
        return ClientAuth::Basic {
            client_id,
            client_secret,
        };
    }

    // Try client_id + client_secret in body
    if let (Some(client_id), Some(client_secret)) =
        (request.client_id.as_ref(), request.client_secret.as_ref())
    {
        return ClientAuth::Body {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        };
    }

    // Public client (client_id only)
    if let Some(client_id) = request.client_id.as_ref() {
        return ClientAuth::Public {
            client_id: client_id.clone(),
        };
    }

    ClientAuth::None
}

/// Authenticate the client based on provided credentials.
pub(crate) async fn authenticate_client(
    client_storage: &Arc<dyn ClientStorage>,
    auth: ClientAuth,
    request: &mut TokenRequest,
) -> Result<Client, AuthError> {
    let (client_id, secret) = match auth {
        ClientAuth::Basic {
            client_id,
            client_secret,
        } => {
            // Set client_id on request for downstream processing
            request.client_id = Some(client_id.clone());
            (client_id, Some(client_secret))
        }
        ClientAuth::Body {
            client_id,
            client_secret,
        } => (client_id, Some(client_secret)),
        ClientAuth::Public { client_id } => (client_id, None),
        ClientAuth::None => {
            return Err(AuthError::invalid_client("No client credentials provided"));
        }
    };

    // Look up the client
    let client = client_storage
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    // Check if client is active
    if !client.active {
        return Err(AuthError::invalid_client("Client is inactive"));
    }

    // Verify secret for confidential clients
    if client.confidential {
        let provided_secret = secret.ok_or_else(|| {
            AuthError::invalid_client("Client secret required for confidential client")
        })?;

        // Verify using storage (secrets are stored hashed)
        let valid = client_storage
            .verify_secret(&client_id, &provided_secret)
            .await?;

        if !valid {
            return Err(AuthError::invalid_client("Invalid client secret"));
        }
    }

    Ok(client)
}

/// Build a successful token response.
///
/// Token responses must not be cached (RFC 6749 §5.1).
fn token_success_response(response: TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}

/// Build an error response for the token endpoint.
fn token_error_response(error: &AuthError) -> Response {
    let (code, description) = match error {
        AuthError::InvalidClient { message } => (TokenErrorCode::InvalidClient, message.clone()),
        AuthError::InvalidGrant { message } => (TokenErrorCode::InvalidGrant, message.clone()),
        AuthError::InvalidScope { message } => (TokenErrorCode::InvalidScope, message.clone()),
        AuthError::InvalidRequest { message } => (TokenErrorCode::InvalidRequest, message.clone()),
        AuthError::UnsupportedGrantType { grant_type } => (
            TokenErrorCode::UnsupportedGrantType,
            format!("Grant type '{grant_type}' is not supported"),
        ),
        AuthError::PkceVerificationFailed => {
            (TokenErrorCode::InvalidGrant, "PKCE mismatch".to_string())
        }
        e if e.is_server_error() => {
            // No internal detail leaks to the client; the log line above
            // already captured the cause.
            (
                TokenErrorCode::ServerError,
                "The request could not be processed".to_string(),
            )
        }
        other => (TokenErrorCode::InvalidRequest, other.to_string()),
    };

    let token_error = TokenErrorBody::with_description(code, description);
    let status = match code.http_status() {
        401 => StatusCode::UNAUTHORIZED,
        500 => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };

    (
        status,
        [
            ("Content-Type", "application/json"),
            ("Cache-Control", "no-store"),
            ("Pragma", "no-cache"),
        ],
        Json(token_error),
    )
        .into_response()
}
