//! Refresh token revocation endpoint handler.
//!
//! This module provides the Axum handler for the `/revoke` endpoint.
//!
//! # Request Format
//!
//! ```text
//! POST /revoke
//! Content-Type: application/x-www-form-urlencoded
//!
//! token=<refresh_token>&client_id=my-app
//! ```
//!
//! # Response
//!
//! Revocation is idempotent: an unknown or already-revoked token is not an
//! error. The JSON body reports whether a record was actually revoked:
//!
//! ```json
//! {"revoked": true}
//! ```

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::oauth::token::{TokenErrorBody, TokenRequest};
use crate::storage::ClientStorage;
use crate::token::service::TokenService;

use super::token::{authenticate_client, extract_client_auth};

/// State required for the revocation endpoint.
#[derive(Clone)]
pub struct RevocationState {
    /// Token service for performing revocation.
    pub token_service: Arc<TokenService>,
    /// Client storage for authentication.
    pub client_storage: Arc<dyn ClientStorage>,
}

impl RevocationState {
    /// Creates a new revocation state.
    pub fn new(token_service: Arc<TokenService>, client_storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            token_service,
            client_storage,
        }
    }
}

/// Form parameters for the revocation endpoint.
#[derive(Debug, Deserialize)]
pub struct RevocationForm {
    /// The refresh token to revoke.
    pub token: String,

    /// Client ID (for public clients or when not using Basic auth).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl RevocationForm {
    /// Converts to a TokenRequest for client authentication.
    fn to_token_request(&self) -> TokenRequest {
        TokenRequest {
            grant_type: String::new(), // Not used for authentication
            code: None,
            redirect_uri: None,
            code_verifier: None,
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: None,
            scope: None,
        }
    }
}

/// Response body for the revocation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RevocationResponse {
    /// Whether a previously-active record was revoked.
    pub revoked: bool,
}

/// Refresh token revocation endpoint handler.
///
/// # Security
///
/// - Requires client authentication (same as the token endpoint)
/// - Idempotent: unknown tokens report `{"revoked": false}` with 200 OK,
///   so the endpoint reveals nothing about token existence to an
///   authenticated client beyond its own records
/// - Returns 401 for invalid client credentials
pub async fn revoke_handler(
    State(state): State<RevocationState>,
    headers: HeaderMap,
    Form(form): Form<RevocationForm>,
) -> Response {
    // Validate required token parameter
    if form.token.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(TokenErrorBody::invalid_request(
                "Missing required 'token' parameter",
            )),
        )
            .into_response();
    }

    // Authenticate client (same as token endpoint)
    let mut token_request = form.to_token_request();
    let client_auth = extract_client_auth(&headers, &token_request);
    let client =
        match authenticate_client(&state.client_storage, client_auth, &mut token_request).await {
            Ok(client) => client,
            Err(e) => {
                tracing::debug!(error = %e, "Revocation: client authentication failed");
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(TokenErrorBody::invalid_client(e.to_string())),
                )
                    .into_response();
            }
        };

    // Perform revocation
    match state.token_service.revoke(&form.token).await {
        Ok(revoked) => {
            tracing::info!(
                client_id = %client.client_id,
                revoked,
                "Token revocation processed"
            );
            (StatusCode::OK, Json(RevocationResponse { revoked })).into_response()
        }
        Err(e) => {
            tracing::error!(
                client_id = %client.client_id,
                error = %e,
                "Token revocation failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TokenErrorBody::with_description(
                    crate::oauth::token::TokenErrorCode::ServerError,
                    "The request could not be processed",
                )),
            )
                .into_response()
        }
    }
}
