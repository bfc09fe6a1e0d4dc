//! OpenID Connect discovery HTTP handler.
//!
//! Provides the `/.well-known/openid-configuration` endpoint so relying
//! parties can locate the authorization, token, userinfo, JWKS, and
//! revocation endpoints and learn the server's supported capabilities.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

/// State for the discovery endpoint.
#[derive(Clone)]
pub struct DiscoveryState {
    /// Issuer URL; all advertised endpoints are derived from it.
    pub issuer: String,

    /// Scopes advertised in `scopes_supported`.
    pub supported_scopes: Vec<String>,
}

impl DiscoveryState {
    /// Creates a new discovery state.
    pub fn new(issuer: impl Into<String>, supported_scopes: Vec<String>) -> Self {
        Self {
            issuer: issuer.into(),
            supported_scopes,
        }
    }
}

/// Handler for `GET /.well-known/openid-configuration`.
///
/// Returns an OpenID Connect Discovery document. Uses the configured
/// issuer for all endpoint URLs, not the bind address.
pub async fn discovery_handler(State(state): State<DiscoveryState>) -> impl IntoResponse {
    let base = state.issuer.trim_end_matches('/');

    let doc = serde_json::json!({
        "issuer": base,
        "authorization_endpoint": format!("{base}/authorize"),
        "token_endpoint": format!("{base}/token"),
        "userinfo_endpoint": format!("{base}/userinfo"),
        "jwks_uri": format!("{base}/.well-known/jwks.json"),
        "revocation_endpoint": format!("{base}/revoke"),
        "scopes_supported": state.supported_scopes,
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "subject_types_supported": ["public"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "code_challenge_methods_supported": ["S256"],
        "token_endpoint_auth_methods_supported": ["client_secret_basic", "client_secret_post", "none"],
    });

    ([(header::CONTENT_TYPE, "application/json")], Json(doc))
}
