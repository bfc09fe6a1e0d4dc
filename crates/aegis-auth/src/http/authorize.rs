//! OAuth 2.0 authorization and login endpoint handlers.
//!
//! Implements the authorization endpoint per RFC 6749 with a
//! server-rendered HTML login form.
//!
//! # Flow
//!
//! ```text
//! GET /authorize?client_id=...&redirect_uri=...&code_challenge=...
//!     ├─► Invalid client/redirect_uri → Render error page (no redirect)
//!     ├─► Other validation failure    → Render error page (400)
//!     └─► Valid → Render login form (authorize params as hidden fields)
//!
//! POST /login (form data: username, password + carried-through params)
//!     ├─► Bad credentials → 401, re-render login form
//!     └─► Success → Mint code → 302 redirect_uri?code=...&state=...
//! ```

use std::sync::Arc;

use axum::Form;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use crate::error::AuthError;
use crate::oauth::authorize::{AuthorizationError, AuthorizationErrorCode, AuthorizationRequest};
use crate::oauth::service::{AuthorizationService, LoginOutcome};

use super::templates::{render_error_page, render_login_form};

/// State for the authorize and login handlers.
#[derive(Clone)]
pub struct AuthorizeState {
    /// Authorization service for request validation and code minting.
    pub authorization_service: Arc<AuthorizationService>,
}

impl AuthorizeState {
    /// Creates a new authorize state.
    pub fn new(authorization_service: Arc<AuthorizationService>) -> Self {
        Self {
            authorization_service,
        }
    }
}

/// Form data for the login endpoint.
///
/// Carries the resource owner's credentials plus every authorization
/// request parameter, passed through the login form as hidden fields.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username entered by the resource owner.
    pub username: String,
    /// Password entered by the resource owner.
    pub password: String,

    /// Carried-through `response_type`.
    pub response_type: String,
    /// Carried-through `client_id`.
    pub client_id: String,
    /// Carried-through `redirect_uri`.
    pub redirect_uri: String,
    /// Carried-through `scope`.
    #[serde(default)]
    pub scope: String,
    /// Carried-through `state`.
    #[serde(default)]
    pub state: Option<String>,
    /// Carried-through `code_challenge`.
    pub code_challenge: String,
    /// Carried-through `code_challenge_method`.
    pub code_challenge_method: String,
    /// Carried-through `nonce`.
    #[serde(default)]
    pub nonce: Option<String>,
}

impl LoginRequest {
    /// Extracts the authorization request carried through the form.
    fn authorization_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: self.response_type.clone(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
            state: self.state.clone(),
            code_challenge: self.code_challenge.clone(),
            code_challenge_method: self.code_challenge_method.clone(),
            nonce: self.nonce.clone(),
        }
    }
}

/// Handler for `GET /authorize`.
///
/// Validates the authorization request and renders the login form. All
/// validation failures render an HTML error page; nothing is ever
/// redirected to an unvalidated redirect URI.
pub async fn authorize_handler(
    State(state): State<AuthorizeState>,
    Query(params): Query<AuthorizationRequest>,
) -> Response {
    match state.authorization_service.validate_request(&params).await {
        Ok(client) => {
            let html = render_login_form(&client.name, &params, None);
            Html(html).into_response()
        }
        Err(e) => authorize_error_response(&e),
    }
}

/// Handler for `POST /login`.
///
/// Re-validates the carried-through authorization request, authenticates
/// the resource owner, and on success redirects to the client with a
/// freshly minted authorization code (302).
///
/// Failed credentials re-render the login form with a 401 status; the
/// response does not reveal whether the username exists.
pub async fn login_handler(
    State(state): State<AuthorizeState>,
    Form(form): Form<LoginRequest>,
) -> Response {
    let params = form.authorization_request();

    let outcome = state
        .authorization_service
        .login(&params, &form.username, &form.password)
        .await;

    match outcome {
        Ok(LoginOutcome::Authenticated { redirect_url }) => {
            // 302 with the code bound to the client's redirect URI
            (
                StatusCode::FOUND,
                [(header::LOCATION, redirect_url)],
            )
                .into_response()
        }
        Ok(LoginOutcome::BadCredentials) => {
            // Re-render the form; deliberately the same message for an
            // unknown user and a wrong password.
            let client_name = state
                .authorization_service
                .validate_request(&params)
                .await
                .map(|c| c.name)
                .unwrap_or_else(|_| params.client_id.clone());

            let html = render_login_form(&client_name, &params, Some("Invalid username or password"));
            (StatusCode::UNAUTHORIZED, Html(html)).into_response()
        }
        Err(e) if e.is_server_error() => {
            // The redirect URI was validated before the failure, so the
            // error can be reported to the client per RFC 6749.
            tracing::error!(error = %e, "Login failed with server error");
            let error = AuthorizationError::with_description(
                AuthorizationErrorCode::ServerError,
                "The authorization request could not be completed",
                params.state.clone(),
            );
            match error.to_redirect_url(&params.redirect_uri) {
                Ok(url) => {
                    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
                }
                Err(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render_error_page("server_error", "Internal server error")),
                )
                    .into_response(),
            }
        }
        Err(e) => authorize_error_response(&e),
    }
}

/// Renders a validation failure as an HTML error page.
fn authorize_error_response(error: &AuthError) -> Response {
    let status = StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::BAD_REQUEST);

    // Internal details stay out of the page body for server errors
    let description = if error.is_server_error() {
        tracing::error!(error = %error, "Authorization request failed");
        "The authorization request could not be processed".to_string()
    } else {
        tracing::debug!(error = %error, "Authorization request rejected");
        error.to_string()
    };

    (
        status,
        Html(render_error_page(error.oauth_error_code(), &description)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_extracts_authorization_request() {
        let form = LoginRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
            response_type: "code".to_string(),
            client_id: "my-app".to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid".to_string(),
            state: Some("s".to_string()),
            code_challenge: "challenge".to_string(),
            code_challenge_method: "S256".to_string(),
            nonce: Some("n".to_string()),
        };

        let request = form.authorization_request();
        assert_eq!(request.response_type, "code");
        assert_eq!(request.client_id, "my-app");
        assert_eq!(request.redirect_uri, "https://app.example.com/callback");
        assert_eq!(request.scope, "openid");
        assert_eq!(request.state, Some("s".to_string()));
        assert_eq!(request.code_challenge, "challenge");
        assert_eq!(request.code_challenge_method, "S256");
        assert_eq!(request.nonce, Some("n".to_string()));
    }

    #[test]
    fn test_login_form_deserializes_from_urlencoded() {
        let body = "username=alice&password=pw&response_type=code&client_id=my-app\
                    &redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback\
                    &code_challenge=abc&code_challenge_method=S256";

        let form: LoginRequest = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(form.username, "alice");
        assert_eq!(form.client_id, "my-app");
        assert!(form.state.is_none());
        assert!(form.scope.is_empty());
    }
}
