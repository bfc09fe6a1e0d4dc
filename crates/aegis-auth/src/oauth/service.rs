//! OAuth authorization service.
//!
//! Validates authorization requests and mints authorization codes after a
//! successful resource-owner login.
//!
//! # Security Requirements
//!
//! - PKCE is required for every request (S256 method only)
//! - The redirect URI must exactly match a registered URI
//! - Authorization codes are 256-bit random values expiring after a
//!   configurable lifetime (default 5 minutes)
//! - Authorization codes and credentials are never logged
//!
//! # Usage
//!
//! ```ignore
//! use aegis_auth::oauth::{AuthorizationService, AuthorizationRequest};
//!
//! let service = AuthorizationService::new(
//!     client_storage,
//!     code_storage,
//!     credential_verifier,
//!     code_lifetime,
//! );
//!
//! // GET /authorize: validate before rendering the login form
//! let client = service.validate_request(&request).await?;
//!
//! // POST /login: authenticate and mint the code
//! match service.login(&request, "alice", "password").await? {
//!     LoginOutcome::Authenticated { redirect_url } => { /* 302 */ }
//!     LoginOutcome::BadCredentials => { /* 401, re-render form */ }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration as StdDuration;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::AuthResult;
use crate::credentials::CredentialVerifier;
use crate::error::AuthError;
use crate::oauth::authorize::{AuthorizationRequest, AuthorizationResponse};
use crate::oauth::code::AuthorizationCode;
use crate::oauth::pkce::{self, CodeChallenge};
use crate::storage::AuthorizationCodeStorage;
use crate::storage::client::ClientStorage;
use crate::types::{Client, GrantType};

/// Outcome of a login attempt.
#[derive(Debug)]
pub enum LoginOutcome {
    /// The resource owner authenticated; redirect to the client with a code.
    Authenticated {
        /// Full redirect URL including `code` and echoed `state`.
        redirect_url: String,
    },

    /// Unknown user or wrong password. The login form should be re-rendered
    /// with a generic failure message and a 401 status.
    BadCredentials,
}

/// Authorization service for handling OAuth 2.0 authorization requests.
///
/// Validates authorization requests against the client registry and, after
/// a successful login, persists a single-use authorization code bound to
/// the request's client, redirect URI, scope, and PKCE challenge.
pub struct AuthorizationService {
    /// Client storage for looking up registered clients.
    client_storage: Arc<dyn ClientStorage>,

    /// Storage for authorization codes.
    code_storage: Arc<dyn AuthorizationCodeStorage>,

    /// Resource-owner credential verification.
    credential_verifier: CredentialVerifier,

    /// Authorization code lifetime.
    code_lifetime: Duration,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    ///
    /// # Arguments
    ///
    /// * `client_storage` - Storage for looking up registered clients
    /// * `code_storage` - Storage for authorization codes
    /// * `credential_verifier` - Resource-owner authentication
    /// * `code_lifetime` - How long minted codes remain exchangeable
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        credential_verifier: CredentialVerifier,
        code_lifetime: StdDuration,
    ) -> Self {
        Self {
            client_storage,
            code_storage,
            credential_verifier,
            code_lifetime: Duration::seconds(code_lifetime.as_secs() as i64),
        }
    }

    /// Validates an authorization request.
    ///
    /// This runs before the login form is rendered and again when the form
    /// is submitted, since the form carries the request parameters through.
    ///
    /// # Returns
    ///
    /// Returns the validated client on success.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Client is unknown or inactive (`InvalidClient`)
    /// - Redirect URI is not registered (`InvalidClient`)
    /// - `response_type` is not "code" (`UnsupportedResponseType`)
    /// - Client is not allowed the authorization_code grant (`InvalidGrant`)
    /// - `code_challenge_method` is not "S256" or the challenge is
    ///   malformed (`InvalidRequest`) — the "plain" method is rejected here
    /// - A requested scope is not allowed for the client (`InvalidScope`)
    pub async fn validate_request(&self, request: &AuthorizationRequest) -> AuthResult<Client> {
        // 1. Validate client exists and is active. The client and redirect
        //    URI are checked before anything else so that errors for an
        //    unknown client are never redirected to an unverified URI.
        let client = self
            .client_storage
            .find_by_client_id(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

        if !client.active {
            return Err(AuthError::invalid_client("Client is inactive"));
        }

        // 2. Validate redirect_uri against the registered allow-list
        if !client.is_redirect_uri_allowed(&request.redirect_uri) {
            return Err(AuthError::invalid_client(
                "redirect_uri is not registered for this client",
            ));
        }

        // 3. Validate response_type
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        // 4. Validate grant type is allowed
        if !client.is_grant_type_allowed(GrantType::AuthorizationCode) {
            return Err(AuthError::invalid_grant(
                "Client is not authorized for authorization_code grant",
            ));
        }

        // 5. PKCE is mandatory for every client. The request type already
        //    requires the fields; reject empty values and non-S256 methods.
        if request.code_challenge.is_empty() {
            return Err(AuthError::invalid_request(
                "code_challenge is required",
            ));
        }

        pkce::require_s256(&request.code_challenge_method)?;
        CodeChallenge::parse(&request.code_challenge)?;

        // 6. Validate scopes are allowed for this client
        for scope in request.scope.split_whitespace() {
            if !client.is_scope_allowed(scope) {
                return Err(AuthError::invalid_scope(format!(
                    "Scope '{scope}' is not allowed for this client"
                )));
            }
        }

        Ok(client)
    }

    /// Authenticates the resource owner and mints an authorization code.
    ///
    /// Re-validates the carried-through authorization request, checks the
    /// credentials, and on success persists a single-use code bound to the
    /// request and returns the redirect URL.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid authorization parameters or storage
    /// failures. Credential mismatches are reported as
    /// [`LoginOutcome::BadCredentials`], not as errors.
    pub async fn login(
        &self,
        request: &AuthorizationRequest,
        username: &str,
        password: &str,
    ) -> AuthResult<LoginOutcome> {
        // The form parameters are client-controlled; validate them again.
        let client = self.validate_request(request).await?;

        let Some(user) = self
            .credential_verifier
            .authenticate(username, password)
            .await?
        else {
            tracing::info!(client_id = %client.client_id, "Login failed");
            return Ok(LoginOutcome::BadCredentials);
        };

        let code = self.mint_code(request, user.id).await?;

        tracing::info!(
            client_id = %client.client_id,
            user_id = %user.id,
            "Authorization code issued"
        );

        let redirect_url = AuthorizationResponse::new(code, request.state.clone())
            .to_redirect_url(&request.redirect_uri)
            .map_err(|e| AuthError::internal(format!("Failed to build redirect URL: {e}")))?;

        Ok(LoginOutcome::Authenticated { redirect_url })
    }

    /// Creates and persists an authorization code bound to the request.
    async fn mint_code(&self, request: &AuthorizationRequest, user_id: Uuid) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc();
        let record = AuthorizationCode {
            id: Uuid::new_v4(),
            code: AuthorizationCode::generate_code(),
            client_id: request.client_id.clone(),
            user_id,
            redirect_uri: request.redirect_uri.clone(),
            scope: request.scope.clone(),
            code_challenge: request.code_challenge.clone(),
            nonce: request.nonce.clone(),
            created_at: now,
            expires_at: now + self.code_lifetime,
            consumed_at: None,
        };

        self.code_storage.create(&record).await?;

        Ok(record.code)
    }
}
