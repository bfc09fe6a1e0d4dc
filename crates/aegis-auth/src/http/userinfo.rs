//! OpenID Connect UserInfo endpoint.
//!
//! Provides the `/userinfo` endpoint for retrieving claims about the
//! authenticated resource owner per OpenID Connect Core 1.0.
//!
//! # Overview
//!
//! The UserInfo endpoint returns claims about the user identified by the
//! access token's `sub` claim. The `openid` scope is required; without it
//! the request fails with `insufficient_scope` (403), distinct from the
//! 401 returned for an invalid or expired token.
//!
//! # References
//!
//! - [OpenID Connect UserInfo](https://openid.net/specs/openid-connect-core-1_0.html#UserInfo)

use axum::{Json, http::header, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::middleware::BearerAuth;

// =============================================================================
// UserInfo Response
// =============================================================================

/// UserInfo response per OpenID Connect Core 1.0.
///
/// Contains claims about the authenticated user. Never includes the
/// password hash or any other secret material.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserInfoResponse {
    /// Subject identifier: the user's stable unique identifier, identical
    /// to the `sub` of the presented access token.
    pub sub: String,

    /// Full name of the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User's email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Username the user signs in with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
}

// =============================================================================
// HTTP Handler
// =============================================================================

/// Handler for `GET /userinfo`.
///
/// Returns claims about the authenticated user.
///
/// # Errors
///
/// - 401 if the token is missing, malformed, expired, or badly signed
/// - 403 (`insufficient_scope`) if the `openid` scope was not granted
///
/// # Example Response
///
/// ```json
/// {
///   "sub": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
///   "name": "Alice Example",
///   "email": "alice@example.com",
///   "preferred_username": "alice"
/// }
/// ```
pub async fn userinfo_handler(
    BearerAuth(auth): BearerAuth,
) -> Result<impl IntoResponse, AuthError> {
    // The openid scope gates the userinfo endpoint
    if !auth.claims.has_scope("openid") {
        return Err(AuthError::insufficient_scope("openid"));
    }

    // The user was loaded when the token was validated; a token whose
    // subject no longer exists does not reach this point.
    let user = auth.user;

    let response = UserInfoResponse {
        sub: auth.claims.sub.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        preferred_username: Some(user.username.clone()),
    };

    Ok(([(header::CONTENT_TYPE, "application/json")], Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_userinfo_response_serialization() {
        let response = UserInfoResponse {
            sub: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
            name: Some("Alice Example".to_string()),
            email: Some("alice@example.com".to_string()),
            preferred_username: Some("alice".to_string()),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""sub":"7c9e6679-7425-40de-944b-e07fc1f90ae7""#));
        assert!(json.contains(r#""name":"Alice Example""#));
        assert!(json.contains(r#""email":"alice@example.com""#));
        assert!(json.contains(r#""preferred_username":"alice""#));
    }

    #[test]
    fn test_userinfo_response_skips_missing_claims() {
        let response = UserInfoResponse {
            sub: "user-1".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""sub":"user-1""#));
        assert!(!json.contains("name"));
        assert!(!json.contains("email"));
    }
}
