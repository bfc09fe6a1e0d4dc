//! Resource-side access token verification.
//!
//! Protected resources validate presented bearer tokens against the
//! server's public key set: signature (selected by `kid`), issuer, expiry,
//! audience, and optionally a required scope.
//!
//! Scope failures are deliberately distinct from token failures: a valid
//! token missing a required scope is `InsufficientScope` (HTTP 403), while
//! a bad signature, wrong issuer/audience, or expired token is
//! `InvalidToken` (HTTP 401).

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::jwt::{AccessTokenClaims, JwtError, JwtService};

/// Verifies access tokens presented to protected resources.
///
/// Shares the process-wide [`JwtService`] (and therefore its public key)
/// with the issuing side but performs the resource-side checks: audience
/// pinning and scope containment.
pub struct TokenVerifier {
    jwt_service: Arc<JwtService>,
}

impl TokenVerifier {
    /// Creates a new token verifier.
    #[must_use]
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    /// Validates a bearer token for resource access.
    ///
    /// Checks, in order: signature (by `kid`), issuer, expiry, audience,
    /// and - when `required_scope` is given - containment in the
    /// space-delimited `scope` claim.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] when `exp` has passed (401)
    /// - [`AuthError::InvalidToken`] for signature/issuer/audience/format
    ///   failures (401)
    /// - [`AuthError::InsufficientScope`] when the token is valid but the
    ///   required scope is missing (403)
    pub fn verify(
        &self,
        bearer_token: &str,
        expected_audience: &str,
        required_scope: Option<&str>,
    ) -> AuthResult<AccessTokenClaims> {
        let claims = self.decode(bearer_token)?;

        if !claims.aud.iter().any(|aud| aud == expected_audience) {
            return Err(AuthError::invalid_token("Audience mismatch"));
        }

        if let Some(scope) = required_scope
            && !claims.has_scope(scope)
        {
            return Err(AuthError::insufficient_scope(scope));
        }

        Ok(claims)
    }

    /// Decodes a bearer token, validating signature, issuer, and expiry.
    ///
    /// Used by the issuing server itself (e.g. the userinfo endpoint),
    /// which accepts its own tokens for any registered relying party and
    /// so does not pin a single audience. External resource servers use
    /// [`TokenVerifier::verify`] instead.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` or `InvalidToken`.
    pub fn decode(&self, bearer_token: &str) -> AuthResult<AccessTokenClaims> {
        let data = self
            .jwt_service
            .decode::<AccessTokenClaims>(bearer_token)
            .map_err(|e| match e {
                JwtError::Expired => AuthError::TokenExpired,
                other => {
                    tracing::debug!(error = %other, "Bearer token rejected");
                    AuthError::invalid_token(other.to_string())
                }
            })?;

        Ok(data.claims)
    }

    /// Gets the JWT service reference.
    #[must_use]
    pub fn jwt_service(&self) -> &Arc<JwtService> {
        &self.jwt_service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::jwt::SigningKeyPair;

    const ISSUER: &str = "https://id.example.com";

    fn test_verifier() -> (TokenVerifier, Arc<JwtService>) {
        let key_pair = SigningKeyPair::generate_rsa("test-key").unwrap();
        let jwt_service = Arc::new(JwtService::new(key_pair, ISSUER));
        (TokenVerifier::new(jwt_service.clone()), jwt_service)
    }

    fn make_token(jwt_service: &JwtService, aud: &str, scope: &str, expires_in: i64) -> String {
        let claims = AccessTokenClaims::builder(ISSUER, "user-1", aud)
            .audience(vec![aud.to_string()])
            .scope(scope)
            .expires_in_seconds(expires_in)
            .build();
        jwt_service.encode(&claims).unwrap()
    }

    #[test]
    fn test_verify_success() {
        let (verifier, jwt) = test_verifier();
        let token = make_token(&jwt, "spa-client", "openid profile", 900);

        let claims = verifier.verify(&token, "spa-client", None).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.scope, "openid profile");
    }

    #[test]
    fn test_verify_with_required_scope() {
        let (verifier, jwt) = test_verifier();
        let token = make_token(&jwt, "spa-client", "openid profile", 900);

        assert!(verifier.verify(&token, "spa-client", Some("openid")).is_ok());
        assert!(verifier.verify(&token, "spa-client", Some("profile")).is_ok());
    }

    #[test]
    fn test_verify_insufficient_scope_is_distinct() {
        let (verifier, jwt) = test_verifier();
        let token = make_token(&jwt, "spa-client", "openid", 900);

        let result = verifier.verify(&token, "spa-client", Some("admin"));
        let err = result.unwrap_err();
        assert!(matches!(err, AuthError::InsufficientScope { .. }));
        assert_eq!(err.http_status(), 403);
    }

    #[test]
    fn test_verify_audience_mismatch() {
        let (verifier, jwt) = test_verifier();
        let token = make_token(&jwt, "spa-client", "openid", 900);

        let result = verifier.verify(&token, "other-resource", None);
        let err = result.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn test_verify_expired_token() {
        let (verifier, jwt) = test_verifier();
        let token = make_token(&jwt, "spa-client", "openid", -3600);

        let result = verifier.verify(&token, "spa-client", None);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_verify_foreign_signature() {
        let (verifier, _) = test_verifier();

        // Token signed by a different key
        let foreign_key = SigningKeyPair::generate_rsa("foreign").unwrap();
        let foreign = JwtService::new(foreign_key, ISSUER);
        let token = make_token(&foreign, "spa-client", "openid", 900);

        let result = verifier.verify(&token, "spa-client", None);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_verify_wrong_issuer() {
        let (verifier, _) = test_verifier();

        let key_pair = SigningKeyPair::generate_rsa("test-key-2").unwrap();
        let other = JwtService::new(key_pair, "https://other.example.com");
        let claims = AccessTokenClaims::builder("https://other.example.com", "user-1", "spa-client")
            .audience(vec!["spa-client".to_string()])
            .expires_in_seconds(900)
            .build();
        let token = other.encode(&claims).unwrap();

        let result = verifier.verify(&token, "spa-client", None);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_verify_garbage_token() {
        let (verifier, _) = test_verifier();
        let result = verifier.verify("not.a.jwt", "spa-client", None);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }
}
