//! Axum router assembly.
//!
//! Each endpoint group gets its own `Router` with exactly the state it
//! needs, then everything is merged. The well-known metadata endpoints
//! allow cross-origin GETs so browser-based relying parties can fetch
//! them directly.

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use aegis_auth::http::{
    AuthorizeState, DiscoveryState, JwksState, RevocationState, TokenState, authorize_handler,
    discovery_handler, jwks_handler, login_handler, revoke_handler, token_handler,
    userinfo_handler,
};
use aegis_auth::middleware::VerifierState;

use crate::bootstrap::Services;

/// Scopes advertised in the discovery document.
const SUPPORTED_SCOPES: &[&str] = &["openid", "profile", "email", "offline_access"];

/// Builds the complete application router.
pub fn router(services: &Services) -> Router {
    let discovery = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(discovery_handler),
        )
        .with_state(DiscoveryState::new(
            services.config.auth.issuer.clone(),
            SUPPORTED_SCOPES.iter().map(ToString::to_string).collect(),
        ));

    let jwks = Router::new()
        .route("/.well-known/jwks.json", get(jwks_handler))
        .with_state(JwksState::new(services.jwt_service.clone()));

    // Metadata is public and cacheable; allow cross-origin GETs
    let well_known = discovery.merge(jwks).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET]),
    );

    let authorize = Router::new()
        .route("/authorize", get(authorize_handler))
        .route("/login", post(login_handler))
        .with_state(AuthorizeState::new(services.authorization_service.clone()));

    let token = Router::new()
        .route("/token", post(token_handler))
        .with_state(TokenState::new(
            services.token_service.clone(),
            services.client_storage.clone(),
        ));

    let userinfo = Router::new()
        .route("/userinfo", get(userinfo_handler))
        .with_state(VerifierState::new(
            services.verifier.clone(),
            services.user_storage.clone(),
        ));

    let revoke = Router::new()
        .route("/revoke", post(revoke_handler))
        .with_state(RevocationState::new(
            services.token_service.clone(),
            services.client_storage.clone(),
        ));

    Router::new()
        .merge(well_known)
        .merge(authorize)
        .merge(token)
        .merge(userinfo)
        .merge(revoke)
        .layer(TraceLayer::new_for_http())
}
