//! Axum HTTP handlers for the OAuth/OIDC endpoints.
//!
//! | Endpoint | Handler |
//! |---|---|
//! | `GET /.well-known/openid-configuration` | [`discovery_handler`] |
//! | `GET /.well-known/jwks.json` | [`jwks_handler`] |
//! | `GET /authorize` | [`authorize_handler`] |
//! | `POST /login` | [`login_handler`] |
//! | `POST /token` | [`token_handler`] |
//! | `GET /userinfo` | [`userinfo_handler`] |
//! | `POST /revoke` | [`revoke_handler`] |

pub mod authorize;
pub mod discovery;
pub mod jwks;
pub mod revoke;
pub mod templates;
pub mod token;
pub mod userinfo;

pub use authorize::{AuthorizeState, LoginRequest, authorize_handler, login_handler};
pub use discovery::{DiscoveryState, discovery_handler};
pub use jwks::{JwksState, jwks_handler};
pub use revoke::{RevocationForm, RevocationResponse, RevocationState, revoke_handler};
pub use token::{TokenState, token_handler};
pub use userinfo::{UserInfoResponse, userinfo_handler};
