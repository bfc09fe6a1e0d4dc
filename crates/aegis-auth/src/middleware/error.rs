//! HTTP response mapping for [`AuthError`].
//!
//! Lets handlers and extractors return `AuthError` directly. Client errors
//! carry an OAuth-style JSON body; server errors are logged and sanitized
//! so no internal detail reaches the client.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let description = if self.is_server_error() {
            tracing::error!(error = %self, category = %self.category(), "Request failed");
            "The request could not be processed".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": self.oauth_error_code(),
            "error_description": description,
        });

        let mut response = (status, Json(body)).into_response();

        // Bearer challenge on authentication failures (RFC 6750)
        if status == StatusCode::UNAUTHORIZED
            && let Ok(value) = header::HeaderValue::from_str(&format!(
                "Bearer error=\"{}\"",
                self.oauth_error_code()
            ))
        {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }

        response
    }
}
