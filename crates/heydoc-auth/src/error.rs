//! Error types for the HeyDoc token issuer.
//!
//! [`AuthError`] implements [`axum::response::IntoResponse`] so handlers can
//! return `Result<…, AuthError>` directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use heydoc_models::ErrorResponse;

/// Errors that can occur while issuing a credential.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// `room` or `username` was absent or empty. The client must fix its input.
    #[error("Missing room or username")]
    MissingParameter,

    /// The signer rejected the claims or key. Indicates broken configuration;
    /// never retried by the issuer itself.
    #[error("failed to sign credential: {0}")]
    Signing(#[from] livekit_api::access_token::AccessTokenError),
}

impl AuthError {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "token request failed");
        } else {
            tracing::warn!(%status, error = %message, "token request rejected");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
