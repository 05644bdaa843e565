//! JSON bodies exchanged over the issuer's `GET /token` endpoint.

use serde::{Deserialize, Serialize};

/// Body of a successful `GET /token` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// Opaque signed credential string.
    pub token: String,
}

/// Body of any failed issuer response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable cause.
    pub error: String,
}
