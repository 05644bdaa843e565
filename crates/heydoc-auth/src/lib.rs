//! HeyDoc token issuer: mints room-scoped access credentials for the
//! participants of a real-time audio room.
//!
//! The issuer is stateless. On each `GET /token` request it:
//!
//! 1. Validates that both `room` and `username` are present.
//! 2. Signs a credential granting join, publish and subscribe in that room.
//! 3. Returns the signed token as `{ "token": "…" }`.
//!
//! A request flagged `isAgent=true` gets a credential carrying an agent
//! dispatch entry, which is what brings the voice agent into the room.

pub mod access_token;
pub mod config;
pub mod error;
pub mod issuer;

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use heydoc_models::{ParticipantKind, TokenResponse};
use serde::Deserialize;
use tracing::info;

pub use config::{ConfigError, IssuerConfig};
pub use error::AuthError;
pub use issuer::TokenIssuer;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// State shared across all Axum handlers.
struct AppState {
    issuer: TokenIssuer,
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Query string of `GET /token`.
///
/// Every field is optional at the extractor level so that a missing
/// parameter yields the JSON `400` body instead of a plain-text rejection.
#[derive(Deserialize, Debug, Default)]
struct TokenQuery {
    room: Option<String>,
    username: Option<String>,
    #[serde(rename = "isAgent")]
    is_agent: Option<String>,
}

impl TokenQuery {
    fn kind(&self) -> ParticipantKind {
        match self.is_agent.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => ParticipantKind::Agent,
            _ => ParticipantKind::Standard,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /token?room=…&username=…[&isAgent=true]`
async fn issue_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>, AuthError> {
    let kind = query.kind();
    let room = query.room.as_deref().unwrap_or_default();
    let username = query.username.as_deref().unwrap_or_default();

    info!(room = %room, username = %username, %kind, "token request received");

    let credential = state.issuer.issue(room, username, kind)?;
    Ok(Json(TokenResponse {
        token: credential.into_token(),
    }))
}

/// `GET /health` — liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Build the issuer's HTTP router.
pub fn router(issuer: TokenIssuer) -> Router {
    let state = Arc::new(AppState { issuer });

    Router::new()
        .route("/token", get(issue_token))
        .route("/health", get(health))
        .with_state(state)
}
