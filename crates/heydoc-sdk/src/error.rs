//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation that talks to the outside world. [`TransitionError`] reports
//! an event the session state machine refused.

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid or missing configuration (e.g. bad URL, empty room name).
    #[error("configuration error: {0}")]
    Config(String),

    /// The issuer rejected the request parameters (HTTP 4xx).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The issuer failed to mint a credential (HTTP 5xx).
    #[error("token issuance failed: {0}")]
    Issuance(String),

    /// The media session could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP transport failure while talking to the issuer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// An event that is not legal in the session's current state.
///
/// The session is left untouched when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event} while {state}")]
pub struct TransitionError {
    /// State the session was in.
    pub state: String,
    /// Event that was refused.
    pub event: String,
}
