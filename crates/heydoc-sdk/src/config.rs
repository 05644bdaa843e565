//! Client-side bootstrap configuration.

use heydoc_models::{ParticipantIdentity, RoomId};

use crate::error::SdkError;

/// Default issuer base URL.
pub const DEFAULT_TOKEN_URL: &str = "http://localhost:3000";
/// Default media server address.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:7880";
/// Room every session joins in this deployment.
pub const DEFAULT_ROOM: &str = "Medical Assistance";
/// Identity under which the voice agent joins.
pub const DEFAULT_AGENT_IDENTITY: &str = "HeyDocAI";

/// Everything the controller needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Base URL of the token issuer.
    pub token_url: String,
    /// Media server address handed to the media session.
    pub server_url: String,
    /// Room to join; fixed for the lifetime of the process.
    pub room: RoomId,
    /// Identity the agent credential is requested for.
    pub agent_identity: ParticipantIdentity,
}

impl BootstrapConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HEYDOC_TOKEN_URL`      | `http://localhost:3000` |
    /// | `LIVEKIT_URL`           | `ws://localhost:7880`   |
    /// | `HEYDOC_ROOM`           | `Medical Assistance`    |
    /// | `HEYDOC_AGENT_IDENTITY` | `HeyDocAI`              |
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let room = RoomId::parse(&get("HEYDOC_ROOM", DEFAULT_ROOM))
            .map_err(|e| SdkError::Config(format!("HEYDOC_ROOM: {e}")))?;
        let agent_identity =
            ParticipantIdentity::parse(&get("HEYDOC_AGENT_IDENTITY", DEFAULT_AGENT_IDENTITY))
                .map_err(|e| SdkError::Config(format!("HEYDOC_AGENT_IDENTITY: {e}")))?;

        Ok(Self {
            token_url: get("HEYDOC_TOKEN_URL", DEFAULT_TOKEN_URL),
            server_url: get("LIVEKIT_URL", DEFAULT_SERVER_URL),
            room,
            agent_identity,
        })
    }
}
