//! Issuer configuration.
//!
//! Read once from the environment at startup and passed by reference into
//! the [`TokenIssuer`](crate::TokenIssuer). A missing signing value is a
//! startup-fatal [`ConfigError`]; nothing is served until it is fixed.

use std::fmt;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default credential lifetime: six hours.
pub const DEFAULT_TOKEN_TTL_SECS: u32 = 6 * 60 * 60;
/// Default name under which the voice agent is dispatched.
pub const DEFAULT_AGENT_NAME: &str = "HeyDocAI";

/// Configuration errors. Always fatal.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    /// A variable is present but cannot be used.
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Process-wide issuer configuration. Read-only after startup.
#[derive(Clone)]
pub struct IssuerConfig {
    /// Media server address clients connect to (`LIVEKIT_URL`).
    pub server_url: String,
    /// Key id placed in the `iss` claim (`LIVEKIT_API_KEY`).
    pub api_key: String,
    /// HMAC secret used to sign credentials (`LIVEKIT_API_SECRET`).
    pub api_secret: String,
    /// Credential lifetime in seconds.
    pub token_ttl_secs: u32,
    /// Port to listen on.
    pub listen_port: u16,
    /// Agent name written into the dispatch section of agent credentials.
    pub agent_name: String,
}

impl fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("server_url", &self.server_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("listen_port", &self.listen_port)
            .field("agent_name", &self.agent_name)
            .finish()
    }
}

impl IssuerConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable             | Default    | Description                          |
    /// |----------------------|------------|--------------------------------------|
    /// | `LIVEKIT_URL`        | *required* | Media server address                 |
    /// | `LIVEKIT_API_KEY`    | *required* | Signing key id                       |
    /// | `LIVEKIT_API_SECRET` | *required* | Signing secret                       |
    /// | `TOKEN_PORT`         | `3000`     | HTTP listen port                     |
    /// | `TOKEN_TTL_SECS`     | `21600`    | Credential lifetime                  |
    /// | `AGENT_NAME`         | `HeyDocAI` | Agent dispatched by agent credentials |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let server_url = required("LIVEKIT_URL")?;
        let api_key = required("LIVEKIT_API_KEY")?;
        let api_secret = required("LIVEKIT_API_SECRET")?;

        let listen_port = match lookup("TOKEN_PORT") {
            Some(v) => v.parse().map_err(|e| ConfigError::Invalid {
                var: "TOKEN_PORT",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let token_ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(v) => match v.parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Ok(secs) => secs,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECS",
                        reason: format!("{e}"),
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let agent_name = lookup("AGENT_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

        Ok(Self {
            server_url,
            api_key,
            api_secret,
            token_ttl_secs,
            listen_port,
            agent_name,
        })
    }
}
