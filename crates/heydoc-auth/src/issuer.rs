//! The stateless token issuer.

use std::time::Duration;

use chrono::Utc;
use tracing::info;

use heydoc_models::{Credential, GrantSet, ParticipantIdentity, ParticipantKind, RoomId};

use crate::access_token::{self, ClaimsInput};
use crate::config::IssuerConfig;
use crate::error::AuthError;

/// Mints room-scoped credentials.
///
/// Holds only read-only signing material, so a single instance can be
/// shared across any number of concurrent requests without locking.
#[derive(Clone)]
pub struct TokenIssuer {
    api_key: String,
    api_secret: String,
    ttl_secs: u32,
    agent_name: String,
}

impl TokenIssuer {
    /// Build an issuer from the startup configuration.
    pub fn new(config: &IssuerConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            ttl_secs: config.token_ttl_secs,
            agent_name: config.agent_name.clone(),
        }
    }

    /// Issue a credential granting `{ roomJoin, publish, subscribe }` to
    /// `identity` in `room`.
    ///
    /// Calling this twice with the same arguments yields two independently
    /// valid credentials; nothing is remembered between calls.
    pub fn issue(
        &self,
        room: &str,
        identity: &str,
        kind: ParticipantKind,
    ) -> Result<Credential, AuthError> {
        self.issue_with_grants(room, identity, kind, GrantSet::full())
    }

    /// Issue a credential carrying an explicit [`GrantSet`].
    pub fn issue_with_grants(
        &self,
        room: &str,
        identity: &str,
        kind: ParticipantKind,
        grants: GrantSet,
    ) -> Result<Credential, AuthError> {
        let room = RoomId::parse(room).map_err(|_| AuthError::MissingParameter)?;
        let subject = ParticipantIdentity::parse(identity).map_err(|_| AuthError::MissingParameter)?;

        let issued_at = Utc::now();
        let expires_at = issued_at + chrono::Duration::seconds(i64::from(self.ttl_secs));

        let token = access_token::sign(&ClaimsInput {
            api_key: &self.api_key,
            api_secret: &self.api_secret,
            identity: subject.as_str(),
            room: room.as_str(),
            kind,
            grants: &grants,
            agent_name: &self.agent_name,
            ttl: Duration::from_secs(u64::from(self.ttl_secs)),
        })?;

        if kind.is_agent() {
            info!(room = %room, identity = %subject, agent = %self.agent_name, "agent credential issued, dispatch requested");
        } else {
            info!(room = %room, identity = %subject, "credential issued");
        }

        Ok(Credential::new(
            subject, room, kind, grants, token, issued_at, expires_at,
        ))
    }
}
