//! Access-token minting.
//!
//! Credentials are the media platform's own access tokens, built and signed
//! with `livekit-api`. The model-side [`GrantSet`] is projected onto
//! [`VideoGrants`]; agent credentials additionally carry a room
//! configuration whose dispatch entry brings the named agent into the room.

use std::time::Duration;

use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_protocol::{RoomAgentDispatch, RoomConfiguration};

use heydoc_models::{Grant, GrantSet, ParticipantKind};

use crate::error::AuthError;

pub use livekit_api::access_token::{Claims, TokenVerifier};

/// Everything needed to mint one access token.
pub struct ClaimsInput<'a> {
    /// Signing key id, written to `iss`.
    pub api_key: &'a str,
    /// HMAC secret the token is signed with.
    pub api_secret: &'a str,
    /// Participant identity, written to `sub`.
    pub identity: &'a str,
    /// Room the token admits to.
    pub room: &'a str,
    /// `Agent` adds the dispatch entry.
    pub kind: ParticipantKind,
    /// Capabilities to grant in `room`.
    pub grants: &'a GrantSet,
    /// Agent dispatched by agent tokens.
    pub agent_name: &'a str,
    /// Lifetime from now.
    pub ttl: Duration,
}

/// Project a [`GrantSet`] onto the token's room grant.
pub fn video_grants(room: &str, grants: &GrantSet) -> VideoGrants {
    VideoGrants {
        room: room.to_string(),
        room_join: grants.contains(Grant::RoomJoin),
        can_publish: grants.contains(Grant::Publish),
        can_publish_data: grants.contains(Grant::Publish),
        can_subscribe: grants.contains(Grant::Subscribe),
        ..Default::default()
    }
}

/// Recover the [`GrantSet`] a room grant encodes.
pub fn granted(video: &VideoGrants) -> GrantSet {
    let mut set = GrantSet::new();
    if video.room_join {
        set.insert(Grant::RoomJoin);
    }
    if video.can_publish {
        set.insert(Grant::Publish);
    }
    if video.can_subscribe {
        set.insert(Grant::Subscribe);
    }
    set
}

/// Room configuration that dispatches `agent_name` into the room.
pub fn agent_dispatch(agent_name: &str) -> RoomConfiguration {
    RoomConfiguration {
        agents: vec![RoomAgentDispatch {
            agent_name: agent_name.to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// Build and sign one access token.
pub fn sign(input: &ClaimsInput<'_>) -> Result<String, AuthError> {
    let mut token = AccessToken::with_api_key(input.api_key, input.api_secret)
        .with_identity(input.identity)
        .with_grants(video_grants(input.room, input.grants))
        .with_ttl(input.ttl);

    if input.kind.is_agent() {
        token = token.with_room_config(agent_dispatch(input.agent_name));
    }

    Ok(token.to_jwt()?)
}
