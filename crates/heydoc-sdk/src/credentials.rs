//! Credential requests and the tokens they return.

use std::fmt;

use heydoc_models::{ParticipantIdentity, ParticipantKind, RoomId};

/// Parameters of one credential request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    /// Room to join.
    pub room: RoomId,
    /// Identity the credential is minted for.
    pub identity: ParticipantIdentity,
    /// `Agent` marks the request that dispatches the voice agent.
    pub kind: ParticipantKind,
}

impl TokenRequest {
    /// Request a credential for the local human participant.
    pub fn user(room: RoomId, identity: ParticipantIdentity) -> Self {
        Self {
            room,
            identity,
            kind: ParticipantKind::Standard,
        }
    }

    /// Request a credential for the voice agent.
    pub fn agent(room: RoomId, identity: ParticipantIdentity) -> Self {
        Self {
            room,
            identity,
            kind: ParticipantKind::Agent,
        }
    }
}

/// A signed credential as seen by the client.
///
/// The token string is opaque to the client; it is only handed on to the
/// media session. It is never reused across connection attempts.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    identity: ParticipantIdentity,
    room: RoomId,
    kind: ParticipantKind,
    token: String,
}

impl IssuedToken {
    /// Pair a token string with the request it answered.
    pub fn new(request: &TokenRequest, token: String) -> Self {
        Self {
            identity: request.identity.clone(),
            room: request.room.clone(),
            kind: request.kind,
            token,
        }
    }

    /// Identity the token was minted for.
    pub fn identity(&self) -> &ParticipantIdentity {
        &self.identity
    }

    /// Room the token admits to.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Participant kind requested.
    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    /// The signed token string.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("identity", &self.identity)
            .field("room", &self.room)
            .field("kind", &self.kind)
            .field("token", &format_args!("[{} bytes]", self.token.len()))
            .finish()
    }
}
