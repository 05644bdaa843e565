//! The signed access credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grant::GrantSet;
use crate::room::{ParticipantIdentity, ParticipantKind, RoomId};

/// A signed, capability-scoped, time-bounded access credential.
///
/// Credentials are immutable once minted and valid only for the
/// `(subject, room)` pair they were issued for. There is no renewal:
/// a fresh credential is requested for every session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    subject: ParticipantIdentity,
    room: RoomId,
    kind: ParticipantKind,
    grants: GrantSet,
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Assemble a credential from an already-signed token.
    ///
    /// Only the issuer calls this; the `token` string is opaque here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subject: ParticipantIdentity,
        room: RoomId,
        kind: ParticipantKind,
        grants: GrantSet,
        token: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            room,
            kind,
            grants,
            token,
            issued_at,
            expires_at,
        }
    }

    /// Participant the credential was minted for.
    pub fn subject(&self) -> &ParticipantIdentity {
        &self.subject
    }

    /// Room the credential admits to.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Participant kind encoded in the credential.
    pub fn kind(&self) -> ParticipantKind {
        self.kind
    }

    /// Capabilities carried by the credential.
    pub fn grants(&self) -> &GrantSet {
        &self.grants
    }

    /// The opaque signed envelope handed to the media platform.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Consume the credential, keeping only the signed token.
    pub fn into_token(self) -> String {
        self.token
    }

    /// When the credential was minted.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the credential stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether this credential is scoped to exactly `subject` in `room`.
    pub fn is_valid_for(&self, subject: &ParticipantIdentity, room: &RoomId) -> bool {
        &self.subject == subject && &self.room == room
    }

    /// Whether the credential has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
