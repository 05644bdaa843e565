//! Room and participant addressing.
//!
//! A [`RoomId`] names the shared audio room. Each participant inside that
//! room is identified by its [`ParticipantIdentity`]; the pair of the two is
//! what a credential is scoped to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// Identifier of a real-time audio room.
///
/// # Examples
///
/// ```
/// use heydoc_models::RoomId;
///
/// let room = RoomId::parse("Medical Assistance").unwrap();
/// assert_eq!(room.to_string(), "Medical Assistance");
/// assert!(RoomId::parse("").is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Validate and wrap a room name. Empty names are rejected.
    pub fn parse(id: &str) -> Result<Self, ModelError> {
        non_empty(id.to_string(), "room").map(Self)
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for RoomId {
    type Error = ModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        non_empty(s, "room").map(Self)
    }
}

impl From<RoomId> for String {
    fn from(room: RoomId) -> Self {
        room.0
    }
}

impl FromStr for RoomId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// ParticipantIdentity
// ---------------------------------------------------------------------------

/// Identity of a participant within a room (the credential subject).
///
/// Identities are unique per participant inside a room. For the local
/// human user this is a random, non-authenticated label such as
/// `Web-User-42`; for the voice agent it is a fixed name.
///
/// # Examples
///
/// ```
/// use heydoc_models::ParticipantIdentity;
///
/// let who = ParticipantIdentity::parse("HeyDocAI").unwrap();
/// assert_eq!(who.as_str(), "HeyDocAI");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantIdentity(String);

impl ParticipantIdentity {
    /// Validate and wrap an identity. Empty identities are rejected.
    pub fn parse(identity: &str) -> Result<Self, ModelError> {
        non_empty(identity.to_string(), "username").map(Self)
    }

    /// Build an identity of the form `{prefix}{n}`, e.g. `Web-User-42`.
    ///
    /// Always non-empty, so no validation is needed.
    pub fn numbered(prefix: &str, n: u32) -> Self {
        Self(format!("{prefix}{n}"))
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ParticipantIdentity {
    type Error = ModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ParticipantIdentity {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        non_empty(s, "username").map(Self)
    }
}

impl From<ParticipantIdentity> for String {
    fn from(identity: ParticipantIdentity) -> Self {
        identity.0
    }
}

impl FromStr for ParticipantIdentity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// ParticipantKind
// ---------------------------------------------------------------------------

/// What kind of participant a credential is minted for.
///
/// Requesting an [`Agent`](Self::Agent) credential is what dispatches the
/// voice agent into the room; the issuer keys that on this field, never on
/// the identity string.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ParticipantKind {
    /// A human participant joining through the web client.
    #[default]
    Standard,
    /// The automated voice agent.
    Agent,
}

impl ParticipantKind {
    /// `true` for [`ParticipantKind::Agent`].
    pub fn is_agent(self) -> bool {
        matches!(self, Self::Agent)
    }
}

/// Only the empty string is refused; surrounding whitespace is kept as given.
fn non_empty(value: String, field: &'static str) -> Result<String, ModelError> {
    if value.is_empty() {
        return Err(ModelError::Empty { field });
    }
    Ok(value)
}
