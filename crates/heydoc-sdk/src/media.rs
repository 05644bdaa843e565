//! The external media-session seam.
//!
//! The real-time audio transport is provided by the media platform. The
//! controller only hands it a credential and listens for its lifecycle
//! signals.
//!
//! Every join carries the controller's attempt number, and the session
//! echoes it back on each [`MediaEvent`]. Signals belonging to an attempt
//! the controller has already abandoned are dropped.

use std::future::Future;

use heydoc_models::RoomId;

use crate::error::SdkError;

/// What the media session needs to establish a transport.
#[derive(Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// The local user's signed token.
    pub token: String,
    /// Room to join.
    pub room: RoomId,
    /// Media server address.
    pub server_url: String,
    /// Connection attempt this join belongs to. Echo it on every event.
    pub attempt: u64,
}

impl std::fmt::Debug for JoinRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinRequest")
            .field("token", &format_args!("[{} bytes]", self.token.len()))
            .field("room", &self.room)
            .field("server_url", &self.server_url)
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// Lifecycle signals emitted by the media session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Transport is up.
    Connected {
        /// Attempt of the join that came up.
        attempt: u64,
    },
    /// Transport is gone (user hang-up, server kick, network loss…).
    Disconnected {
        /// Attempt of the join that went down.
        attempt: u64,
        /// Platform-supplied reason.
        reason: String,
    },
}

impl MediaEvent {
    /// The attempt this signal belongs to.
    pub fn attempt(&self) -> u64 {
        match self {
            Self::Connected { attempt } | Self::Disconnected { attempt, .. } => *attempt,
        }
    }
}

/// A real-time media transport.
pub trait MediaSession: Send + Sync {
    /// Start establishing a transport with the given credential.
    ///
    /// Returning `Ok` means the attempt is under way; the session reports
    /// completion through [`MediaEvent::Connected`].
    fn join(&self, request: JoinRequest) -> impl Future<Output = Result<(), SdkError>> + Send;

    /// Tear down the transport started for `attempt`, if it is still up.
    ///
    /// Must be safe to call at any time, including while the matching
    /// [`join`](Self::join) is still running and more than once per attempt.
    fn leave(&self, attempt: u64) -> impl Future<Output = ()> + Send;
}
