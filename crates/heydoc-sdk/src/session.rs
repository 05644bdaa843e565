//! The bootstrap state machine.
//!
//! [`BootstrapSession`] is a plain value object. It performs no I/O and is
//! transitioned only through [`BootstrapSession::apply`]:
//!
//! ```text
//!            Connect                UserTokenIssued           AgentTokenIssued
//!   Idle ───────────▶ AcquiringUser ───────────────▶ AcquiringAgent ───────────────▶ ReadyToJoin
//!    ▲  ▲                  │                              │                           │     │
//!    │  │                  │ UserTokenFailed              │ AgentTokenFailed          │     │ MediaConnected
//!    │  │                  ▼                              ▼                           │     ▼
//!    │  │               Failed ◀──────────────────────────┴───── MediaConnectFailed ──┘  Connected
//!    │  │                  │ Connect (full restart)                                         │
//!    │  │                  └──────────────────▶ AcquiringUser                               │
//!    │  └───────────────────────────── MediaDisconnected ───────────────────────────────────┘
//!    └──────────────── Disconnect (from any state) ─────────────────────────────────────────
//! ```

use heydoc_models::{ParticipantIdentity, RoomId};

use crate::credentials::IssuedToken;
use crate::error::TransitionError;

/// Observable connection state.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum ConnectionState {
    /// No credentials held.
    Idle,
    /// The local user's credential is being requested.
    AcquiringUser,
    /// The agent's credential is being requested (this dispatches the agent).
    AcquiringAgent,
    /// Both credentials held; the media session is connecting.
    ReadyToJoin,
    /// Media session active.
    Connected,
    /// The attempt failed. Terminal until the next `Connect`.
    Failed {
        /// Human-readable cause.
        cause: String,
    },
}

impl ConnectionState {
    /// The failure cause, when in [`ConnectionState::Failed`].
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { cause } => Some(cause),
            _ => None,
        }
    }

    /// Whether a connection attempt is in progress.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::AcquiringUser | Self::AcquiringAgent | Self::ReadyToJoin
        )
    }
}

/// Where one credential stands within the current attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialSlot {
    /// Not requested.
    #[default]
    Absent,
    /// Request in flight.
    Pending,
    /// Issued and held.
    Present(IssuedToken),
    /// Request failed with the given cause.
    Failed(String),
}

impl CredentialSlot {
    /// The held token, if any.
    pub fn token(&self) -> Option<&IssuedToken> {
        match self {
            Self::Present(token) => Some(token),
            _ => None,
        }
    }

    /// Whether a token is held.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum SessionEvent {
    /// User intent to connect (or retry).
    Connect,
    /// The local user's credential arrived.
    UserTokenIssued(IssuedToken),
    /// The local user's credential request failed.
    UserTokenFailed(String),
    /// The agent's credential arrived.
    AgentTokenIssued(IssuedToken),
    /// The agent's credential request failed.
    AgentTokenFailed(String),
    /// The media session reported `connected`.
    MediaConnected,
    /// The media session could not be started.
    MediaConnectFailed(String),
    /// The media session reported `disconnected`.
    MediaDisconnected(String),
    /// Explicit user disconnect.
    Disconnect,
}

/// One client's bootstrap state.
#[derive(Debug, Clone)]
pub struct BootstrapSession {
    room: RoomId,
    local_identity: ParticipantIdentity,
    agent_identity: ParticipantIdentity,
    user: CredentialSlot,
    agent: CredentialSlot,
    state: ConnectionState,
    attempt: u64,
}

impl BootstrapSession {
    /// A fresh, idle session.
    pub fn new(
        room: RoomId,
        local_identity: ParticipantIdentity,
        agent_identity: ParticipantIdentity,
    ) -> Self {
        Self {
            room,
            local_identity,
            agent_identity,
            user: CredentialSlot::Absent,
            agent: CredentialSlot::Absent,
            state: ConnectionState::Idle,
            attempt: 0,
        }
    }

    /// Room every attempt targets.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// The local user's identity, stable for the session's lifetime.
    pub fn local_identity(&self) -> &ParticipantIdentity {
        &self.local_identity
    }

    /// The agent's identity.
    pub fn agent_identity(&self) -> &ParticipantIdentity {
        &self.agent_identity
    }

    /// The local user's credential slot.
    pub fn user(&self) -> &CredentialSlot {
        &self.user
    }

    /// The agent's credential slot.
    pub fn agent(&self) -> &CredentialSlot {
        &self.agent
    }

    /// Current connection state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Attempt counter. Changes on every `Connect` and `Disconnect`, so a
    /// result tagged with an older value belongs to an abandoned attempt.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Apply one event.
    ///
    /// Illegal events are refused with a [`TransitionError`] and leave the
    /// session exactly as it was.
    pub fn apply(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        use ConnectionState as S;
        use SessionEvent as E;

        let state = std::mem::replace(&mut self.state, S::Idle);

        self.state = match (state, event) {
            // Disconnect is always safe: drop everything and start over.
            (_, E::Disconnect) => {
                self.reset();
                S::Idle
            }

            // Retry is a full restart, never a resumption.
            (S::Idle | S::Failed { .. }, E::Connect) => {
                self.reset();
                self.user = CredentialSlot::Pending;
                S::AcquiringUser
            }

            (S::AcquiringUser, E::UserTokenIssued(token)) => {
                self.user = CredentialSlot::Present(token);
                self.agent = CredentialSlot::Pending;
                S::AcquiringAgent
            }
            (S::AcquiringUser, E::UserTokenFailed(cause)) => {
                self.user = CredentialSlot::Failed(cause.clone());
                S::Failed { cause }
            }

            (S::AcquiringAgent, E::AgentTokenIssued(token)) => {
                self.agent = CredentialSlot::Present(token);
                S::ReadyToJoin
            }
            // No partial join: the user credential goes too.
            (S::AcquiringAgent, E::AgentTokenFailed(cause)) => {
                self.user = CredentialSlot::Absent;
                self.agent = CredentialSlot::Failed(cause.clone());
                S::Failed { cause }
            }

            (S::ReadyToJoin, E::MediaConnected) => S::Connected,
            (S::ReadyToJoin, E::MediaConnectFailed(cause)) => {
                self.discard_credentials();
                S::Failed { cause }
            }
            (S::ReadyToJoin, E::MediaDisconnected(reason)) => {
                self.discard_credentials();
                S::Failed {
                    cause: format!("Media session disconnected before connecting: {reason}"),
                }
            }

            (S::Connected, E::MediaDisconnected(_)) => {
                self.discard_credentials();
                S::Idle
            }

            (state, event) => {
                let err = TransitionError {
                    state: state.to_string(),
                    event: event.to_string(),
                };
                self.state = state;
                return Err(err);
            }
        };

        Ok(())
    }

    fn discard_credentials(&mut self) {
        self.user = CredentialSlot::Absent;
        self.agent = CredentialSlot::Absent;
    }

    fn reset(&mut self) {
        self.discard_credentials();
        self.attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::TokenRequest;

    fn session() -> BootstrapSession {
        BootstrapSession::new(
            RoomId::parse("Medical Assistance").unwrap(),
            ParticipantIdentity::parse("Web-User-42").unwrap(),
            ParticipantIdentity::parse("HeyDocAI").unwrap(),
        )
    }

    fn user_token(s: &BootstrapSession) -> IssuedToken {
        let request = TokenRequest::user(s.room().clone(), s.local_identity().clone());
        IssuedToken::new(&request, "user.jwt".into())
    }

    fn agent_token(s: &BootstrapSession) -> IssuedToken {
        let request = TokenRequest::agent(s.room().clone(), s.agent_identity().clone());
        IssuedToken::new(&request, "agent.jwt".into())
    }

    fn ready(s: &mut BootstrapSession) {
        s.apply(SessionEvent::Connect).unwrap();
        let user = user_token(s);
        s.apply(SessionEvent::UserTokenIssued(user)).unwrap();
        let agent = agent_token(s);
        s.apply(SessionEvent::AgentTokenIssued(agent)).unwrap();
    }

    #[test]
    fn starts_idle() {
        let s = session();
        assert_eq!(s.state(), &ConnectionState::Idle);
        assert_eq!(s.user(), &CredentialSlot::Absent);
        assert_eq!(s.agent(), &CredentialSlot::Absent);
    }

    #[test]
    fn happy_path_reaches_connected() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        assert_eq!(s.state(), &ConnectionState::AcquiringUser);
        assert_eq!(s.user(), &CredentialSlot::Pending);
        assert_eq!(s.agent(), &CredentialSlot::Absent);

        let user = user_token(&s);
        s.apply(SessionEvent::UserTokenIssued(user)).unwrap();
        assert_eq!(s.state(), &ConnectionState::AcquiringAgent);
        assert_eq!(s.agent(), &CredentialSlot::Pending);

        let agent = agent_token(&s);
        s.apply(SessionEvent::AgentTokenIssued(agent)).unwrap();
        assert_eq!(s.state(), &ConnectionState::ReadyToJoin);
        assert!(s.user().is_present() && s.agent().is_present());
        assert_eq!(s.user().token().unwrap().token(), "user.jwt");

        s.apply(SessionEvent::MediaConnected).unwrap();
        assert_eq!(s.state(), &ConnectionState::Connected);
    }

    #[test]
    fn agent_token_cannot_skip_user_token() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        let agent = agent_token(&s);
        let err = s.apply(SessionEvent::AgentTokenIssued(agent)).unwrap_err();
        assert_eq!(err.state, "acquiringUser");
        assert_eq!(s.state(), &ConnectionState::AcquiringUser);
    }

    #[test]
    fn user_failure_is_terminal() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        s.apply(SessionEvent::UserTokenFailed("bad request".into()))
            .unwrap();
        assert_eq!(s.state().error_message(), Some("bad request"));
        assert_eq!(s.user(), &CredentialSlot::Failed("bad request".into()));
        assert_eq!(s.agent(), &CredentialSlot::Absent);

        let agent = agent_token(&s);
        assert!(s.apply(SessionEvent::AgentTokenIssued(agent)).is_err());
    }

    #[test]
    fn agent_failure_discards_user_token() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        let user = user_token(&s);
        s.apply(SessionEvent::UserTokenIssued(user)).unwrap();
        s.apply(SessionEvent::AgentTokenFailed("issuer down".into()))
            .unwrap();

        assert_eq!(s.state().error_message(), Some("issuer down"));
        assert_eq!(s.user(), &CredentialSlot::Absent);
        assert!(s.apply(SessionEvent::MediaConnected).is_err());
    }

    #[test]
    fn retry_from_failed_restarts_from_scratch() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        let user = user_token(&s);
        s.apply(SessionEvent::UserTokenIssued(user)).unwrap();
        s.apply(SessionEvent::AgentTokenFailed("boom".into())).unwrap();
        let before = s.attempt();

        s.apply(SessionEvent::Connect).unwrap();
        assert_eq!(s.state(), &ConnectionState::AcquiringUser);
        assert_eq!(s.user(), &CredentialSlot::Pending);
        assert_eq!(s.agent(), &CredentialSlot::Absent);
        assert!(s.attempt() > before);
    }

    #[test]
    fn connect_while_in_progress_is_refused() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        let attempt = s.attempt();
        assert!(s.apply(SessionEvent::Connect).is_err());
        assert_eq!(s.attempt(), attempt);
        assert_eq!(s.user(), &CredentialSlot::Pending);
    }

    #[test]
    fn media_disconnect_from_connected_returns_idle() {
        let mut s = session();
        ready(&mut s);
        s.apply(SessionEvent::MediaConnected).unwrap();
        s.apply(SessionEvent::MediaDisconnected("network lost".into()))
            .unwrap();
        assert_eq!(s.state(), &ConnectionState::Idle);
        assert_eq!(s.user(), &CredentialSlot::Absent);
        assert_eq!(s.agent(), &CredentialSlot::Absent);
    }

    #[test]
    fn explicit_disconnect_from_connected_returns_idle() {
        let mut s = session();
        ready(&mut s);
        s.apply(SessionEvent::MediaConnected).unwrap();
        let attempt = s.attempt();
        s.apply(SessionEvent::Disconnect).unwrap();
        assert_eq!(s.state(), &ConnectionState::Idle);
        assert_eq!(s.user(), &CredentialSlot::Absent);
        assert_eq!(s.agent(), &CredentialSlot::Absent);
        assert_ne!(s.attempt(), attempt);
    }

    #[test]
    fn disconnect_mid_acquisition_invalidates_attempt() {
        let mut s = session();
        s.apply(SessionEvent::Connect).unwrap();
        let attempt = s.attempt();
        s.apply(SessionEvent::Disconnect).unwrap();
        assert_eq!(s.state(), &ConnectionState::Idle);
        assert_ne!(s.attempt(), attempt);

        let user = user_token(&s);
        assert!(s.apply(SessionEvent::UserTokenIssued(user)).is_err());
        assert_eq!(s.user(), &CredentialSlot::Absent);
    }

    #[test]
    fn media_drop_while_joining_fails() {
        let mut s = session();
        ready(&mut s);
        s.apply(SessionEvent::MediaDisconnected("ice failed".into()))
            .unwrap();
        assert_eq!(
            s.state().error_message(),
            Some("Media session disconnected before connecting: ice failed")
        );
        assert_eq!(s.user(), &CredentialSlot::Absent);
    }

    #[test]
    fn media_connected_only_from_ready() {
        let mut s = session();
        assert!(s.apply(SessionEvent::MediaConnected).is_err());
        assert_eq!(s.state(), &ConnectionState::Idle);
    }

    #[test]
    fn state_names() {
        assert_eq!(ConnectionState::ReadyToJoin.to_string(), "readyToJoin");
        assert_eq!(
            ConnectionState::Failed { cause: "x".into() }.to_string(),
            "failed"
        );
        assert!(ConnectionState::AcquiringAgent.is_in_progress());
        assert!(!ConnectionState::Connected.is_in_progress());
    }
}
