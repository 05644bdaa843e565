//! Drives a [`BootstrapSession`] against real collaborators.
//!
//! One connection attempt is a strict three-step saga:
//!
//! 1. request the local user's credential;
//! 2. only once that succeeded, request the agent's credential (this is
//!    what dispatches the voice agent);
//! 3. hand the user credential to the [`MediaSession`].
//!
//! The controller never runs two credential requests for the same session
//! concurrently, and never retries on its own: a failed attempt stays
//! `Failed` until [`BootstrapController::connect`] is called again.
//!
//! Every step re-checks that its attempt is still the live one once it
//! resumes. A join that completes for an abandoned attempt is left again
//! straight away, and media signals tagged with an older attempt are dropped.

use std::sync::Arc;

use heydoc_models::{ParticipantIdentity, RoomId};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::BootstrapConfig;
use crate::credentials::TokenRequest;
use crate::identity::generate_local_identity;
use crate::media::{JoinRequest, MediaEvent, MediaSession};
use crate::session::{BootstrapSession, ConnectionState, SessionEvent};
use crate::token_source::{HttpTokenSource, TokenSource};

struct Inner<T, M> {
    tokens: T,
    media: M,
    server_url: String,
    session: Mutex<BootstrapSession>,
    state_tx: watch::Sender<ConnectionState>,
}

/// Cloneable handle to one client's bootstrap controller.
///
/// All clones share the same session, so a UI task can call
/// [`disconnect`](Self::disconnect) while another task is suspended inside
/// [`connect`](Self::connect). Results that arrive for an abandoned attempt
/// are discarded.
pub struct BootstrapController<T, M> {
    inner: Arc<Inner<T, M>>,
}

impl<T, M> Clone for BootstrapController<T, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: MediaSession> BootstrapController<HttpTokenSource, M> {
    /// Controller that fetches credentials from the configured issuer over
    /// HTTP, with a freshly generated local identity.
    pub fn over_http(config: &BootstrapConfig, media: M) -> Self {
        Self::new(
            config,
            generate_local_identity(),
            HttpTokenSource::new(config.token_url.clone()),
            media,
        )
    }
}

impl<T: TokenSource, M: MediaSession> BootstrapController<T, M> {
    /// Create an idle controller.
    pub fn new(
        config: &BootstrapConfig,
        local_identity: ParticipantIdentity,
        tokens: T,
        media: M,
    ) -> Self {
        let session = BootstrapSession::new(
            config.room.clone(),
            local_identity,
            config.agent_identity.clone(),
        );
        let (state_tx, _) = watch::channel(ConnectionState::Idle);

        Self {
            inner: Arc::new(Inner {
                tokens,
                media,
                server_url: config.server_url.clone(),
                session: Mutex::new(session),
                state_tx,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state_tx.borrow().clone()
    }

    /// The failure cause, when in the failed state.
    pub fn error_message(&self) -> Option<String> {
        self.inner
            .state_tx
            .borrow()
            .error_message()
            .map(str::to_string)
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Snapshot of the underlying session, credentials included.
    pub async fn session(&self) -> BootstrapSession {
        self.inner.session.lock().await.clone()
    }

    /// The local user's identity.
    pub async fn local_identity(&self) -> ParticipantIdentity {
        self.inner.session.lock().await.local_identity().clone()
    }

    /// The room this controller joins.
    pub async fn room(&self) -> RoomId {
        self.inner.session.lock().await.room().clone()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Run one connection attempt, from `Idle` or `Failed`.
    ///
    /// Returns the state the attempt settled in: `ReadyToJoin` (or
    /// `Connected`, if the media session already signalled) on success,
    /// `Failed` otherwise. Called in any other state this is a no-op that
    /// returns the current state.
    pub async fn connect(&self) -> ConnectionState {
        let (attempt, room, local_identity, agent_identity) = {
            let mut session = self.inner.session.lock().await;
            if !self.apply_locked(&mut session, SessionEvent::Connect) {
                return session.state().clone();
            }
            (
                session.attempt(),
                session.room().clone(),
                session.local_identity().clone(),
                session.agent_identity().clone(),
            )
        };

        info!(attempt, room = %room, identity = %local_identity, "connection attempt started");

        // Step 1: the local user's credential.
        let request = TokenRequest::user(room.clone(), local_identity);
        let event = match self.inner.tokens.fetch_token(&request).await {
            Ok(token) => SessionEvent::UserTokenIssued(token),
            Err(e) => {
                warn!(attempt, error = %e, "user token request failed");
                SessionEvent::UserTokenFailed(format!("Failed to fetch user token from server: {e}"))
            }
        };
        match self.apply_current(attempt, event).await {
            Some(ConnectionState::AcquiringAgent) => {}
            _ => return self.state(),
        }

        // Step 2: the agent's credential. Only reachable once step 1 succeeded.
        let request = TokenRequest::agent(room.clone(), agent_identity);
        let event = match self.inner.tokens.fetch_token(&request).await {
            Ok(token) => SessionEvent::AgentTokenIssued(token),
            Err(e) => {
                warn!(attempt, error = %e, "agent token request failed");
                SessionEvent::AgentTokenFailed(format!(
                    "Failed to fetch agent token from server: {e}"
                ))
            }
        };
        match self.apply_current(attempt, event).await {
            Some(ConnectionState::ReadyToJoin) => {}
            _ => return self.state(),
        }

        // Step 3: hand the user credential to the media session.
        let join = {
            let session = self.inner.session.lock().await;
            match (session.attempt() == attempt, session.user().token()) {
                (true, Some(token)) => JoinRequest {
                    token: token.token().to_string(),
                    room,
                    server_url: self.inner.server_url.clone(),
                    attempt,
                },
                _ => return session.state().clone(),
            }
        };

        info!(attempt, server_url = %join.server_url, "joining media session");
        match self.inner.media.join(join).await {
            Ok(()) => {
                let current = self.inner.session.lock().await.attempt();
                if current != attempt {
                    info!(attempt, current, "attempt abandoned while joining, leaving media session");
                    self.inner.media.leave(attempt).await;
                }
            }
            Err(e) => {
                warn!(attempt, error = %e, "media session failed to start");
                self.apply_current(
                    attempt,
                    SessionEvent::MediaConnectFailed(format!(
                        "Failed to connect to media server: {e}"
                    )),
                )
                .await;
            }
        }

        self.state()
    }

    /// Drop the session back to `Idle`, from any state.
    ///
    /// Credentials are discarded, any in-flight request of the current
    /// attempt is orphaned, and a started or established media session is
    /// left. A join still in progress is left again by
    /// [`connect`](Self::connect) once it returns.
    pub async fn disconnect(&self) {
        let (attempt, joined) = {
            let mut session = self.inner.session.lock().await;
            let attempt = session.attempt();
            let joined = matches!(
                session.state(),
                ConnectionState::ReadyToJoin | ConnectionState::Connected
            );
            self.apply_locked(&mut session, SessionEvent::Disconnect);
            (attempt, joined)
        };

        if joined {
            self.inner.media.leave(attempt).await;
        }
    }

    /// Feed one media-session lifecycle signal into the state machine.
    ///
    /// Signals tagged with any attempt other than the live one are dropped.
    pub async fn handle_media_event(&self, event: MediaEvent) {
        let mut session = self.inner.session.lock().await;
        if event.attempt() != session.attempt() {
            debug!(
                attempt = event.attempt(),
                current = session.attempt(),
                "discarding media signal of abandoned attempt"
            );
            return;
        }

        let event = match event {
            MediaEvent::Connected { .. } => SessionEvent::MediaConnected,
            MediaEvent::Disconnected { reason, .. } => {
                info!(reason = %reason, "media session disconnected");
                SessionEvent::MediaDisconnected(reason)
            }
        };
        self.apply_locked(&mut session, event);
    }

    /// Forward media-session signals until the sender side is dropped.
    pub async fn pump_media_events(&self, mut events: mpsc::Receiver<MediaEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_media_event(event).await;
        }
        debug!("media event stream closed");
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Apply `event` only if `attempt` is still the live one. Returns the
    /// resulting state when the event was applied.
    async fn apply_current(&self, attempt: u64, event: SessionEvent) -> Option<ConnectionState> {
        let mut session = self.inner.session.lock().await;
        if session.attempt() != attempt {
            debug!(
                attempt,
                current = session.attempt(),
                event = %event,
                "discarding result of abandoned attempt"
            );
            return None;
        }
        self.apply_locked(&mut session, event)
            .then(|| session.state().clone())
    }

    fn apply_locked(&self, session: &mut BootstrapSession, event: SessionEvent) -> bool {
        match session.apply(event) {
            Ok(()) => {
                let state = session.state().clone();
                info!(state = %state, attempt = session.attempt(), "connection state changed");
                if let Some(cause) = state.error_message() {
                    warn!(cause = %cause, "connection attempt failed");
                }
                self.inner.state_tx.send_replace(state);
                true
            }
            Err(e) => {
                debug!(error = %e, "event ignored");
                false
            }
        }
    }
}
