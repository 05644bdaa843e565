use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use heydoc_sdk::{
    BootstrapConfig, BootstrapController, ConnectionState, CredentialSlot, IssuedToken,
    JoinRequest, MediaEvent, MediaSession, ParticipantIdentity, ParticipantKind, RoomId,
    SdkError, TokenRequest, TokenSource,
};
use tokio::sync::{mpsc, Notify};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
enum Outcome {
    Issue,
    Reject,
    Fail,
}

#[derive(Default)]
struct Script {
    calls: Mutex<Vec<TokenRequest>>,
    user: Mutex<VecDeque<Outcome>>,
    agent: Mutex<VecDeque<Outcome>>,
    issued: AtomicUsize,
}

#[derive(Clone, Default)]
struct Tokens(Arc<Script>);

impl Tokens {
    fn script_user(&self, outcomes: &[Outcome]) {
        self.0.user.lock().unwrap().extend(outcomes);
    }

    fn script_agent(&self, outcomes: &[Outcome]) {
        self.0.agent.lock().unwrap().extend(outcomes);
    }

    fn calls(&self) -> Vec<TokenRequest> {
        self.0.calls.lock().unwrap().clone()
    }

    fn respond(&self, request: &TokenRequest) -> Result<IssuedToken, SdkError> {
        self.0.calls.lock().unwrap().push(request.clone());

        let queue = if request.kind.is_agent() {
            &self.0.agent
        } else {
            &self.0.user
        };
        let outcome = queue.lock().unwrap().pop_front().unwrap_or(Outcome::Issue);

        match outcome {
            Outcome::Issue => {
                let n = self.0.issued.fetch_add(1, Ordering::SeqCst);
                Ok(IssuedToken::new(request, format!("{}#{n}", request.identity)))
            }
            Outcome::Reject => Err(SdkError::InvalidRequest("Missing room or username".into())),
            Outcome::Fail => Err(SdkError::Issuance(
                "500 Internal Server Error: failed to sign credential".into(),
            )),
        }
    }
}

impl TokenSource for Tokens {
    async fn fetch_token(&self, request: &TokenRequest) -> Result<IssuedToken, SdkError> {
        self.respond(request)
    }
}

/// Holds every user-token request until the gate is opened.
#[derive(Clone, Default)]
struct GatedTokens {
    tokens: Tokens,
    gate: Arc<Notify>,
}

impl TokenSource for GatedTokens {
    async fn fetch_token(&self, request: &TokenRequest) -> Result<IssuedToken, SdkError> {
        if !request.kind.is_agent() {
            self.tokens.0.calls.lock().unwrap().push(request.clone());
            self.gate.notified().await;
            let n = self.tokens.0.issued.fetch_add(1, Ordering::SeqCst);
            return Ok(IssuedToken::new(request, format!("late#{n}")));
        }
        self.tokens.respond(request)
    }
}

#[derive(Default)]
struct MediaLog {
    joins: Mutex<Vec<JoinRequest>>,
    leaves: Mutex<Vec<u64>>,
    trace: Mutex<Vec<String>>,
    fail_join: AtomicBool,
    join_gate: Mutex<Option<Arc<Notify>>>,
}

#[derive(Clone, Default)]
struct Media(Arc<MediaLog>);

impl Media {
    /// Every subsequent `join` waits until the returned gate is opened.
    fn gate_joins(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.0.join_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    fn joins(&self) -> Vec<JoinRequest> {
        self.0.joins.lock().unwrap().clone()
    }

    fn leaves(&self) -> Vec<u64> {
        self.0.leaves.lock().unwrap().clone()
    }

    fn trace(&self) -> Vec<String> {
        self.0.trace.lock().unwrap().clone()
    }

    /// The `Connected` signal for the most recent join.
    fn connected(&self) -> MediaEvent {
        MediaEvent::Connected {
            attempt: self.joins().last().expect("a join").attempt,
        }
    }

    /// A `Disconnected` signal for the most recent join.
    fn dropped(&self, reason: &str) -> MediaEvent {
        MediaEvent::Disconnected {
            attempt: self.joins().last().expect("a join").attempt,
            reason: reason.into(),
        }
    }
}

impl MediaSession for Media {
    async fn join(&self, request: JoinRequest) -> Result<(), SdkError> {
        let attempt = request.attempt;
        self.0.joins.lock().unwrap().push(request);
        self.0.trace.lock().unwrap().push(format!("join_start:{attempt}"));

        let gate = self.0.join_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.0.trace.lock().unwrap().push(format!("join_done:{attempt}"));

        if self.0.fail_join.load(Ordering::SeqCst) {
            return Err(SdkError::Connection("websocket handshake refused".into()));
        }
        Ok(())
    }

    async fn leave(&self, attempt: u64) {
        self.0.leaves.lock().unwrap().push(attempt);
        self.0.trace.lock().unwrap().push(format!("leave:{attempt}"));
    }
}

fn config() -> BootstrapConfig {
    BootstrapConfig {
        token_url: "http://issuer.invalid".into(),
        server_url: "wss://media.example.com".into(),
        room: RoomId::parse("Medical Assistance").unwrap(),
        agent_identity: ParticipantIdentity::parse("HeyDocAI").unwrap(),
    }
}

fn local() -> ParticipantIdentity {
    ParticipantIdentity::parse("Web-User-42").unwrap()
}

fn controller<T: TokenSource>(tokens: T, media: Media) -> BootstrapController<T, Media> {
    BootstrapController::new(&config(), local(), tokens, media)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn user_then_agent_then_join() {
    let tokens = Tokens::default();
    let media = Media::default();
    let ctl = controller(tokens.clone(), media.clone());

    let state = ctl.connect().await;
    assert_eq!(state, ConnectionState::ReadyToJoin);

    let calls = tokens.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].room.as_str(), "Medical Assistance");
    assert_eq!(calls[0].identity.as_str(), "Web-User-42");
    assert_eq!(calls[0].kind, ParticipantKind::Standard);
    assert_eq!(calls[1].room.as_str(), "Medical Assistance");
    assert_eq!(calls[1].identity.as_str(), "HeyDocAI");
    assert_eq!(calls[1].kind, ParticipantKind::Agent);

    let joins = media.joins();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].token, "Web-User-42#0");
    assert_eq!(joins[0].room.as_str(), "Medical Assistance");
    assert_eq!(joins[0].server_url, "wss://media.example.com");

    let session = ctl.session().await;
    assert!(session.user().is_present());
    assert!(session.agent().is_present());

    ctl.handle_media_event(media.connected()).await;
    assert_eq!(ctl.state(), ConnectionState::Connected);
}

#[tokio::test]
async fn rejected_user_token_never_requests_agent() {
    let tokens = Tokens::default();
    tokens.script_user(&[Outcome::Reject]);
    let media = Media::default();
    let ctl = controller(tokens.clone(), media.clone());

    let state = ctl.connect().await;

    let cause = state.error_message().expect("failed state");
    assert!(cause.contains("invalid request"), "{cause}");
    assert_eq!(ctl.error_message().as_deref(), Some(cause));

    let agent_calls = tokens.calls().iter().filter(|c| c.kind.is_agent()).count();
    assert_eq!(agent_calls, 0);
    assert!(media.joins().is_empty());
}

#[tokio::test]
async fn agent_failure_never_joins() {
    let tokens = Tokens::default();
    tokens.script_agent(&[Outcome::Fail]);
    let media = Media::default();
    let ctl = controller(tokens.clone(), media.clone());

    let state = ctl.connect().await;

    assert!(matches!(state, ConnectionState::Failed { .. }));
    assert!(state
        .error_message()
        .unwrap()
        .starts_with("Failed to fetch agent token from server"));
    assert!(media.joins().is_empty());

    let session = ctl.session().await;
    assert_eq!(session.user(), &CredentialSlot::Absent);
    assert!(matches!(session.agent(), CredentialSlot::Failed(_)));

    let attempt = ctl.session().await.attempt();
    ctl.handle_media_event(MediaEvent::Connected { attempt }).await;
    assert!(matches!(ctl.state(), ConnectionState::Failed { .. }));
}

#[tokio::test]
async fn media_join_failure_fails_attempt() {
    let tokens = Tokens::default();
    let media = Media::default();
    media.0.fail_join.store(true, Ordering::SeqCst);
    let ctl = controller(tokens, media.clone());

    let state = ctl.connect().await;

    let cause = state.error_message().unwrap();
    assert!(cause.starts_with("Failed to connect to media server"), "{cause}");
    assert!(ctl.session().await.user().token().is_none());
}

#[tokio::test]
async fn explicit_disconnect_clears_credentials() {
    let media = Media::default();
    let ctl = controller(Tokens::default(), media.clone());

    ctl.connect().await;
    ctl.handle_media_event(media.connected()).await;
    ctl.disconnect().await;

    assert_eq!(ctl.state(), ConnectionState::Idle);
    assert_eq!(media.leaves(), vec![media.joins()[0].attempt]);
    let session = ctl.session().await;
    assert_eq!(session.user(), &CredentialSlot::Absent);
    assert_eq!(session.agent(), &CredentialSlot::Absent);
}

#[tokio::test]
async fn media_disconnect_signal_returns_idle() {
    let media = Media::default();
    let ctl = controller(Tokens::default(), media.clone());

    ctl.connect().await;
    ctl.handle_media_event(media.connected()).await;
    ctl.handle_media_event(media.dropped("network lost")).await;

    assert_eq!(ctl.state(), ConnectionState::Idle);
    let session = ctl.session().await;
    assert_eq!(session.user(), &CredentialSlot::Absent);
    assert_eq!(session.agent(), &CredentialSlot::Absent);
    assert!(media.leaves().is_empty());
}

#[tokio::test]
async fn retry_reissues_both_credentials() {
    let tokens = Tokens::default();
    tokens.script_agent(&[Outcome::Fail]);
    let media = Media::default();
    let ctl = controller(tokens.clone(), media.clone());

    let first = ctl.connect().await;
    assert!(matches!(first, ConnectionState::Failed { .. }));

    let second = ctl.connect().await;
    assert_eq!(second, ConnectionState::ReadyToJoin);

    let kinds: Vec<_> = tokens.calls().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParticipantKind::Standard,
            ParticipantKind::Agent,
            ParticipantKind::Standard,
            ParticipantKind::Agent,
        ]
    );

    // The first attempt's user token was "#0"; the retry must not reuse it.
    let joins = media.joins();
    assert_eq!(joins.len(), 1);
    assert_ne!(joins[0].token, "Web-User-42#0");
}

#[tokio::test]
async fn connect_is_ignored_while_connected() {
    let tokens = Tokens::default();
    let media = Media::default();
    let ctl = controller(tokens.clone(), media.clone());

    ctl.connect().await;
    ctl.handle_media_event(media.connected()).await;

    let state = ctl.connect().await;
    assert_eq!(state, ConnectionState::Connected);
    assert_eq!(tokens.calls().len(), 2);
}

#[tokio::test]
async fn disconnect_discards_in_flight_user_token() {
    let gated = GatedTokens::default();
    let media = Media::default();
    let ctl = controller(gated.clone(), media.clone());

    let mut states = ctl.subscribe();
    let attempt = tokio::spawn({
        let ctl = ctl.clone();
        async move { ctl.connect().await }
    });

    states
        .wait_for(|s| *s == ConnectionState::AcquiringUser)
        .await
        .unwrap();

    // A second connect while the first is suspended must not start anything.
    assert_eq!(ctl.connect().await, ConnectionState::AcquiringUser);

    ctl.disconnect().await;
    assert_eq!(ctl.state(), ConnectionState::Idle);

    gated.gate.notify_one();
    let settled = attempt.await.unwrap();

    assert_eq!(settled, ConnectionState::Idle);
    assert_eq!(ctl.state(), ConnectionState::Idle);
    assert_eq!(ctl.session().await.user(), &CredentialSlot::Absent);
    assert_eq!(gated.tokens.calls().len(), 1);
    assert!(media.joins().is_empty());
}

#[tokio::test]
async fn pumped_media_events_drive_state() {
    let media = Media::default();
    let ctl = controller(Tokens::default(), media.clone());
    ctl.connect().await;

    let (tx, rx) = mpsc::channel(4);
    tx.send(media.connected()).await.unwrap();
    drop(tx);
    ctl.pump_media_events(rx).await;
    assert_eq!(ctl.state(), ConnectionState::Connected);

    let (tx, rx) = mpsc::channel(4);
    tx.send(media.dropped("server shutdown")).await.unwrap();
    drop(tx);
    ctl.pump_media_events(rx).await;
    assert_eq!(ctl.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn media_drop_before_connected_is_failure() {
    let media = Media::default();
    let ctl = controller(Tokens::default(), media.clone());
    ctl.connect().await;

    ctl.handle_media_event(media.dropped("ice failed")).await;

    assert_eq!(
        ctl.error_message().as_deref(),
        Some("Media session disconnected before connecting: ice failed")
    );
}

#[tokio::test]
async fn disconnect_during_join_leaves_after_join_returns() {
    let media = Media::default();
    let gate = media.gate_joins();
    let ctl = controller(Tokens::default(), media.clone());

    let attempt = tokio::spawn({
        let ctl = ctl.clone();
        async move { ctl.connect().await }
    });

    // Wait until the media session is mid-join.
    while media.joins().is_empty() {
        tokio::task::yield_now().await;
    }
    let joined = media.joins()[0].attempt;

    ctl.disconnect().await;
    assert_eq!(ctl.state(), ConnectionState::Idle);

    gate.notify_one();
    let settled = attempt.await.unwrap();

    assert_eq!(settled, ConnectionState::Idle);
    assert_eq!(ctl.session().await.user(), &CredentialSlot::Absent);

    // The transport that came up after the disconnect was torn down again.
    let trace = media.trace();
    let done = trace
        .iter()
        .position(|t| *t == format!("join_done:{joined}"))
        .expect("join finished");
    assert_eq!(trace.last(), Some(&format!("leave:{joined}")));
    assert!(trace[done..].contains(&format!("leave:{joined}")));
    assert!(media.leaves().iter().all(|a| *a == joined));

    // Its late signal does not resurrect the abandoned attempt.
    ctl.handle_media_event(MediaEvent::Connected { attempt: joined })
        .await;
    assert_eq!(ctl.state(), ConnectionState::Idle);
}

#[tokio::test]
async fn stale_disconnect_does_not_fail_next_attempt() {
    let media = Media::default();
    let ctl = controller(Tokens::default(), media.clone());

    ctl.connect().await;
    let stale = media.dropped("transport closed");
    ctl.disconnect().await;

    assert_eq!(ctl.connect().await, ConnectionState::ReadyToJoin);
    let joins = media.joins();
    assert_eq!(joins.len(), 2);
    assert_ne!(joins[0].attempt, joins[1].attempt);

    ctl.handle_media_event(stale).await;
    assert_eq!(ctl.state(), ConnectionState::ReadyToJoin);
    assert!(ctl.error_message().is_none());

    ctl.handle_media_event(media.connected()).await;
    assert_eq!(ctl.state(), ConnectionState::Connected);
}
