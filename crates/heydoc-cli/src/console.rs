//! A media session that only talks to the terminal.
//!
//! It accepts any credential, reports the transport as up straight away,
//! and prints what a real transport would be doing.

use heydoc_sdk::{JoinRequest, MediaEvent, MediaSession, SdkError};
use tokio::sync::mpsc;

pub struct ConsoleMedia {
    events: mpsc::Sender<MediaEvent>,
}

impl ConsoleMedia {
    /// Create the session and the stream of lifecycle signals it emits.
    pub fn new() -> (Self, mpsc::Receiver<MediaEvent>) {
        let (events, rx) = mpsc::channel(8);
        (Self { events }, rx)
    }
}

impl MediaSession for ConsoleMedia {
    async fn join(&self, request: JoinRequest) -> Result<(), SdkError> {
        println!(
            "joining room '{}' on {} ({} byte credential)",
            request.room,
            request.server_url,
            request.token.len()
        );
        self.events
            .send(MediaEvent::Connected {
                attempt: request.attempt,
            })
            .await
            .map_err(|e| SdkError::Connection(e.to_string()))
    }

    async fn leave(&self, attempt: u64) {
        println!("left the room (attempt {attempt})");
    }
}
