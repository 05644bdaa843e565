//! # HeyDoc SDK
//!
//! Client-side session bootstrap for HeyDoc voice rooms.
//!
//! Before a user can talk to the voice agent, two credentials must be
//! obtained from the token issuer, strictly in order: one for the local
//! user, then one for the agent (requesting it is what brings the agent
//! into the room). Only then is the user's credential handed to the media
//! platform.
//!
//! The SDK provides:
//!
//! * [`BootstrapController`] — drives one client's connection attempts.
//! * [`BootstrapSession`] / [`ConnectionState`] — the state machine it owns.
//! * [`TokenSource`] / [`HttpTokenSource`] — where credentials come from.
//! * [`MediaSession`] / [`MediaEvent`] — the seam to the media platform.
//! * [`SdkError`] — unified error type.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use heydoc_sdk::{BootstrapConfig, BootstrapController, JoinRequest, MediaSession, SdkError};
//!
//! struct MyTransport;
//!
//! impl MediaSession for MyTransport {
//!     async fn join(&self, _request: JoinRequest) -> Result<(), SdkError> { Ok(()) }
//!     async fn leave(&self, _attempt: u64) {}
//! }
//!
//! # async fn run() -> Result<(), SdkError> {
//! let config = BootstrapConfig::from_env()?;
//! let controller = BootstrapController::over_http(&config, MyTransport);
//!
//! let state = controller.connect().await;
//! println!("settled in {state}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod media;
pub mod session;
pub mod token_source;

pub use config::BootstrapConfig;
pub use controller::BootstrapController;
pub use credentials::{IssuedToken, TokenRequest};
pub use error::{SdkError, TransitionError};
pub use identity::generate_local_identity;
pub use media::{JoinRequest, MediaEvent, MediaSession};
pub use session::{BootstrapSession, ConnectionState, CredentialSlot, SessionEvent};
pub use token_source::{HttpTokenSource, TokenSource};

// Re-export the shared model types for ergonomic usage.
pub use heydoc_models::{ParticipantIdentity, ParticipantKind, RoomId};
