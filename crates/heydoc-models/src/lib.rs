#![deny(missing_docs)]

//! # HeyDoc Models
//!
//! Core data types shared by the HeyDoc token issuer and the session
//! bootstrap SDK.
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`room`] | Room and participant addressing (`RoomId`, `ParticipantIdentity`, `ParticipantKind`) |
//! | [`grant`] | Capability bits carried by a credential (`Grant`, `GrantSet`) |
//! | [`credential`] | The immutable, signed `Credential` value |
//! | [`wire`] | JSON bodies of the issuer's HTTP contract |

pub mod credential;
pub mod error;
pub mod grant;
pub mod room;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use credential::*;
pub use error::*;
pub use grant::*;
pub use room::*;
pub use wire::*;
