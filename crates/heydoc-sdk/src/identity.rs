//! Local participant naming.

use heydoc_models::ParticipantIdentity;
use rand::Rng;

/// Prefix of generated web-user identities.
pub const LOCAL_IDENTITY_PREFIX: &str = "Web-User-";

/// Generate a random, non-authenticated label for the local user.
///
/// Called once per process; the result lives as long as the controller and
/// is never persisted.
pub fn generate_local_identity() -> ParticipantIdentity {
    let n = rand::thread_rng().gen_range(0..1000);
    ParticipantIdentity::numbered(LOCAL_IDENTITY_PREFIX, n)
}
