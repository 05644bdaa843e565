//! Unverified inspection of a signed token's payload.

use anyhow::{bail, Context};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// Decode the claims segment of a compact JWT without checking its
/// signature. For display only.
pub fn decode_unverified(token: &str) -> anyhow::Result<Value> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        bail!("token is not a three-segment JWT");
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("claims segment is not base64url")?;
    serde_json::from_slice(&bytes).context("claims segment is not JSON")
}
