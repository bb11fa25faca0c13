//! # Digest Engine
//!
//! Pure digest computation: SHA-512 over the input bytes, rendered as
//! standard base64 so the result is safe to place in a text response body.
//!
//! The function is deterministic across calls and across process restarts;
//! there is no per-process salt and no failure mode for any input.

use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha512};

/// Compute the base64-encoded SHA-512 digest of a value
///
/// Pure and infallible. Identical input always yields identical output.
/// The result is always 88 characters (64 digest bytes, base64 with padding).
#[must_use]
pub fn digest(value: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(value.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}
