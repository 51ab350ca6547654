//! Partner access tokens.
//!
//! A token is a bearer capability: whoever holds it may submit the second
//! half of exactly one session. Tokens are issued once at session creation
//! and never rotated.

use rand::Rng;

/// Length of the generated token (alphanumeric characters).
///
/// 32 characters over a 62-symbol alphabet is ~190 bits of entropy.
pub const TOKEN_LENGTH: usize = 32;

/// Number of leading characters safe to show in logs.
pub const TOKEN_LOG_PREFIX_LENGTH: usize = 6;

/// Generate a fresh partner token from the thread-local CSPRNG.
pub fn issue() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Short, non-reversible fingerprint of a token for structured logs.
pub fn fingerprint(token: &str) -> String {
    let digest = crate::hashing::sha256_hex(token.as_bytes());
    digest[..TOKEN_LOG_PREFIX_LENGTH].to_string()
}

/// Cheap shape check before hitting the store.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}
