//! State tokens for cross-session confusion protection

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of random bytes in a state token (22 URL-safe characters).
const STATE_TOKEN_BYTES: usize = 16;

/// Generate an unguessable, URL-safe state token.
pub fn generate_state_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..STATE_TOKEN_BYTES).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Compare an expected state against the one echoed back by the store.
///
/// Constant-time over the shorter input so a mismatch position is not
/// observable through timing.
pub fn states_match(expected: &str, actual: &str) -> bool {
    let expected = expected.as_bytes();
    let actual = actual.as_bytes();
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Replace a sensitive identifier (an email address) with a short salted
/// hash suitable for log fields.
pub fn redact_identifier(value: &str) -> String {
    const REDACTION_SALT: &[u8] = b"guildlink-directory-redaction-salt";
    let mut hasher = Sha256::new();
    hasher.update(REDACTION_SALT);
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    format!("hash={}", hex::encode(&digest[..8]))
}
