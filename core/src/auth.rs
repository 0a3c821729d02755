use rand::Rng;
use sha2::{Digest, Sha256};

pub const API_KEY_PREFIX: &str = "rf_sk_";

/// Generate an API key. Returns `(full_key, sha256_hash)`.
/// Key format: `rf_sk_` + 32 random bytes hex-encoded.
pub fn generate_api_key() -> (String, String) {
    let raw = random_hex(32);
    let full_key = format!("{API_KEY_PREFIX}{raw}");
    let hash = hash_token(&full_key);
    (full_key, hash)
}

/// SHA-256 hex digest of a token string.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// First 8 chars after the key prefix, for display and log correlation.
pub fn key_prefix(full_key: &str) -> String {
    full_key
        .strip_prefix(API_KEY_PREFIX)
        .map(|rest| rest.chars().take(8).collect())
        .unwrap_or_default()
}

/// Parse a comma-separated list of SHA-256 hex digests, dropping blanks and
/// anything that is not 64 hex characters.
pub fn parse_key_hashes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit()))
        .collect()
}

fn random_hex(n: usize) -> String {
    let bytes: Vec<u8> = (0..n).map(|_| rand::thread_rng().r#gen::<u8>()).collect();
    hex::encode(&bytes)
}
