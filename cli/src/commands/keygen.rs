use redflagged_core::auth::{generate_api_key, key_prefix};
use serde_json::json;

use crate::util::pretty;

/// Print a fresh API key and the digest the server should be configured with.
pub fn run() -> i32 {
    let (key, hash) = generate_api_key();
    let output = json!({
        "api_key": key,
        "prefix": key_prefix(&key),
        "sha256": hash,
        "next_step": "Append sha256 to REDFLAGGED_API_KEY_HASHES on the server and give api_key to the client."
    });
    println!("{}", pretty(&output));
    0
}
