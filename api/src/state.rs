use std::sync::Arc;

use redflagged_core::auth::parse_key_hashes;

use crate::upstream::SourceEndpoints;

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub sources: Arc<SourceEndpoints>,
    /// SHA-256 hex digests of accepted API keys. Empty disables auth.
    pub api_key_hashes: Arc<Vec<String>>,
}

impl AppState {
    pub fn from_env() -> Self {
        let api_key_hashes =
            parse_key_hashes(&std::env::var("REDFLAGGED_API_KEY_HASHES").unwrap_or_default());
        Self {
            http: reqwest::Client::new(),
            sources: Arc::new(SourceEndpoints::from_env()),
            api_key_hashes: Arc::new(api_key_hashes),
        }
    }

    #[cfg(test)]
    pub fn for_tests(api_key_hashes: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            sources: Arc::new(SourceEndpoints::new(std::time::Duration::from_millis(100))),
            api_key_hashes: Arc::new(api_key_hashes),
        }
    }
}
