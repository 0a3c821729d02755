use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use redflagged_core::auth::{API_KEY_PREFIX, hash_token, key_prefix};

use crate::error::AppError;
use crate::state::AppState;

/// Caller identified by an `Authorization: Bearer rf_sk_...` API key.
///
/// When no key hashes are configured the service runs open and every request
/// resolves to `ApiCaller::Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCaller {
    Anonymous,
    ApiKey { prefix: String },
}

impl ApiCaller {
    pub fn label(&self) -> &str {
        match self {
            ApiCaller::Anonymous => "anonymous",
            ApiCaller::ApiKey { prefix } => prefix,
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized {
            message: "Missing Authorization header".to_string(),
            docs_hint: Some(format!(
                "Include 'Authorization: Bearer <key>' with an API key ({API_KEY_PREFIX}...)."
            )),
        })?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must use Bearer scheme".to_string(),
            docs_hint: Some("Format: 'Authorization: Bearer <key>'".to_string()),
        })
}

pub fn authenticate(parts: &Parts, state: &AppState) -> Result<ApiCaller, AppError> {
    if state.api_key_hashes.is_empty() {
        return Ok(ApiCaller::Anonymous);
    }

    let token = bearer_token(parts)?;
    let token_hash = hash_token(token);
    if state.api_key_hashes.iter().any(|known| *known == token_hash) {
        return Ok(ApiCaller::ApiKey {
            prefix: key_prefix(token),
        });
    }

    tracing::warn!(key_prefix = %key_prefix(token), "rejected unknown API key");
    Err(AppError::Unauthorized {
        message: "Invalid API key".to_string(),
        docs_hint: Some("Check that the API key is correct and has not been rotated.".to_string()),
    })
}

impl FromRequestParts<AppState> for ApiCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
    }
}
