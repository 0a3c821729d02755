//! JSON extractor that reports body errors as structured `AppError`s instead
//! of axum's plain-text rejection.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    let field = field_from_serde_message(&body_text).unwrap_or_else(|| "body".to_string());

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        field: Some(field),
        received: None,
        docs_hint: Some(
            "Check the request body against the schema at /api-doc/openapi.json.".to_string(),
        ),
    }
}

/// Pull the offending field out of serde messages such as
/// "missing field `vin` at line 1 column 2".
fn field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `"]
        .iter()
        .find_map(|pattern| {
            let start = msg.find(pattern)? + pattern.len();
            let rest = &msg[start..];
            rest.find('`').map(|end| rest[..end].to_string())
        })
}
