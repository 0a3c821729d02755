use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use redflagged_core::error::{self, ApiError};

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Missing or unknown API key (401)
    Unauthorized {
        message: String,
        docs_hint: Option<String>,
    },
    /// Unknown route or resource (404)
    NotFound { resource: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Unauthorized { message, docs_hint } => (
                StatusCode::UNAUTHORIZED,
                ApiError {
                    error: error::codes::UNAUTHORIZED.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("{resource} not found"),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: Some(
                        "See /swagger-ui for the list of available endpoints.".to_string(),
                    ),
                },
            ),
        };

        (status, Json(api_error)).into_response()
    }
}
