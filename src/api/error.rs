use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use duckdb::Connection;
use serde_json::json;
use std::sync::{MutexGuard, PoisonError};
use thiserror::Error;
use tracing::error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Generation failure on the chat endpoint, where the upstream detail is
    /// passed through to the caller.
    #[error("Failed to generate response: {0}")]
    ChatGeneration(String),

    #[error("Database error: {0}")]
    Persistence(#[from] duckdb::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl<'a> From<PoisonError<MutexGuard<'a, Connection>>> for ApiError {
    fn from(_: PoisonError<MutexGuard<'a, Connection>>) -> Self {
        ApiError::Internal("database lock poisoned".to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Generation(_)
            | ApiError::ChatGeneration(_)
            | ApiError::Persistence(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Unauthorized | ApiError::Validation(_) | ApiError::NotFound(_) => {
                json!({ "error": self.to_string() })
            }
            ApiError::ChatGeneration(details) => {
                error!("Chat generation failed: {}", details);
                json!({ "error": "Failed to generate response", "details": details })
            }
            _ => {
                error!("{}", self);
                json!({ "error": "Internal server error" })
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Rejects required fields that are empty or whitespace. The value is
/// handed back as sent.
pub fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(message.to_string()));
    }
    Ok(value)
}
