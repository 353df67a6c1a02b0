//! HTTP-facing error type.
//!
//! Every error leaves the service as
//! `{ "error": { "code", "message", "details" } }` with a status code that
//! separates caller mistakes (4xx) from storage failures (5xx).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::application::services::LinkError;
use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serialized error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
    #[error("{message}")]
    Unavailable { message: String, details: Value },
    #[error("{message}")]
    Timeout { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }

    /// Status code and machine-readable code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            Self::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
            Self::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "storage_timeout"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let (message, details) = match self {
            Self::Validation { message, details }
            | Self::NotFound { message, details }
            | Self::Internal { message, details }
            | Self::Unavailable { message, details }
            | Self::Timeout { message, details } => (message, details),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        let message = err.to_string();
        match err {
            LinkError::MissingUrl => AppError::bad_request(message, json!({ "field": "longUrl" })),
            LinkError::DisallowedUrl { prefix } => {
                AppError::bad_request(message, json!({ "allowed_prefix": prefix }))
            }
            LinkError::InvalidToken(_) => AppError::bad_request(message, json!({})),
            LinkError::NotFound(token) => AppError::not_found(
                "Short link not found",
                json!({ "token": token }),
            ),
            LinkError::Timeout(after) => {
                AppError::timeout(message, json!({ "timeout_ms": after.as_millis() as u64 }))
            }
            LinkError::Storage(StoreError::InvalidInput(_)) => {
                AppError::bad_request(message, json!({}))
            }
            LinkError::Storage(StoreError::Transport(_)) => {
                error!("Storage unavailable: {}", message);
                AppError::unavailable("Storage backend unavailable", json!({}))
            }
            LinkError::Storage(_) | LinkError::CorruptRecord(_) | LinkError::Entropy(_) => {
                error!("Internal error: {}", message);
                AppError::internal("Internal server error", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        AppError::bad_request("Request validation failed", json!({ "fields": fields }))
    }
}
