//! Error taxonomy of the todo service and its HTTP mapping.
//!
//! # Design
//! Errors are raised where they are detected (validator, service, storage)
//! and only turned into status codes by the `IntoResponse` impl here. Storage
//! failures are logged in full but answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum TodoError {
    /// No todo is stored under this id.
    #[error("todo {0} not found")]
    NotFound(i64),

    /// A required field failed its check before reaching the service.
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A JSON Patch document could not be applied, or its result is not a
    /// valid todo. Nothing was written.
    #[error("patch could not be applied: {0}")]
    Patch(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TodoError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn patch(reason: impl ToString) -> Self {
        Self::Patch(reason.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Patch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "TODO_NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Patch(_) => "PATCH_FAILED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// JSON body sent with every error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        let field = match &self {
            Self::Validation { field, .. } => Some(field.to_string()),
            _ => None,
        };
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message,
            field,
        };
        (self.status_code(), Json(body)).into_response()
    }
}
