//! Error types for the todo API client.
//!
//! `NotFound` and `BadRequest` get their own variants because callers act on
//! them (unknown id, rejected payload). Any other unexpected status lands in
//! `HttpError` with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the payload (400 or 422).
    #[error("request rejected ({status}): {body}")]
    BadRequest { status: u16, body: String },

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
