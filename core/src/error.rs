//! Error types for the Coolapk API client.
//!
//! # Design
//! Transport failures (`NetworkError`) are kept apart from non-2xx responses
//! (`HttpError`) because the health check treats only the former as "service
//! unreachable". Everything else propagates to the caller unchanged.

use thiserror::Error;

/// Errors returned by `CoolapkClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, or another I/O failure.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not JSON, or lacked a required field.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The configured base URL and endpoint do not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl ApiError {
    /// Status code carried by an `HttpError`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
