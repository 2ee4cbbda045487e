//! Error types for the Crocodoc API client.
//!
//! # Design
//! Transport failures and non-2xx statuses are the "request failed" outcome
//! and are grouped by `is_request_failure`. A 2xx body that does not decode
//! is a contract violation and gets its own variant, as does the JSON error
//! payload the remote service sends with a success status. Caller misuse is
//! rejected before any request is built.

use thiserror::Error;

/// Errors returned by the Crocodoc client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A successful response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The service reported an error inside a successful response.
    #[error("remote error: {message}")]
    Remote { message: String },

    /// The call was rejected locally before building a request.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// True when the request itself failed: no response, or a non-2xx one.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::HttpStatus { .. })
    }
}
