//! Error types for launchfeed.
//!
//! This module defines all error types used throughout the launchfeed crate,
//! providing detailed context for debugging and user-friendly error messages.

use thiserror::Error;

/// Maximum number of response body bytes kept in a [`Error::Status`] message.
const BODY_EXCERPT_LEN: usize = 256;

/// The main error type for launchfeed operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Upstream Errors ===
    /// The HTTP request could not be sent or the connection failed.
    #[error("request to launch endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream endpoint answered with a non-success status.
    #[error("launch endpoint returned {status} for page {page}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The page that was requested.
        page: u32,
        /// Excerpt of the response body.
        body: String,
    },

    /// The upstream payload could not be decoded into launch records.
    #[error("malformed launch page {page}: {message}")]
    Decode {
        /// The page that was requested.
        page: u32,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === View Errors ===
    /// The page view has been torn down and no longer accepts signals.
    #[error("page view is closed")]
    ViewClosed,

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for launchfeed operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a status error, trimming the body to a short excerpt.
    #[must_use]
    pub fn status(status: u16, page: u32, body: &str) -> Self {
        let body = match body.char_indices().nth(BODY_EXCERPT_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::Status { status, page, body }
    }

    /// Create a decode error for the given page.
    #[must_use]
    pub fn decode(page: u32, message: impl Into<String>) -> Self {
        Self::Decode {
            page,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error came from talking to the upstream endpoint.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Decode { .. }
        )
    }
}
