//! Error types for pgrest.

use thiserror::Error;

/// Result type for a single table read.
pub type Result<T> = std::result::Result<T, ReadError>;

/// Everything that can go wrong while reading a table.
///
/// None of these escape a read: the reader folds them into an
/// [`Envelope::Error`](crate::Envelope::Error) using their `Display` text.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed filters: {0}")]
    MalformedFilters(String),

    #[error("cannot encode filter '{column}': {reason}")]
    Encoding { column: String, reason: String },

    #[error("filter '{0}' collides with a reserved query parameter")]
    ReservedFilterKey(String),

    #[error("invalid table name '{0}'")]
    InvalidTable(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("backend returned {status}: {body}")]
    Status { status: String, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ReadError {
    /// True for failures reported by, or on the way to, the backend.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { .. } | Self::Decode(_))
    }
}

/// Startup-time configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
}
