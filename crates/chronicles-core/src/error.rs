//! Error types for the Crime Chronicles client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message surfaced when a query is submitted without any text.
pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty.";

/// A shared error type for the entire client.
///
/// Every variant ends up as a user-visible message; none of them is fatal.
/// Validation variants (`EmptyQuery`, `MissingField`, `NotSignedIn`) are
/// raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChroniclesError {
    /// The query text was empty or whitespace only
    #[error("Query cannot be empty.")]
    EmptyQuery,

    /// A required form field was left blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A query or history fetch was attempted without a signed-in user
    #[error("Please log in first.")]
    NotSignedIn,

    /// The backend answered with a non-success status
    #[error("{detail}")]
    Backend { status: Option<u16>, detail: String },

    /// Connection, protocol or response decoding failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend did not answer within the configured timeout
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChroniclesError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a Backend error
    pub fn backend(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::Backend {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Timeout error for `limit`, rounding partial seconds up.
    pub fn timeout(limit: Duration) -> Self {
        let seconds = limit.as_secs() + u64::from(limit.subsec_nanos() > 0);
        Self::Timeout { seconds }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this error was raised locally before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuery | Self::MissingField { .. } | Self::NotSignedIn
        )
    }

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a Timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the message to show the user.
    ///
    /// Backend errors carry the server's `detail` text; an empty detail falls
    /// back to `fallback`. Every other variant renders its own description.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend { detail, .. } if detail.trim().is_empty() => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChroniclesError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChroniclesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChroniclesError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ChroniclesError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ChroniclesError>`.
pub type Result<T> = std::result::Result<T, ChroniclesError>;
