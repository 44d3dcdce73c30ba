//! Error types for kql-lens.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for kql-lens operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// Configuration errors (invalid config file, bad catalog, bad thresholds, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query input errors (missing tool parameters, unreadable query text, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Analytics backend errors (execution failures, unreadable recorded responses, etc.)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Malformed tabular responses (row/column width mismatch, unsupported cells, etc.)
    #[error("Formatting error: {0}")]
    Formatting(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LensError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a backend error with the given message.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Creates a formatting error with the given message.
    pub fn formatting(msg: impl Into<String>) -> Self {
        Self::Formatting(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Query(_) => "Query Error",
            Self::Backend(_) => "Backend Error",
            Self::Formatting(_) => "Formatting Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true if this error came from a malformed backend response.
    pub fn is_formatting(&self) -> bool {
        matches!(self, Self::Formatting(_))
    }
}

/// Result type alias using LensError.
pub type Result<T> = std::result::Result<T, LensError>;
