//! Error types for the FINER wizard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire wizard.
///
/// Structural problems in AI output never surface here: the normalizer
/// absorbs them into a fallback proposal. What remains are transport
/// failures, rejected writes, bad import files and storage trouble.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FinerError {
    /// Transport failure or non-success status from an AI provider
    #[error("AI request failed: {message}")]
    AiRequest {
        status_code: Option<u16>,
        message: String,
    },

    /// An AI call did not resolve within the configured bound
    #[error("AI request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Malformed import file; the in-memory document is unchanged
    #[error("Import failed: {0}")]
    Import(String),

    /// Durable storage read/write failure (logged, never blocking)
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Dotted path does not address an existing container
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Value does not fit the typed field at the path
    #[error("Invalid value at '{path}': {message}")]
    InvalidValue { path: String, message: String },

    /// A write would break a document invariant
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinerError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an AiRequest error
    pub fn ai_request(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self::AiRequest {
            status_code,
            message: message.into(),
        }
    }

    /// Creates an InvalidPath error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidValue error
    pub fn invalid_value(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an Import error
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates an Invariant error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
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

    /// Check if this error came from the AI layer (transport, status or timeout).
    ///
    /// These are the errors a step surfaces next to a retry control.
    pub fn is_ai_failure(&self) -> bool {
        matches!(self, Self::AiRequest { .. } | Self::Timeout { .. })
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is an import error
    pub fn is_import(&self) -> bool {
        matches!(self, Self::Import(_))
    }

    /// Check if this error rejected a store write
    pub fn is_rejected_write(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. } | Self::InvalidValue { .. } | Self::Invariant(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FinerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FinerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FinerError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FinerError>`.
pub type Result<T> = std::result::Result<T, FinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_failure_classification() {
        assert!(FinerError::ai_request(Some(500), "boom").is_ai_failure());
        assert!(FinerError::Timeout { seconds: 3 }.is_ai_failure());
        assert!(!FinerError::import("bad").is_ai_failure());
    }

    #[test]
    fn test_rejected_write_classification() {
        assert!(FinerError::invalid_path("a.b", "missing").is_rejected_write());
        assert!(FinerError::invariant("step").is_rejected_write());
        assert!(!FinerError::persistence("quota").is_rejected_write());
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let converted: FinerError = err.into();
        match converted {
            FinerError::Serialization { format, .. } => assert_eq!(format, "JSON"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
