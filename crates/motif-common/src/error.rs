//! Error types for the Motif bridge.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification so callers can tell refused input from
//!   attempted-and-failed operations from unavailable resources
//!
//! Every bridge operation reports failure through these types; no operation
//! swallows a failure and reports success.

use thiserror::Error;

/// Result type alias for Motif operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of opaque handle an [`Error::InvalidHandle`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// A model handle.
    Model,
    /// A corpus handle.
    Corpus,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Model => write!(f, "model"),
            HandleKind::Corpus => write!(f, "corpus"),
        }
    }
}

/// Error categories for grouping related errors.
///
/// Callers use the category to distinguish the three user-visible failure
/// classes: input the bridge refused, operations it attempted that failed
/// internally, and resources it could not reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The call was refused before any work happened (bad shapes, stale
    /// handles).
    InvalidInput,
    /// The operation ran and failed internally (training, document decode).
    OperationFailed,
    /// A resource the operation needed was unavailable (filesystem).
    ResourceUnavailable,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::InvalidInput => write!(f, "invalid_input"),
            ErrorCategory::OperationFailed => write!(f, "operation_failed"),
            ErrorCategory::ResourceUnavailable => write!(f, "resource_unavailable"),
        }
    }
}

/// Unified error type for the Motif bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed shapes, dimensionality mismatches, or preconditions the
    /// caller violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An unknown or already-destroyed handle.
    #[error("invalid {kind} handle {id} (unknown or destroyed)")]
    InvalidHandle {
        /// Which handle namespace the id belongs to.
        kind: HandleKind,
        /// The opaque id the caller presented.
        id: u64,
    },

    /// Training was attempted and failed inside the model.
    #[error("model training failed: {0}")]
    ModelFit(String),

    /// A persisted document could not be decoded or validated.
    #[error("malformed model document: {0}")]
    Format(String),

    /// Reading or writing durable storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the stable error code for this error.
    ///
    /// Codes are grouped by category:
    /// - 10-19: invalid input
    /// - 20-29: invalid handles
    /// - 30-39: training failures
    /// - 40-49: document format failures
    /// - 50-59: I/O failures
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument(_) => 10,
            Error::InvalidHandle { .. } => 20,
            Error::ModelFit(_) => 30,
            Error::Format(_) => 40,
            Error::Io(_) => 50,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) | Error::InvalidHandle { .. } => ErrorCategory::InvalidInput,
            Error::ModelFit(_) | Error::Format(_) => ErrorCategory::OperationFailed,
            Error::Io(_) => ErrorCategory::ResourceUnavailable,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::InvalidArgument("x".into()).code(), 10);
        assert_eq!(
            Error::InvalidHandle {
                kind: HandleKind::Model,
                id: 3
            }
            .code(),
            20
        );
        assert_eq!(Error::ModelFit("x".into()).code(), 30);
        assert_eq!(Error::Format("x".into()).code(), 40);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InvalidArgument("x".into()).category(),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            Error::InvalidHandle {
                kind: HandleKind::Corpus,
                id: 7
            }
            .category(),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            Error::ModelFit("x".into()).category(),
            ErrorCategory::OperationFailed
        );
        assert_eq!(
            Error::Io(std::io::Error::other("disk")).category(),
            ErrorCategory::ResourceUnavailable
        );
    }

    #[test]
    fn test_invalid_handle_display() {
        let err = Error::InvalidHandle {
            kind: HandleKind::Model,
            id: 42,
        };
        assert_eq!(
            err.to_string(),
            "invalid model handle 42 (unknown or destroyed)"
        );
    }

    #[test]
    fn test_json_error_maps_to_format() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: Error = bad.unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::OperationFailed);
        assert_eq!(err.code(), 40);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::InvalidInput.to_string(), "invalid_input");
        assert_eq!(
            ErrorCategory::ResourceUnavailable.to_string(),
            "resource_unavailable"
        );
    }
}
