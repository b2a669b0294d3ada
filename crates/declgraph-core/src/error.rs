//! Error types and error code constants for declgraph.
//!
//! Almost everything that goes wrong while indexing is recoverable and ends
//! up as a [`Diagnostic`](crate::diagnostics::Diagnostic). [`IndexError`]
//! covers the few things that stop a run or a caller request outright.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad configuration, missing path, malformed query)
//! - `3`: Resolution errors (no symbol matches the query)
//! - `10`: Internal errors (cancelled run, thread pool, I/O)

use std::fmt;

use thiserror::Error;

use crate::span::FileId;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (symbol not found).
    ResolutionError = 3,
    /// Internal errors (cancellation, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Index Error
// ============================================================================

/// Run-level and request-level failures.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The run was cancelled; no snapshot was published.
    #[error("indexing run cancelled")]
    Cancelled,

    /// A file could not be indexed. Only that file's contribution is lost.
    #[error("unreadable input {file}: {reason}")]
    UnreadableInput { file: FileId, reason: String },

    /// Configuration value rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An input path given by the caller does not exist or cannot be walked.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Query text could not be parsed.
    #[error("invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    /// No symbol matched a query.
    #[error("no symbol matches '{query}'")]
    SymbolNotFound { query: String },

    /// Worker pool could not be created.
    #[error("thread pool error: {message}")]
    ThreadPool { message: String },

    /// I/O failure outside the engine (reading inputs, writing output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&IndexError> for OutputErrorCode {
    fn from(err: &IndexError) -> Self {
        match err {
            IndexError::InvalidConfig { .. } => OutputErrorCode::InvalidArguments,
            IndexError::InvalidQuery { .. } => OutputErrorCode::InvalidArguments,
            IndexError::InvalidPath { .. } => OutputErrorCode::InvalidArguments,
            IndexError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            IndexError::UnreadableInput { .. } => OutputErrorCode::ResolutionError,
            IndexError::Cancelled => OutputErrorCode::InternalError,
            IndexError::ThreadPool { .. } => OutputErrorCode::InternalError,
            IndexError::Io(_) => OutputErrorCode::InternalError,
            IndexError::Json(_) => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl IndexError {
    /// Create an unreadable input error.
    pub fn unreadable(file: FileId, reason: impl Into<String>) -> Self {
        IndexError::UnreadableInput {
            file,
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        IndexError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        IndexError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(query: impl Into<String>, reason: impl Into<String>) -> Self {
        IndexError::InvalidQuery {
            query: query.into(),
            reason: reason.into(),
        }
    }

    /// Create a symbol not found error.
    pub fn symbol_not_found(query: impl Into<String>) -> Self {
        IndexError::SymbolNotFound {
            query: query.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_config_maps_to_invalid_arguments() {
            let err = IndexError::invalid_config("threads must be positive");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn symbol_not_found_maps_to_resolution_error() {
            let err = IndexError::symbol_not_found("graphics.Square");
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn missing_path_maps_to_invalid_arguments() {
            let err = IndexError::invalid_path("src/missing", "no such file or directory");
            assert_eq!(err.error_code().code(), 2);
            assert_eq!(
                err.to_string(),
                "invalid path 'src/missing': no such file or directory"
            );
        }

        #[test]
        fn cancelled_maps_to_internal_error() {
            assert_eq!(
                IndexError::Cancelled.error_code(),
                OutputErrorCode::InternalError
            );
            assert_eq!(IndexError::Cancelled.error_code().code(), 10);
        }
    }

    mod display {
        use super::*;

        #[test]
        fn unreadable_input_names_file() {
            let err = IndexError::unreadable(FileId::new("bin/blob.cpp"), "contains NUL bytes");
            assert_eq!(
                err.to_string(),
                "unreadable input bin/blob.cpp: contains NUL bytes"
            );
        }

        #[test]
        fn output_code_display() {
            assert_eq!(OutputErrorCode::ResolutionError.to_string(), "3");
        }
    }
}
