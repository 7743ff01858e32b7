//! Error types and error code constants for the typefinder CLI.
//!
//! `TypeFinderError` bridges the errors of every stage (registry loading,
//! finder planning, plan execution, unit writing) into one type suitable
//! for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (malformed registry or input, rejected finder)
//! - `3`: Resolution errors (unknown type, finder not found, file not found)
//! - `4`: Write errors (failed to write generated units)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use typefinder_core::error::FinderError;
use typefinder_core::exec::ExecError;
use typefinder_core::model::TypeName;

use crate::registry::RegistryError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed registry).
    InvalidArguments = 2,
    /// Resolution errors (unknown type, finder not found, file not found).
    ResolutionError = 3,
    /// Failed to write generated output.
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
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
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum TypeFinderError {
    /// Invalid arguments or malformed input from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A referenced type is not known.
    #[error("unknown type '{ty}'")]
    UnknownType { ty: TypeName },

    /// No finder with the requested label.
    #[error("no finder named '{label}'")]
    FinderNotFound { label: String },

    /// The finder could not be planned.
    #[error("finder rejected ({code}): {message}")]
    FinderRejected { code: String, message: String },

    /// The input instance does not fit the finder's plan.
    #[error("execution failed: {message}")]
    ExecutionFailed { message: String },

    /// Failed to write generated output.
    #[error("write error: {message}")]
    WriteError { message: String, path: Option<String> },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TypeFinderError> for OutputErrorCode {
    fn from(err: &TypeFinderError) -> Self {
        match err {
            TypeFinderError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TypeFinderError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TypeFinderError::UnknownType { .. } => OutputErrorCode::ResolutionError,
            TypeFinderError::FinderNotFound { .. } => OutputErrorCode::ResolutionError,
            TypeFinderError::FinderRejected { .. } => OutputErrorCode::InvalidArguments,
            TypeFinderError::ExecutionFailed { .. } => OutputErrorCode::InvalidArguments,
            TypeFinderError::WriteError { .. } => OutputErrorCode::WriteError,
            TypeFinderError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TypeFinderError> for OutputErrorCode {
    fn from(err: TypeFinderError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<FinderError> for TypeFinderError {
    fn from(err: FinderError) -> Self {
        match err {
            FinderError::UnknownType { ty } => TypeFinderError::UnknownType { ty },
            other => TypeFinderError::FinderRejected {
                code: other.code().to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<ExecError> for TypeFinderError {
    fn from(err: ExecError) -> Self {
        TypeFinderError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

impl From<RegistryError> for TypeFinderError {
    fn from(err: RegistryError) -> Self {
        let message = err.to_string();
        match err {
            RegistryError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                TypeFinderError::FileNotFound {
                    path: path.display().to_string(),
                }
            }
            RegistryError::Io { .. } => TypeFinderError::internal(message),
            RegistryError::UnknownType { ty, .. } => TypeFinderError::UnknownType { ty },
            RegistryError::Json(_)
            | RegistryError::DuplicateType { .. }
            | RegistryError::InvalidDeclaration { .. }
            | RegistryError::Config(_) => TypeFinderError::invalid_args(message),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TypeFinderError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TypeFinderError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        TypeFinderError::FileNotFound { path: path.into() }
    }

    pub fn finder_not_found(label: impl Into<String>) -> Self {
        TypeFinderError::FinderNotFound {
            label: label.into(),
        }
    }

    pub fn write_error(message: impl Into<String>, path: Option<String>) -> Self {
        TypeFinderError::WriteError {
            message: message.into(),
            path,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TypeFinderError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}
