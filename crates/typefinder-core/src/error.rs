//! Error types and diagnostics for finder generation.
//!
//! Failures are scoped to the single finder that triggered them. The pipeline
//! converts each [`FinderError`] into a [`Diagnostic`] and keeps going with the
//! remaining finders; no partial output is produced for a failed finder.
//!
//! ## Diagnostic Codes
//!
//! | Error | Code | Severity |
//! |-------|------|----------|
//! | `ShapeMismatch` | `shape_mismatch` | warning (only when reporting is enabled) |
//! | `AllocatorExhausted` | `allocator_exhausted` | error |
//! | `CycleDetected` | `cycle_detected` | error |
//! | `UnknownType` | `unknown_type` | error |
//! | `InvalidTypeRef` | `invalid_type_ref` | error |

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TypeName;

/// Errors raised while validating or planning one finder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinderError {
    /// The marked method is not `fn(one parameter) -> collection of one named type`.
    #[error("'{method}' does not have the finder shape: {reason}")]
    ShapeMismatch { method: String, reason: String },

    /// Collection nesting is deeper than the loop-variable pool.
    #[error("loop variable pool exhausted (capacity {capacity})")]
    AllocatorExhausted { capacity: usize },

    /// A type reappeared on the active traversal path.
    #[error("type '{ty}' reappears on the traversal path at '{path}'")]
    CycleDetected { ty: TypeName, path: String },

    /// The metadata provider has no descriptor for a referenced type.
    #[error("unknown type '{ty}'")]
    UnknownType { ty: TypeName },

    /// Type reference text could not be parsed.
    #[error("invalid type reference '{input}': {message}")]
    InvalidTypeRef { input: String, message: String },
}

/// Result type for finder operations.
pub type FinderResult<T> = Result<T, FinderError>;

impl FinderError {
    /// Stable code used in diagnostics and JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            FinderError::ShapeMismatch { .. } => "shape_mismatch",
            FinderError::AllocatorExhausted { .. } => "allocator_exhausted",
            FinderError::CycleDetected { .. } => "cycle_detected",
            FinderError::UnknownType { .. } => "unknown_type",
            FinderError::InvalidTypeRef { .. } => "invalid_type_ref",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FinderError::ShapeMismatch { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Convert into a diagnostic attributed to `finder` (`Container.Method`).
    pub fn to_diagnostic(&self, finder: impl Into<String>) -> Diagnostic {
        Diagnostic {
            severity: self.severity(),
            code: self.code().to_string(),
            finder: finder.into(),
            message: self.to_string(),
        }
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A reported problem with one finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// `Container.Method` label of the finder.
    pub finder: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}: {}",
            self.severity, self.code, self.finder, self.message
        )
    }
}
