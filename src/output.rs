//! JSON output types for the typefinder CLI.
//!
//! Every command writes exactly one JSON document to stdout. Successful
//! responses carry `"status": "ok"`; failures are an [`ErrorResponse`] with a
//! numeric code matching the process exit code.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use typefinder_core::emit::ProcedureBody;
use typefinder_core::error::Diagnostic;
use typefinder_core::finder::FinderSpec;
use typefinder_core::generate::GenerationOutput;
use typefinder_core::group::GeneratedUnit;
use typefinder_core::model::TypeName;
use typefinder_core::plan::TraversalPlan;

use crate::error::{OutputErrorCode, TypeFinderError};

/// Schema version for all JSON responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Content Hash
// ============================================================================

/// SHA-256 of generated source, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Summary of one generated unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitInfo {
    /// Output file name.
    pub name: String,
    pub container: TypeName,
    /// Labels of the finders in this unit.
    pub finders: Vec<String>,
    pub bytes: usize,
    pub sha256: ContentHash,
    /// Full source, present when units are not written to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl UnitInfo {
    pub fn new(unit: &GeneratedUnit, include_source: bool) -> Self {
        UnitInfo {
            name: unit.name.clone(),
            container: unit.container.clone(),
            finders: unit.finders.clone(),
            bytes: unit.source.len(),
            sha256: ContentHash::compute(unit.source.as_bytes()),
            source: include_source.then(|| unit.source.clone()),
        }
    }
}

/// Response for the `generate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub units: Vec<UnitInfo>,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
    /// Finders not processed because the pass was cancelled.
    pub abandoned: usize,
    /// Directory the units were written to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

impl GenerateResponse {
    /// Build from a generation pass; `out_dir` is set when units were written.
    pub fn new(output: &GenerationOutput, out_dir: Option<&Path>) -> Self {
        let include_source = out_dir.is_none();
        GenerateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            units: output
                .units
                .iter()
                .map(|unit| UnitInfo::new(unit, include_source))
                .collect(),
            diagnostics: output.diagnostics.clone(),
            cancelled: output.cancelled,
            abandoned: output.abandoned,
            out_dir: out_dir.map(|dir| dir.display().to_string()),
        }
    }
}

/// Response for the `plan` command.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub finder: FinderSpec,
    pub plan: TraversalPlan,
    pub body: ProcedureBody,
    /// Rendered method source.
    pub source: String,
}

impl PlanResponse {
    pub fn new(finder: FinderSpec, plan: TraversalPlan, body: ProcedureBody, source: String) -> Self {
        PlanResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            finder,
            plan,
            body,
            source,
        }
    }
}

/// Response for the `exec` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// `Container.Method` label.
    pub finder: String,
    pub count: usize,
    /// Matched values, in traversal order.
    pub matches: Vec<serde_json::Value>,
}

impl ExecResponse {
    pub fn new(finder: impl Into<String>, matches: Vec<serde_json::Value>) -> Self {
        ExecResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            finder: finder.into(),
            count: matches.len(),
            matches,
        }
    }
}

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code, equal to the exit code.
    pub code: u8,
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &TypeFinderError) -> Self {
        let details = match err {
            TypeFinderError::UnknownType { ty } => Some(serde_json::json!({ "type": ty })),
            TypeFinderError::FinderNotFound { label } => Some(serde_json::json!({ "finder": label })),
            TypeFinderError::FinderRejected { code, .. } => {
                Some(serde_json::json!({ "diagnostic": code }))
            }
            TypeFinderError::WriteError {
                path: Some(path), ..
            } => Some(serde_json::json!({ "path": path })),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &TypeFinderError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// The output is deterministic: same input produces identical bytes.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Write each unit to `<dir>/<unit name>`, creating `dir` if needed.
///
/// Returns the written paths in unit order.
pub fn write_units(dir: &Path, units: &[GeneratedUnit]) -> Result<Vec<PathBuf>, TypeFinderError> {
    fs::create_dir_all(dir).map_err(|e| {
        TypeFinderError::write_error(e.to_string(), Some(dir.display().to_string()))
    })?;

    let mut written = Vec::with_capacity(units.len());
    for unit in units {
        let path = dir.join(&unit.name);
        fs::write(&path, &unit.source).map_err(|e| {
            TypeFinderError::write_error(e.to_string(), Some(path.display().to_string()))
        })?;
        tracing::debug!(path = %path.display(), bytes = unit.source.len(), "wrote unit");
        written.push(path);
    }
    Ok(written)
}
