//! Error taxonomy for the validation pipeline
//!
//! Every stage maps its failure to exactly one variant; the `Display`
//! message is the verdict shown to the caller. Nothing here is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single validation run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The input file is not parseable as JSON.
    #[error("{}: invalid JSON - {reason}", .path.display())]
    MalformedInput { path: PathBuf, reason: String },

    /// A required field is absent, null, or empty.
    #[error("{}: missing required field '{field}'", .path.display())]
    MissingField { field: String, path: PathBuf },

    /// A test-list field is neither a list nor a string containing a JSON list.
    #[error("{}: field '{field}' must be a list or JSON list string", .path.display())]
    InvalidFieldType { field: String, path: PathBuf },

    /// The container runtime backing the harness is unreachable.
    #[error(
        "Docker is required for SWE-bench validation but is not accessible ({reason}). \
         Ensure the Docker daemon is running and the current user has permission to use it."
    )]
    EnvironmentUnavailable { reason: String },

    /// Reading or writing a run file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The evaluation harness raised an error while running the batch.
    #[error("failed to run SWE-bench harness for {instances} instance(s): {cause}")]
    HarnessExecution { instances: usize, cause: anyhow::Error },

    /// The harness completed without producing a run report.
    #[error("SWE-bench harness did not produce a run report")]
    ReportMissing,

    /// The harness ran to completion but one or more instances did not pass.
    #[error("One or more instances failed validation:\n{details}")]
    ValidationFailed { details: String },

    /// No data point files were supplied.
    #[error("no data point files were provided for validation")]
    EmptyBatch,
}

impl ValidationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_field(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingField {
            field: field.into(),
            path: path.into(),
        }
    }
}
