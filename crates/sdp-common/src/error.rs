//! Error types for the shelterdata pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline
///
/// Per-source errors (`NetworkFailure`, `MissingRawPayload`,
/// `MalformedPayload`, the structural extraction errors and
/// `ValidationFailed`) are caught at the per-source boundary by the batch
/// runner; `MissingUpstreamFile` and `EmbargoViolation` abort the combine
/// step as a whole.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network failure for source '{source_id}': {detail}")]
    NetworkFailure { source_id: String, detail: String },

    #[error("manual payload for source '{source_id}' not found at {path}. Place the exported file there and re-run.")]
    MissingRawPayload { source_id: String, path: PathBuf },

    #[error("malformed {format} payload for source '{source_id}': {detail}")]
    MalformedPayload {
        source_id: String,
        format: String,
        detail: String,
    },

    #[error("no transform script registered under '{0}'")]
    MissingTransformScript(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("unexpected header shape in source '{source_id}', page {page}: {detail}")]
    UnexpectedHeaderShape {
        source_id: String,
        page: usize,
        detail: String,
    },

    #[error("unresolved category label in source '{source_id}', page {page}, row {row} (step {step})")]
    UnresolvedCategory {
        source_id: String,
        page: usize,
        row: usize,
        step: u8,
    },

    #[error("required field '{field}' missing from source '{source_id}' for year {year}")]
    MissingRequiredField {
        source_id: String,
        year: i32,
        field: String,
    },

    #[error("source '{source_id}' year {year}: expected {expected} regions, found {found}; missing: {missing}")]
    RegionCountMismatch {
        source_id: String,
        year: i32,
        expected: usize,
        found: usize,
        missing: String,
    },

    #[error("validation failed for source '{source_id}':\n{report}")]
    ValidationFailed { source_id: String, report: String },

    #[error("missing upstream dataset file: {0}. Run 'sdp run' before combining.")]
    MissingUpstreamFile(PathBuf),

    #[error("dataset '{source_id}' contains year {year}, beyond the published-through year {published_through}")]
    EmbargoViolation {
        source_id: String,
        year: i32,
        published_through: i32,
    },

    #[error("unknown source id: '{0}'")]
    UnknownSource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Create a network failure error
    pub fn network(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NetworkFailure {
            source_id: source.into(),
            detail: detail.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(
        source: impl Into<String>,
        format: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::MalformedPayload {
            source_id: source.into(),
            format: format.into(),
            detail: detail.into(),
        }
    }
}
