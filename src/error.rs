//! Error types for the otu-summarizer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty table: {0}")]
    EmptyTable(String),

    #[error("Insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to write {}: {source}", artifact.display())]
    OutputWrite {
        artifact: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid count value '{value}' at row {row}, column {col}")]
    InvalidCount {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SummaryError {
    /// Wrap an I/O failure with the artifact it was writing.
    pub fn output_write(artifact: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SummaryError::OutputWrite {
            artifact: artifact.into(),
            source,
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, SummaryError>;
