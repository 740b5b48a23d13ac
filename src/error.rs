//! Error types for the panel pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading transactions or building the panel.
#[derive(Debug, Error)]
pub enum PanelError {
    /// A required column is missing, or panel fragments disagree on columns.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The requested settings cannot produce a panel from this input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An enrichment join changed the number of panel rows.
    #[error("Join cardinality error in {join}: {before} rows before, {after} rows after")]
    JoinCardinality {
        join: String,
        before: usize,
        after: usize,
    },

    /// A field could not be interpreted as the expected type.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: String,
        message: String,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PanelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PanelError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
