//! Fatal pipeline errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input is missing column '{column}' (found: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
