//! Error types for Trueno-Curves
//!
//! Clear error messages with actionable guidance. Per-run failures are
//! logged and skipped by the loader; only global preconditions surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-Curves error types
#[derive(Error, Debug)]
pub enum Error {
    /// Run metadata (`config.json`) missing or unparsable
    #[error("Metadata error in {path}: {message}")]
    MetadataError {
        /// Offending metadata file
        path: PathBuf,
        /// Underlying cause
        message: String,
    },

    /// Results table (`progress.txt`) unreadable or malformed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Invalid input (empty data, bad arguments)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Legend count does not match the resolved directory count
    #[error("Must give a legend title for each set of experiments: got {legend} legend entries for {logdirs} log directories")]
    LegendMismatch {
        /// Number of legend entries supplied
        legend: usize,
        /// Number of resolved log directories
        logdirs: usize,
    },

    /// Estimator name has no reducer
    #[error("Unknown estimator: {0}\nSupported estimators: mean, median, min, max, sum")]
    UnknownEstimator(String),

    /// Column missing from a results table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Rendering failed
    #[error("Plot error: {0}")]
    PlotError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
