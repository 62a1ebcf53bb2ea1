//! Error types for the bravais library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ingestion operations.
#[derive(Debug, Error)]
pub enum BravaisError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed structure file. Fatal for the item, never for the batch.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No qualifying formula candidate, or no property record for it.
    #[error("No resolvable formula for '{path}'")]
    FormulaNotResolved { path: PathBuf },

    /// Malformed string-encoded float list in a property row.
    #[error("Cannot decode low_three for '{formula}': {raw:?}")]
    LowThreeDecode { formula: String, raw: String },

    /// Backing store failure. Aborts the remaining batch; prior writes stand.
    #[error("Store error: {0}")]
    Store(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for bravais operations.
pub type Result<T> = std::result::Result<T, BravaisError>;
