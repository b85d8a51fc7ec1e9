//! Error types for csv2tex-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a CSV table to LaTeX
#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened or read
    #[error("cannot read source '{path}': {source}")]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row has a different number of fields than the first row
    #[error("malformed row {row} (line {line}): expected {expected} fields, found {found}")]
    MalformedRow {
        /// 1-based index of the offending row
        row: usize,
        /// 1-based source line the row starts on
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Fewer rows than requested header lines
    #[error("not enough rows for {requested} header line(s): input has {available}")]
    InsufficientHeaderRows { requested: usize, available: usize },

    /// The output file could not be written
    #[error("cannot write destination '{path}': {source}")]
    DestinationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV syntax error from the csv crate
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Render options failed validation
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Options file could not be loaded
    #[error("failed to load options '{path}': {message}")]
    Config { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
