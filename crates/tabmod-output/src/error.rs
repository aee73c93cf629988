//! Error types for table export.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write delimited output {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write workbook {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    /// Delimited output needs a delimiter of exactly one byte.
    #[error("invalid delimiter {delimiter:?}: expected a single byte")]
    InvalidDelimiter { delimiter: String },

    /// No writable output path could be found, or the final write failed.
    #[error("cannot write {path}: {reason}")]
    WriteFailure { path: PathBuf, reason: String },
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, OutputError>;
