//! Error types for table loading.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while loading an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file extension is not one of `.html`, `.xls`, `.xlsx`, `.csv`.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },

    /// The requested worksheet does not exist.
    #[error("sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    /// The HTML document contains no `<table>`.
    #[error("no table found in {path}")]
    NoTable { path: PathBuf },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
