//! Table ingestion for tabmod.
//!
//! Loads one input file into a Polars [`DataFrame`], dispatching on the file
//! extension:
//!
//! - **HTML** (`.html`, `.xls`): the first `<table>` of the document
//! - **XLSX** (`.xlsx`): one worksheet, selected by [`LoadOptions::sheet_name`]
//! - **CSV** (`.csv`): comma-delimited with a header record
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use tabmod_ingest::load_table;
//! use tabmod_model::LoadOptions;
//!
//! let df = load_table(Path::new("report.xls"), &LoadOptions::default())?;
//! ```

mod csv_table;
mod error;
mod frame_builder;
mod html_table;
mod xlsx_table;

use std::path::Path;

use polars::prelude::DataFrame;
use tabmod_model::LoadOptions;
use tracing::{debug, info, info_span};

// === Error Types ===
pub use error::{IngestError, Result};

// === Raw Tables ===
pub use frame_builder::{
    RawCell, RawTable, TextInference, build_frame, coerce_numeric_columns, unique_headers,
};

// === Format Readers ===
pub use csv_table::read_csv_table;
pub use html_table::{decode_entities, parse_first_table, read_html_table};
pub use xlsx_table::{excel_serial_to_datetime, read_xlsx_table};

/// Input formats recognized by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// HTML document, including legacy HTML saved with an `.xls` extension.
    Html,
    Xlsx,
    Csv,
}

impl SourceFormat {
    /// Detect the format from the lower-cased file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "html" | "xls" => Ok(Self::Html),
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(IngestError::UnsupportedFormat {
                extension: format!(".{extension}"),
            }),
        }
    }
}

/// Load a table from `path`.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let format = SourceFormat::from_path(path)?;
    let span = info_span!("load", path = %path.display(), format = ?format);
    let _guard = span.enter();

    let df = match format {
        SourceFormat::Html => build_frame(
            read_html_table(path)?,
            TextInference::NumericWithThousands,
        )?,
        SourceFormat::Csv => build_frame(read_csv_table(path)?, TextInference::Numeric)?,
        SourceFormat::Xlsx => {
            let table = read_xlsx_table(path, options.sheet_name.as_ref())?;
            let mut df = build_frame(table, TextInference::Keep)?;
            if options.data_only {
                let converted = coerce_numeric_columns(&mut df)?;
                debug!(converted, "coerced numeric text columns");
            }
            df
        }
    };

    info!(rows = df.height(), columns = df.width(), "table loaded");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_case_insensitively() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/Report.XLS")).unwrap(),
            SourceFormat::Html
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("b.xlsx")).unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("c.Csv")).unwrap(),
            SourceFormat::Csv
        );
    }

    #[test]
    fn unsupported_extension_is_reported_with_dot() {
        match SourceFormat::from_path(Path::new("data.json")) {
            Err(IngestError::UnsupportedFormat { extension }) => assert_eq!(extension, ".json"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
