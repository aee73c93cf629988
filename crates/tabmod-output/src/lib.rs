//! Table export for tabmod.
//!
//! This crate writes a transformed table in one of two shapes:
//!
//! - **XLSX**: a single-sheet workbook, optionally with accounting number
//!   formats on annotated columns
//! - **Delimited text** (`csv` / `txt`): configurable single-byte delimiter and
//!   optional header row
//!
//! [`resolve_output_path`] derives non-clobbering `_mod` names when the caller
//! does not supply an explicit output path.

mod delimited;
mod error;
mod naming;
mod xlsx;

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tabmod_model::{AccountingAnnotations, ExportConfig, ExportFormat};
use tracing::{info, info_span};

// Re-export public types and functions
pub use delimited::{delimiter_byte, write_delimited};
pub use error::{OutputError, Result};
pub use naming::{MAX_NAME_ATTEMPTS, derive_modified_path, resolve_output_path};
pub use xlsx::write_xlsx;

/// Write `df` to `path` in the configured format and return the written path.
///
/// Accounting annotations are honored only for `xlsx` output with
/// `apply_excel_formatting` enabled.
pub fn export_table(
    df: &DataFrame,
    export: &ExportConfig,
    annotations: &AccountingAnnotations,
    path: &Path,
) -> Result<PathBuf> {
    let span = info_span!("export", path = %path.display(), format = export.format.as_str());
    let _guard = span.enter();

    match export.format {
        ExportFormat::Xlsx => {
            let accounting =
                (export.apply_excel_formatting && !annotations.is_empty()).then_some(annotations);
            write_xlsx(df, path, accounting)?;
        }
        ExportFormat::Csv | ExportFormat::Txt => {
            let delimiter = delimiter_byte(&export.delimiter)?;
            write_delimited(df, path, delimiter, export.headers)?;
        }
    }

    info!(rows = df.height(), columns = df.width(), "table exported");
    Ok(path.to_path_buf())
}
