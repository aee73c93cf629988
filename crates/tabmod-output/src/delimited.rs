//! Delimited text output.

use std::fs::File;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use polars::prelude::DataFrame;
use tabmod_common::{any_to_string, column_names};

use crate::error::{OutputError, Result};

/// The single byte a delimiter string stands for.
pub fn delimiter_byte(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(OutputError::InvalidDelimiter {
            delimiter: delimiter.to_string(),
        }),
    }
}

/// Write `df` as delimited text with minimal quoting. Missing cells are empty
/// and datetimes render as `YYYY-MM-DD HH:MM:SS`.
pub fn write_delimited(df: &DataFrame, path: &Path, delimiter: u8, headers: bool) -> Result<()> {
    let file = File::create(path).map_err(|error| OutputError::WriteFailure {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    let csv_error = |source: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(file);

    if headers {
        writer.write_record(column_names(df)).map_err(csv_error)?;
    }
    let columns = df.get_columns();
    let mut record = Vec::with_capacity(columns.len());
    for row in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(any_to_string(column.get(row)?));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
