use std::path::Path;

use csv::ReaderBuilder;

use crate::error::IngestError;
use crate::frame_builder::{RawCell, RawTable};

/// Read a comma-delimited file; the first record is the header.
///
/// Records may be shorter or longer than the header; the frame builder pads or
/// truncates them.
pub fn read_csv_table(path: &Path) -> Result<RawTable, IngestError> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut records = reader.records();
    let headers = match records.next() {
        Some(record) => record
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(RawCell::text).collect());
    }
    Ok(RawTable { headers, rows })
}
