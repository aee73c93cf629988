//! XLSX worksheet reading via calamine.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tabmod_common::{DATETIME_DISPLAY_FORMAT, format_cell_number};
use tabmod_model::SheetSelector;
use tracing::debug;

use crate::error::IngestError;
use crate::frame_builder::{RawCell, RawTable};

/// Read one worksheet; the first row of its used range is the header.
pub fn read_xlsx_table(
    path: &Path,
    sheet: Option<&SheetSelector>,
) -> Result<RawTable, IngestError> {
    let xlsx_error = |source: calamine::XlsxError| IngestError::Xlsx {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(xlsx_error)?;
    let sheet_names = workbook.sheet_names();
    let name = resolve_sheet(&sheet_names, sheet)?;
    debug!(sheet = %name, "reading worksheet");

    let range = workbook.worksheet_range(&name).map_err(xlsx_error)?;
    // The used range starts at its first non-empty column; columns to its
    // left still count for positional selectors.
    let leading = range.start().map_or(0, |(_, col)| col as usize);
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = std::iter::repeat_n(String::new(), leading)
        .chain(header_row.iter().map(|cell| match to_raw_cell(cell) {
            RawCell::Empty => String::new(),
            RawCell::Text(text) => text,
            RawCell::Number(value) => format_cell_number(value),
            RawCell::DateTime(dt) => dt.format(DATETIME_DISPLAY_FORMAT).to_string(),
        }))
        .collect();
    let rows = rows
        .map(|row| {
            std::iter::repeat_n(RawCell::Empty, leading)
                .chain(row.iter().map(to_raw_cell))
                .collect()
        })
        .collect();
    Ok(RawTable { headers, rows })
}

fn resolve_sheet(names: &[String], sheet: Option<&SheetSelector>) -> Result<String, IngestError> {
    let found = match sheet.unwrap_or(&SheetSelector::Index(0)) {
        SheetSelector::Index(index) => names.get(*index).cloned(),
        SheetSelector::Name(name) => names.iter().find(|candidate| *candidate == name).cloned(),
    };
    found.ok_or_else(|| IngestError::SheetNotFound {
        sheet: match sheet {
            Some(SheetSelector::Name(name)) => name.clone(),
            Some(SheetSelector::Index(index)) => format!("#{index}"),
            None => "#0".to_string(),
        },
    })
}

fn to_raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Float(value) => RawCell::Number(*value),
        Data::String(text) => RawCell::text(text),
        Data::Bool(value) => RawCell::Text(if *value { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(value) => excel_serial_to_datetime(value.as_f64())
            .map_or(RawCell::Number(value.as_f64()), RawCell::DateTime),
        Data::DateTimeIso(text) => parse_iso_datetime(text).map_or_else(|| RawCell::text(text), RawCell::DateTime),
        Data::DurationIso(text) => RawCell::text(text),
        Data::Error(error) => RawCell::Text(error.to_string()),
    }
}

/// Convert an Excel serial date (1900 date system) to a datetime,
/// rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
