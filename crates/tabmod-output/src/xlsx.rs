//! XLSX workbook output.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};
use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tabmod_common::{any_to_datetime, any_to_f64, any_to_string, column_names};
use tabmod_model::{AccountingAnnotations, accounting_format_code};
use tracing::debug;

use crate::error::{OutputError, Result};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Write `df` to a single-sheet workbook: a header row, then one row per record.
///
/// With `accounting`, every data cell of each annotated column that still
/// exists, blanks included, carries the accounting number format.
pub fn write_xlsx(
    df: &DataFrame,
    path: &Path,
    accounting: Option<&AccountingAnnotations>,
) -> Result<()> {
    let xlsx_error = |source: XlsxError| OutputError::Xlsx {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, (name, column)) in column_names(df).iter().zip(df.get_columns()).enumerate() {
        let col = cell_index::<u16>(col_idx, path)?;
        worksheet.write_string(0, col, name).map_err(xlsx_error)?;

        let accounting_format = accounting
            .and_then(|annotations| annotations.get(name))
            .map(|decimals| {
                debug!(column = %name, decimals, "applying accounting format");
                Format::new().set_num_format(accounting_format_code(decimals))
            });
        let date_format = date_format_for(column)?;

        for idx in 0..column.len() {
            let row = cell_index::<u32>(idx + 1, path)?;
            let cell = Cell::from_any(column.get(idx)?);
            write_cell(worksheet, row, col, cell, accounting_format.as_ref(), &date_format)
                .map_err(xlsx_error)?;
        }
    }

    workbook.save(path).map_err(|source| match source {
        XlsxError::IoError(error) => OutputError::WriteFailure {
            path: path.to_path_buf(),
            reason: error.to_string(),
        },
        other => xlsx_error(other),
    })
}

enum Cell {
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Strings stay strings even when they look numeric.
    fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Blank,
            AnyValue::Boolean(flag) => Self::Bool(flag),
            AnyValue::String(_) | AnyValue::StringOwned(_) => Self::Text(any_to_string(value)),
            AnyValue::Datetime(..) | AnyValue::Date(_) => {
                any_to_datetime(value).map_or(Self::Blank, Self::DateTime)
            }
            other => match any_to_f64(other.clone()) {
                Some(number) => Self::Number(number),
                None => Self::Text(any_to_string(other)),
            },
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: Cell,
    format: Option<&Format>,
    date_format: &Format,
) -> std::result::Result<(), XlsxError> {
    match (cell, format) {
        (Cell::Blank, None) => return Ok(()),
        (Cell::Blank, Some(format)) => worksheet.write_blank(row, col, format)?,
        (Cell::Number(number), None) => worksheet.write_number(row, col, number)?,
        (Cell::Number(number), Some(format)) => {
            worksheet.write_number_with_format(row, col, number, format)?
        }
        (Cell::Text(text), None) => worksheet.write_string(row, col, text)?,
        (Cell::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?
        }
        (Cell::Bool(flag), None) => worksheet.write_boolean(row, col, flag)?,
        (Cell::Bool(flag), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, flag, format)?
        }
        (Cell::DateTime(dt), format) => {
            worksheet.write_datetime_with_format(row, col, &dt, format.unwrap_or(date_format))?
        }
    };
    Ok(())
}

/// `yyyy-mm-dd` unless some value of a datetime column has a time of day.
fn date_format_for(column: &Column) -> Result<Format> {
    let mut code = DATE_FORMAT;
    if matches!(column.dtype(), DataType::Datetime(..)) {
        for idx in 0..column.len() {
            if any_to_datetime(column.get(idx)?).is_some_and(|dt| !is_midnight(dt)) {
                code = DATETIME_FORMAT;
                break;
            }
        }
    }
    Ok(Format::new().set_num_format(code))
}

fn is_midnight(dt: NaiveDateTime) -> bool {
    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}

fn cell_index<T: TryFrom<usize>>(index: usize, path: &Path) -> Result<T> {
    T::try_from(index).map_err(|_| OutputError::WriteFailure {
        path: path.to_path_buf(),
        reason: format!("table too large for a worksheet (index {index})"),
    })
}
