//! Building typed DataFrames from raw cell grids.
//!
//! Every reader produces a [`RawTable`]; this module turns it into the
//! Polars frame the rule engine works on, choosing one dtype per column.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use polars::prelude::{AnyValue, DataFrame, DataType, IntoColumn, NamedFrom, PolarsResult, Series};
use tabmod_common::{
    DATETIME_DISPLAY_FORMAT, any_to_f64, column_names, datetime_series, format_cell_number,
    integral_values, parse_f64, parse_i64,
};

/// A single cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawCell {
    /// Text cell, or `Empty` for an empty string.
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn display(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => Some(text.clone()),
            Self::Number(value) => Some(format_cell_number(*value)),
            Self::DateTime(dt) => Some(dt.format(DATETIME_DISPLAY_FORMAT).to_string()),
        }
    }
}

/// Header row plus data rows, before typing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// How text cells take part in column type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInference {
    /// Text stays text.
    Keep,
    /// Text that parses as a number counts as a number.
    Numeric,
    /// Like `Numeric`, also accepting `,` thousands grouping.
    NumericWithThousands,
}

impl TextInference {
    fn parse(self, text: &str) -> Option<f64> {
        match self {
            Self::Keep => None,
            Self::Numeric => parse_f64(text),
            Self::NumericWithThousands => {
                parse_f64(text).or_else(|| parse_f64(&text.replace(',', "")))
            }
        }
    }

    fn parse_integer(self, text: &str) -> Option<i64> {
        match self {
            Self::Keep => None,
            Self::Numeric => parse_i64(text),
            Self::NumericWithThousands => {
                parse_i64(text).or_else(|| parse_i64(&text.replace(',', "")))
            }
        }
    }
}

/// Normalize raw header cells: strip a leading BOM, name empty headers
/// `Unnamed: <index>` and suffix duplicates with `.1`, `.2`, ...
pub fn unique_headers(raw: &[String]) -> Vec<String> {
    let mut used = BTreeSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, header) in raw.iter().enumerate() {
        let cleaned = header.trim_matches('\u{feff}');
        let base = if cleaned.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            cleaned.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 0usize;
        while used.contains(&name) {
            suffix += 1;
            name = format!("{base}.{suffix}");
        }
        used.insert(name.clone());
        headers.push(name);
    }
    headers
}

/// Build a DataFrame from a raw table.
///
/// Rows are padded or truncated to the header width. A numeric column becomes
/// `Int64` when it has no empty cells and every cell is a whole number (integer
/// text, or a whole spreadsheet number), `Float64` when every non-empty cell is
/// numeric, `Datetime` when every non-empty cell is a date, and `String`
/// otherwise. Empty cells are nulls.
pub fn build_frame(table: RawTable, inference: TextInference) -> PolarsResult<DataFrame> {
    let headers = unique_headers(&table.headers);
    let width = headers.len();
    let mut rows = table.rows;
    for row in &mut rows {
        row.resize(width, RawCell::Empty);
    }

    let mut columns = Vec::with_capacity(width);
    for (col_idx, name) in headers.iter().enumerate() {
        let cells: Vec<&RawCell> = rows.iter().map(|row| &row[col_idx]).collect();
        columns.push(build_series(name, &cells, inference)?.into_column());
    }
    DataFrame::new(columns)
}

fn build_series(name: &str, cells: &[&RawCell], inference: TextInference) -> PolarsResult<Series> {
    let non_empty: Vec<&RawCell> = cells.iter().copied().filter(|cell| !cell.is_empty()).collect();

    if !non_empty.is_empty() && non_empty.iter().all(|cell| matches!(cell, RawCell::DateTime(_))) {
        let values: Vec<Option<NaiveDateTime>> = cells
            .iter()
            .map(|cell| match cell {
                RawCell::DateTime(dt) => Some(*dt),
                _ => None,
            })
            .collect();
        return datetime_series(name, &values);
    }

    let numbers: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| match cell {
            RawCell::Number(value) => Some(*value),
            RawCell::Text(text) => inference.parse(text),
            _ => None,
        })
        .collect();
    let numeric_count = numbers.iter().filter(|value| value.is_some()).count();
    if !non_empty.is_empty() && numeric_count == non_empty.len() {
        if non_empty.len() == cells.len() {
            let integers: Option<Vec<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    RawCell::Number(value) => whole_number(*value),
                    RawCell::Text(text) => inference.parse_integer(text),
                    _ => None,
                })
                .collect();
            if let Some(integers) = integers {
                return Ok(Series::new(name.into(), integers));
            }
        }
        return Ok(Series::new(name.into(), numbers));
    }

    let texts: Vec<Option<String>> = cells.iter().map(|cell| cell.display()).collect();
    Ok(Series::new(name.into(), texts))
}

fn whole_number(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= 9_007_199_254_740_992.0).then_some(value as i64)
}

/// Convert every string column whose non-null values all parse as numbers
/// to `Int64` (integer text without gaps) or `Float64`. Other columns are left
/// untouched.
///
/// Returns the number of converted columns.
pub fn coerce_numeric_columns(df: &mut DataFrame) -> PolarsResult<usize> {
    let mut converted = 0usize;
    for name in column_names(df) {
        let column = df.column(&name)?;
        if column.dtype() != &DataType::String {
            continue;
        }
        if let Some(integers) = integral_values(column) {
            df.with_column(Series::new(name.as_str().into(), integers))?;
            converted += 1;
            continue;
        }
        let mut values = Vec::with_capacity(column.len());
        let mut numeric = true;
        for idx in 0..column.len() {
            match column.get(idx)? {
                AnyValue::Null => values.push(None),
                value => match any_to_f64(value) {
                    Some(number) => values.push(Some(number)),
                    None => {
                        numeric = false;
                        break;
                    }
                },
            }
        }
        if numeric {
            df.with_column(Series::new(name.as_str().into(), values))?;
            converted += 1;
        }
    }
    Ok(converted)
}
