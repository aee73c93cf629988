//! Polars AnyValue utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions, numeric coercion and datetime handling.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, NamedFrom, PolarsResult, Series, TimeUnit};

/// Display format used whenever a datetime cell is rendered as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, formats floats with [`format_numeric`] and
/// renders datetimes with [`DATETIME_DISPLAY_FORMAT`].
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use tabmod_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Float64(42.0)), "42.0");
/// assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("hello")), "hello");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other @ (AnyValue::Datetime(..) | AnyValue::Date(_)) => match any_to_datetime(other) {
            Some(dt) => dt.format(DATETIME_DISPLAY_FORMAT).to_string(),
            None => String::new(),
        },
        other => other.to_string(),
    }
}

/// Returns true for missing cells and strings that are empty after trimming.
pub fn is_blank(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Formats a float in its shortest round-trip form, keeping a `.0` on whole
/// values so floats never read as integers.
///
/// # Examples
///
/// ```
/// use tabmod_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1.0");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(-3.0), "-3.0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if v.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{s}.0")
    } else {
        s
    }
}

/// Formats a number read from a source cell: whole values print as integers.
pub fn format_cell_number(v: f64) -> String {
    match whole_to_i64(v) {
        Some(int) => int.to_string(),
        None => format_numeric(v),
    }
}

fn whole_to_i64(v: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0;
    (v.is_finite() && v.fract() == 0.0 && v.abs() <= LIMIT).then_some(v as i64)
}

/// Parses integer text (`"42"`, `" -7 "`); decimals and exponents are rejected.
pub fn parse_i64(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
///
/// Handles integer types, floating-point types, and string parsing.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid, empty or non-finite input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a datetime-like `AnyValue` to a naive (UTC) datetime.
pub fn any_to_datetime(value: AnyValue<'_>) -> Option<NaiveDateTime> {
    match value {
        AnyValue::Datetime(v, unit, _) => {
            let dt = match unit {
                TimeUnit::Milliseconds => DateTime::from_timestamp_millis(v),
                TimeUnit::Microseconds => DateTime::from_timestamp_micros(v),
                TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(v)),
            };
            dt.map(|d| d.naive_utc())
        }
        AnyValue::Date(days) => NaiveDate::from_ymd_opt(1970, 1, 1)?
            .checked_add_signed(TimeDelta::try_days(i64::from(days))?)?
            .and_hms_opt(0, 0, 0),
        _ => None,
    }
}

/// Builds a millisecond-precision `Datetime` series from optional naive datetimes.
pub fn datetime_series(name: &str, values: &[Option<NaiveDateTime>]) -> PolarsResult<Series> {
    let millis: Vec<Option<i64>> = values
        .iter()
        .map(|value| value.map(|dt| dt.and_utc().timestamp_millis()))
        .collect();
    Series::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// Coerces every cell of a column to `f64`; anything that is not a number
/// (or a string holding one) becomes missing.
pub fn coerce_or_missing(column: &Column) -> Vec<Option<f64>> {
    (0..column.len())
        .map(|idx| column.get(idx).ok().and_then(any_to_f64))
        .collect()
}

/// The column as integers when it has no missing cells and every cell is an
/// integer or integer text. Numeric coercion keeps such columns integral.
pub fn integral_values(column: &Column) -> Option<Vec<i64>> {
    let dtype = column.dtype();
    if !(dtype.is_integer() || dtype == &DataType::String) {
        return None;
    }
    (0..column.len())
        .map(|idx| match column.get(idx).ok()? {
            AnyValue::String(s) => parse_i64(s),
            AnyValue::StringOwned(s) => parse_i64(&s),
            AnyValue::UInt64(v) => i64::try_from(v).ok(),
            other => any_to_f64(other).and_then(whole_to_i64),
        })
        .collect()
}

/// Rounds half away from zero to `decimals` places.
///
/// Non-finite inputs, and inputs too large to scale, are returned unchanged.
pub fn round_half_away(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

/// Returns the frame's column names in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null() {
        assert_eq!(any_to_string(AnyValue::Null), "");
    }

    #[test]
    fn test_any_to_string_integers() {
        assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::UInt32(0)), "0");
    }

    #[test]
    fn test_any_to_string_floats() {
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(1.0)), "1.0");
        assert_eq!(any_to_string(AnyValue::Float64(100.0)), "100.0");
        assert_eq!(any_to_string(AnyValue::Float64(-0.25)), "-0.25");
    }

    #[test]
    fn test_any_to_string_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let millis = dt.and_utc().timestamp_millis();
        assert_eq!(
            any_to_string(AnyValue::Datetime(millis, TimeUnit::Milliseconds, None)),
            "2024-01-15 10:30:00"
        );
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&AnyValue::Null));
        assert!(is_blank(&AnyValue::String("  ")));
        assert!(!is_blank(&AnyValue::String("x")));
        assert!(!is_blank(&AnyValue::Float64(0.0)));
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1.0");
        assert_eq!(format_numeric(1.5), "1.5");
        assert_eq!(format_numeric(0.0), "0.0");
        assert_eq!(format_numeric(1200.0), "1200.0");
        assert_eq!(format_numeric(0.125), "0.125");
    }

    #[test]
    fn test_format_cell_number() {
        assert_eq!(format_cell_number(2024.0), "2024");
        assert_eq!(format_cell_number(-3.0), "-3");
        assert_eq!(format_cell_number(10.5), "10.5");
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int32(42)), Some(42.0));
        assert_eq!(any_to_f64(AnyValue::Float64(3.25)), Some(3.25));
        assert_eq!(any_to_f64(AnyValue::String("2.5")), Some(2.5));
        assert_eq!(any_to_f64(AnyValue::String("invalid")), None);
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64("  3.5  "), Some(3.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("invalid"), None);
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(2.5, 0), 3.0);
        assert_eq!(round_half_away(-2.5, 0), -3.0);
        assert_eq!(round_half_away(1.234, 2), 1.23);
        assert_eq!(round_half_away(1.005, 2), 1.0);
    }

    #[test]
    fn test_datetime_series_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let series = datetime_series("D", &[Some(dt), None]).unwrap();
        assert_eq!(any_to_datetime(series.get(0).unwrap()), Some(dt));
        assert_eq!(any_to_datetime(series.get(1).unwrap()), None);
    }

    #[test]
    fn test_integral_values() {
        let text = Column::new("A".into(), ["001", " 17 "]);
        assert_eq!(integral_values(&text), Some(vec![1, 17]));
        let decimal = Column::new("B".into(), ["1", "2.0"]);
        assert_eq!(integral_values(&decimal), None);
        let ints = Column::new("C".into(), [3i64, 4]);
        assert_eq!(integral_values(&ints), Some(vec![3, 4]));
        let gaps = Column::new("D".into(), [Some(1i64), None]);
        assert_eq!(integral_values(&gaps), None);
        let floats = Column::new("E".into(), [1.0f64, 2.0]);
        assert_eq!(integral_values(&floats), None);
    }

    #[test]
    fn test_coerce_or_missing() {
        let column = Column::new("A".into(), ["1.5", "x", ""]);
        assert_eq!(coerce_or_missing(&column), vec![Some(1.5), None, None]);
    }
}
