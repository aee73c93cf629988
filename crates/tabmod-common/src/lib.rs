//! Shared utilities for tabmod crates.
//!
//! This crate provides the cell-level helpers every stage of the pipeline relies on:
//! converting Polars `AnyValue`s to strings, numbers and datetimes, and the
//! [`coerce_or_missing`] policy used whenever a rule needs numbers.

pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use values::{
    DATETIME_DISPLAY_FORMAT, any_to_datetime, any_to_f64, any_to_string, coerce_or_missing,
    column_names, datetime_series, format_cell_number, format_numeric, integral_values, is_blank,
    parse_f64, parse_i64, round_half_away,
};
