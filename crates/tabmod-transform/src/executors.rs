//! Rule executor functions.
//!
//! One function per rule kind. Each operates on the table in place and reports
//! non-fatal problems through the [`RuleContext`]; only Polars failures are
//! returned as errors.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
};
use tabmod_common::{
    any_to_datetime, any_to_string, coerce_or_missing, column_names, datetime_series,
    integral_values, is_blank, round_half_away,
};
use tabmod_model::{
    CellText, ColumnRef, ColumnSelector, NumberFormat, RowCondition, RowFilter, SeparatorColumns,
};
use tracing::debug;

use crate::engine::RuleContext;
use crate::error::Result;
use crate::normalization::datetime::{is_valid_format, parse_auto, parse_with_format, render};
use crate::normalization::numeric::{format_currency, format_fixed};
use crate::selectors::resolve;

/// Drop columns by position, exact name, or case-insensitive substring.
///
/// All references are resolved before anything is dropped. Negative positions
/// count from the end (`-1` is the last column).
pub fn delete_columns(df: &mut DataFrame, columns: &[ColumnRef], ctx: &mut RuleContext) -> Result<()> {
    let names = column_names(df);
    let mut doomed = BTreeSet::new();
    for reference in columns {
        let selector = match reference {
            ColumnRef::Index(index) => match position(*index, names.len()) {
                Some(index) => ColumnSelector::ByPosition(index),
                None => {
                    ctx.not_found(format!("position {index}"));
                    continue;
                }
            },
            ColumnRef::Name(name) if names.contains(name) => ColumnSelector::ByName(name.clone()),
            ColumnRef::Name(name) => ColumnSelector::ByPattern(name.clone()),
        };
        let matched = resolve(&names, &selector);
        if matched.is_empty() {
            ctx.not_found(selector.to_string());
        }
        doomed.extend(matched);
    }
    if doomed.is_empty() {
        return Ok(());
    }
    let keep: Vec<&String> = names.iter().filter(|name| !doomed.contains(*name)).collect();
    *df = df.select(keep.into_iter().map(String::as_str))?;
    debug!(dropped = doomed.len(), "columns deleted");
    Ok(())
}

/// A configured position; negative positions count back from the last column.
fn position(index: i64, width: usize) -> Option<usize> {
    if index >= 0 {
        return usize::try_from(index).ok();
    }
    let back = usize::try_from(index.unsigned_abs()).ok()?;
    width.checked_sub(back)
}

/// Apply each row condition in order against the table left by the previous one.
pub fn delete_rows(df: &mut DataFrame, conditions: &[RowCondition]) -> Result<()> {
    for condition in conditions {
        let Some(filter) = condition.filter() else {
            continue;
        };
        let before = df.height();
        let keep = match filter {
            RowFilter::Contains(texts) => keep_rows_without(df, texts)?,
            RowFilter::Empty => keep_non_empty_rows(df)?,
            RowFilter::Range { start, end } => keep_outside_range(before, start, end),
        };
        if keep.iter().all(|kept| *kept) {
            continue;
        }
        *df = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        debug!(removed = before - df.height(), "rows deleted");
    }
    Ok(())
}

fn keep_rows_without(df: &DataFrame, texts: &[CellText]) -> Result<Vec<bool>> {
    let needles: Vec<String> = texts.iter().map(|text| text.to_string().to_lowercase()).collect();
    let mut keep = vec![true; df.height()];
    for column in df.get_columns() {
        for (row, slot) in keep.iter_mut().enumerate() {
            if !*slot {
                continue;
            }
            let value = column.get(row)?;
            if matches!(value, AnyValue::Null) {
                continue;
            }
            let haystack = any_to_string(value).to_lowercase();
            if needles.iter().any(|needle| haystack.contains(needle.as_str())) {
                *slot = false;
            }
        }
    }
    Ok(keep)
}

fn keep_non_empty_rows(df: &DataFrame) -> Result<Vec<bool>> {
    let mut keep = vec![false; df.height()];
    for column in df.get_columns() {
        for (row, slot) in keep.iter_mut().enumerate() {
            if !*slot && !is_blank(&column.get(row)?) {
                *slot = true;
            }
        }
    }
    Ok(keep)
}

fn keep_outside_range(height: usize, start: usize, end: usize) -> Vec<bool> {
    (0..height).map(|row| row < start || row > end).collect()
}

/// Coerce the named columns to numbers and round them.
pub fn round_numbers(
    df: &mut DataFrame,
    columns: &[String],
    decimals: i32,
    ctx: &mut RuleContext,
) -> Result<()> {
    for name in existing(df, columns, ctx) {
        round_column(df, &name, decimals)?;
    }
    Ok(())
}

/// Integer columns, and text columns holding only integers, become `Int64`
/// and are otherwise left as they are.
fn round_column(df: &mut DataFrame, name: &str, decimals: i32) -> Result<()> {
    if let Some(integers) = integral_values(df.column(name)?) {
        df.with_column(Series::new(name.into(), integers))?;
        return Ok(());
    }
    let rounded: Vec<Option<f64>> = coerce_or_missing(df.column(name)?)
        .into_iter()
        .map(|value| value.map(|v| round_half_away(v, decimals)))
        .collect();
    df.with_column(Series::new(name.into(), rounded))?;
    Ok(())
}

/// Rename columns; a mapping that would leave two columns with one name is
/// rejected as a whole.
pub fn rename_columns(
    df: &mut DataFrame,
    mapping: &BTreeMap<String, String>,
    ctx: &mut RuleContext,
) -> Result<()> {
    let names = column_names(df);
    for old in mapping.keys() {
        if !names.contains(old) {
            ctx.not_found(ColumnSelector::ByName(old.clone()).to_string());
        }
    }
    let renamed: Vec<String> = names
        .iter()
        .map(|name| mapping.get(name).unwrap_or(name).clone())
        .collect();
    let mut seen = BTreeSet::new();
    if let Some(duplicate) = renamed.iter().find(|name| !seen.insert(name.as_str())) {
        ctx.invalid(format!("mapping would create duplicate column '{duplicate}'"));
        return Ok(());
    }
    if renamed != names {
        df.set_column_names(renamed)?;
    }
    Ok(())
}

/// Move the named columns to the front, keeping the rest in their order.
pub fn reorder_columns(df: &mut DataFrame, order: &[String], ctx: &mut RuleContext) -> Result<()> {
    let names = column_names(df);
    let mut ordered = existing(df, order, ctx);
    let rest: Vec<String> = names
        .into_iter()
        .filter(|name| !ordered.contains(name))
        .collect();
    ordered.extend(rest);
    *df = df.select(ordered)?;
    Ok(())
}

/// Keep only the named columns, in the listed order.
pub fn select_columns(df: &mut DataFrame, columns: &[String], ctx: &mut RuleContext) -> Result<()> {
    let selected = existing(df, columns, ctx);
    *df = df.select(selected)?;
    Ok(())
}

/// Render the named columns as display strings.
pub fn format_numbers(
    df: &mut DataFrame,
    columns: &[String],
    format: NumberFormat,
    decimals: u32,
    currency: &str,
    ctx: &mut RuleContext,
) -> Result<()> {
    let targets = existing(df, columns, ctx);
    if format == NumberFormat::Standard {
        return Ok(());
    }
    for name in targets {
        let values = coerce_or_missing(df.column(&name)?);
        let rendered: Vec<String> = values
            .into_iter()
            .map(|value| match (value, format) {
                (None, _) => String::new(),
                (Some(v), NumberFormat::Currency) => format_currency(v, decimals, currency),
                (Some(v), _) => format_fixed(v, decimals),
            })
            .collect();
        df.with_column(Series::new(name.as_str().into(), rendered))?;
    }
    Ok(())
}

/// Parse dates in the named columns and optionally render them as text.
pub fn date_format(
    df: &mut DataFrame,
    columns: &[String],
    from_format: Option<&str>,
    to_format: Option<&str>,
    ctx: &mut RuleContext,
) -> Result<()> {
    let targets = existing(df, columns, ctx);
    let output = match to_format {
        None => DateOutput::Datetime,
        Some(pattern) if is_valid_format(pattern) => DateOutput::Text(pattern),
        Some(pattern) => {
            ctx.invalid(format!("invalid to_format '{pattern}'"));
            DateOutput::Invalid
        }
    };

    for name in targets {
        let column = df.column(&name)?;
        let mut parsed = Vec::with_capacity(column.len());
        for idx in 0..column.len() {
            let value = column.get(idx)?;
            parsed.push(match value {
                AnyValue::Null => None,
                AnyValue::Datetime(..) | AnyValue::Date(_) => any_to_datetime(value),
                other => {
                    let text = any_to_string(other);
                    match from_format {
                        Some(pattern) => parse_with_format(&text, pattern),
                        None => parse_auto(&text),
                    }
                }
            });
        }

        let series = match output {
            DateOutput::Datetime => datetime_series(&name, &parsed)?,
            DateOutput::Text(pattern) => {
                let rendered: Vec<Option<String>> = parsed
                    .into_iter()
                    .map(|value| value.and_then(|dt| render(dt, pattern)))
                    .collect();
                Series::new(name.as_str().into(), rendered)
            }
            DateOutput::Invalid => Series::full_null(name.as_str().into(), parsed.len(), &DataType::String),
        };
        df.with_column(series)?;
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum DateOutput<'a> {
    Datetime,
    Text(&'a str),
    Invalid,
}

/// Round the referenced columns and record accounting annotations for them.
///
/// Single letters address spreadsheet positions, integers address positions and
/// other strings match exact names.
pub fn format_accounting(
    df: &mut DataFrame,
    columns: &[ColumnRef],
    decimals: u32,
    ctx: &mut RuleContext,
) -> Result<()> {
    let names = column_names(df);
    let mut targets: Vec<String> = Vec::new();
    for reference in columns {
        let selector = match reference {
            ColumnRef::Index(index) => match position(*index, names.len()) {
                Some(index) => ColumnSelector::ByPosition(index),
                None => {
                    ctx.not_found(format!("position {index}"));
                    continue;
                }
            },
            ColumnRef::Name(name) => ColumnSelector::letter(name)
                .unwrap_or_else(|| ColumnSelector::ByName(name.clone())),
        };
        let matched = resolve(&names, &selector);
        if matched.is_empty() {
            ctx.not_found(selector.to_string());
        }
        for name in matched {
            if !targets.contains(&name) {
                targets.push(name);
            }
        }
    }

    let places = i32::try_from(decimals).unwrap_or(i32::MAX);
    for name in targets {
        round_column(df, &name, places)?;
        ctx.annotations.record(name, decimals);
    }
    Ok(())
}

/// Round the final column, whatever its name.
pub fn round_last_column(df: &mut DataFrame, decimals: i32) -> Result<()> {
    let Some(last) = column_names(df).pop() else {
        return Ok(());
    };
    round_column(df, &last, decimals)
}

/// Replace a literal separator in the text form of the target columns.
pub fn replace_decimal_separator(
    df: &mut DataFrame,
    columns: &SeparatorColumns,
    from: &str,
    to: &str,
    ctx: &mut RuleContext,
) -> Result<()> {
    if from.is_empty() {
        ctx.invalid("from_separator must not be empty".to_string());
        return Ok(());
    }
    let targets = match columns {
        SeparatorColumns::Last => column_names(df).pop().into_iter().collect(),
        SeparatorColumns::Named(names) => existing(df, names, ctx),
    };
    for name in targets {
        let column = df.column(&name)?;
        let mut replaced = Vec::with_capacity(column.len());
        for idx in 0..column.len() {
            replaced.push(match column.get(idx)? {
                AnyValue::Null => None,
                value => Some(any_to_string(value).replace(from, to)),
            });
        }
        df.with_column(Series::new(name.as_str().into(), replaced))?;
    }
    Ok(())
}

/// The listed names that exist in the table, deduplicated, in listed order.
/// Misses are reported.
fn existing(df: &DataFrame, wanted: &[String], ctx: &mut RuleContext) -> Vec<String> {
    let names = column_names(df);
    let mut found: Vec<String> = Vec::with_capacity(wanted.len());
    for name in wanted {
        if !names.contains(name) {
            ctx.not_found(ColumnSelector::ByName(name.clone()).to_string());
        } else if !found.contains(name) {
            found.push(name.clone());
        }
    }
    found
}
