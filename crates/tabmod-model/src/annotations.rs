//! Accounting display annotations.
//!
//! Rules that request accounting formatting record the column and its precision
//! here. The annotations travel next to the table from the rule engine to the
//! exporter and never change cell values.

use std::collections::BTreeMap;

/// Column name to decimal precision for accounting display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountingAnnotations {
    columns: BTreeMap<String, u32>,
}

impl AccountingAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or replaces) the precision for a column.
    pub fn record(&mut self, column: impl Into<String>, decimals: u32) {
        self.columns.insert(column.into(), decimals);
    }

    pub fn get(&self, column: &str) -> Option<u32> {
        self.columns.get(column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.columns
            .iter()
            .map(|(name, decimals)| (name.as_str(), *decimals))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// Spreadsheet number format for accounting display: grouped thousands,
/// parenthesis-aligned negatives and a dash for zero.
///
/// # Examples
///
/// ```
/// use tabmod_model::accounting_format_code;
///
/// assert_eq!(
///     accounting_format_code(2),
///     r#"_-* #,##0.00_-;-* #,##0.00_-;_-* "-"??_-;_-@_-"#
/// );
/// ```
pub fn accounting_format_code(decimals: u32) -> String {
    let number = if decimals == 0 {
        "#,##0".to_string()
    } else {
        format!("#,##0.{}", "0".repeat(decimals as usize))
    };
    format!(r#"_-* {number}_-;-* {number}_-;_-* "-"??_-;_-@_-"#)
}
