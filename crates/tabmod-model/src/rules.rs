//! Transformation rules.
//!
//! Every entry of the `transformations` list carries a `type` key. Recognized types
//! deserialize into a [`Rule`] variant; any other type string is kept as
//! [`RuleEntry::Unknown`] so the engine can report and skip it without the rest of
//! the chain failing.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// One declarative operation on the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Drop columns by position, exact name, or case-insensitive substring.
    DeleteColumns { columns: Vec<ColumnRef> },

    /// Drop rows matching each condition, applied in order.
    DeleteRows {
        #[serde(default)]
        conditions: Vec<RowCondition>,
    },

    /// Coerce to numbers and round.
    RoundNumbers {
        columns: Vec<String>,
        #[serde(default = "default_round_decimals")]
        decimals: i32,
    },

    /// Rename columns (old name to new name).
    RenameColumns { mapping: BTreeMap<String, String> },

    /// Move the named columns to the front.
    ReorderColumns { order: Vec<String> },

    /// Keep only the named columns, in the given order.
    SelectColumns { columns: Vec<String> },

    /// Render numbers as display strings.
    FormatNumbers {
        columns: Vec<String>,
        #[serde(default)]
        format: NumberFormat,
        #[serde(default = "default_decimals")]
        decimals: u32,
        #[serde(default = "default_currency")]
        currency: String,
    },

    /// Parse dates and optionally re-render them.
    DateFormat {
        columns: Vec<String>,
        #[serde(default)]
        from_format: Option<String>,
        #[serde(default)]
        to_format: Option<String>,
    },

    /// Round and annotate columns for accounting display in spreadsheets.
    FormatAccounting {
        columns: Vec<ColumnRef>,
        #[serde(default = "default_decimals")]
        decimals: u32,
    },

    /// Round the final column, whatever its name.
    RoundLastColumn {
        #[serde(default = "default_round_decimals")]
        decimals: i32,
    },

    /// Literal separator replacement on the text form of the values.
    ReplaceDecimalSeparator {
        #[serde(default)]
        columns: SeparatorColumns,
        #[serde(default = "default_from_separator")]
        from_separator: String,
        #[serde(default = "default_to_separator")]
        to_separator: String,
    },
}

fn default_round_decimals() -> i32 {
    2
}

fn default_decimals() -> u32 {
    2
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_from_separator() -> String {
    ".".to_string()
}

fn default_to_separator() -> String {
    ",".to_string()
}

impl Rule {
    /// Every `type` value that maps to a [`Rule`] variant.
    pub const KINDS: [&'static str; 11] = [
        "delete_columns",
        "delete_rows",
        "round_numbers",
        "rename_columns",
        "reorder_columns",
        "select_columns",
        "format_numbers",
        "date_format",
        "format_accounting",
        "round_last_column",
        "replace_decimal_separator",
    ];

    /// The `type` string of this rule.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeleteColumns { .. } => "delete_columns",
            Self::DeleteRows { .. } => "delete_rows",
            Self::RoundNumbers { .. } => "round_numbers",
            Self::RenameColumns { .. } => "rename_columns",
            Self::ReorderColumns { .. } => "reorder_columns",
            Self::SelectColumns { .. } => "select_columns",
            Self::FormatNumbers { .. } => "format_numbers",
            Self::DateFormat { .. } => "date_format",
            Self::FormatAccounting { .. } => "format_accounting",
            Self::RoundLastColumn { .. } => "round_last_column",
            Self::ReplaceDecimalSeparator { .. } => "replace_decimal_separator",
        }
    }
}

/// A rule as written in the configuration: either recognized or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Known(Rule),
    Unknown {
        #[serde(rename = "type")]
        rule_type: String,
    },
}

impl RuleEntry {
    pub fn kind(&self) -> &str {
        match self {
            Self::Known(rule) => rule.kind(),
            Self::Unknown { rule_type } => rule_type,
        }
    }
}

impl From<Rule> for RuleEntry {
    fn from(rule: Rule) -> Self {
        Self::Known(rule)
    }
}

impl<'de> Deserialize<'de> for RuleEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let rule_type = value
            .get("type")
            .and_then(serde_yaml::Value::as_str)
            .ok_or_else(|| D::Error::missing_field("type"))?
            .to_string();
        if !Rule::KINDS.contains(&rule_type.as_str()) {
            return Ok(Self::Unknown { rule_type });
        }
        serde_yaml::from_value(value)
            .map(Self::Known)
            .map_err(|error| D::Error::custom(format!("{rule_type}: {error}")))
    }
}

/// A column reference as written in the configuration.
///
/// Each rule decides how references become [`crate::ColumnSelector`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(i64),
    Name(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// One `delete_rows` condition.
///
/// Only one key is honored per condition, checked in the order `contains`,
/// `empty`, `range`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowCondition {
    pub contains: Option<Vec<CellText>>,
    pub empty: Option<bool>,
    pub range: Option<(usize, usize)>,
}

/// The effective filter of a [`RowCondition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowFilter<'a> {
    Contains(&'a [CellText]),
    Empty,
    Range { start: usize, end: usize },
}

impl RowCondition {
    /// The first active key wins: `contains`, then `empty: true`, then `range`.
    /// Returns `None` when the condition selects nothing.
    pub fn filter(&self) -> Option<RowFilter<'_>> {
        if let Some(texts) = &self.contains {
            return Some(RowFilter::Contains(texts));
        }
        if self.empty == Some(true) {
            return Some(RowFilter::Empty);
        }
        self.range
            .map(|(start, end)| RowFilter::Range { start, end })
    }
}

/// A scalar search text; YAML numbers and booleans are matched by their text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellText {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for CellText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Display style for `format_numbers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// Leave values untouched.
    #[default]
    Standard,
    /// Fixed decimals, no thousands grouping.
    FixedPoint,
    /// Grouped thousands followed by the currency code.
    Currency,
}

/// Targets of `replace_decimal_separator`: the literal `last`, or column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSeparatorColumns", into = "RawSeparatorColumns")]
pub enum SeparatorColumns {
    Last,
    Named(Vec<String>),
}

impl Default for SeparatorColumns {
    fn default() -> Self {
        Self::Named(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSeparatorColumns {
    List(Vec<String>),
    Single(String),
}

impl From<RawSeparatorColumns> for SeparatorColumns {
    fn from(raw: RawSeparatorColumns) -> Self {
        match raw {
            RawSeparatorColumns::List(names) => Self::Named(names),
            RawSeparatorColumns::Single(keyword) if keyword == "last" => Self::Last,
            RawSeparatorColumns::Single(name) => Self::Named(vec![name]),
        }
    }
}

impl From<SeparatorColumns> for RawSeparatorColumns {
    fn from(columns: SeparatorColumns) -> Self {
        match columns {
            SeparatorColumns::Last => Self::Single("last".to_string()),
            SeparatorColumns::Named(names) => Self::List(names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let rule = Rule::RoundLastColumn { decimals: 2 };
        assert!(Rule::KINDS.contains(&rule.kind()));
    }

    #[test]
    fn condition_honors_first_key() {
        let condition = RowCondition {
            contains: Some(vec![CellText::Text("x".to_string())]),
            empty: Some(true),
            range: None,
        };
        assert!(matches!(condition.filter(), Some(RowFilter::Contains(_))));

        let disabled = RowCondition {
            empty: Some(false),
            ..RowCondition::default()
        };
        assert_eq!(disabled.filter(), None);
    }

    #[test]
    fn empty_false_falls_through_to_range() {
        let condition = RowCondition {
            empty: Some(false),
            range: Some((0, 1)),
            ..RowCondition::default()
        };
        assert_eq!(
            condition.filter(),
            Some(RowFilter::Range { start: 0, end: 1 })
        );
    }
}
