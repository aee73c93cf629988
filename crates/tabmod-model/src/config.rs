//! Configuration document read from YAML.
//!
//! A configuration has three recognized top-level keys:
//!
//! ```yaml
//! load_options:
//!   sheet_name: Summary
//!   data_only: true
//! transformations:
//!   - type: delete_columns
//!     columns: [0, "Total"]
//! export:
//!   format: txt
//!   delimiter: ";"
//! ```
//!
//! Unknown top-level keys are ignored.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::RuleEntry;

/// A parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Format-specific ingestion hints.
    pub load_options: LoadOptions,
    /// Ordered rule list; declaration order is execution order.
    pub transformations: Vec<RuleEntry>,
    /// Output format and naming.
    pub export: ExportConfig,
}

impl Config {
    /// Read and parse a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|error| match error {
            ConfigError::Parse(source) => ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse a configuration from YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Ingestion hints consumed by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Worksheet to read from `.xlsx` inputs (default: first sheet).
    pub sheet_name: Option<SheetSelector>,
    /// Coerce numeric-looking text columns to numbers after loading `.xlsx` inputs.
    pub data_only: bool,
}

/// Worksheet selection by position or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Txt,
}

impl ExportFormat {
    /// Extension used for derived output names.
    ///
    /// Both delimited formats produce `.txt` files.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv | Self::Txt => "txt",
        }
    }

    pub fn is_delimited(self) -> bool {
        matches!(self, Self::Csv | Self::Txt)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Field delimiter for `csv`/`txt` output; must be a single byte.
    pub delimiter: String,
    /// Write a header row for `csv`/`txt` output.
    pub headers: bool,
    /// Apply accounting number formats to annotated columns in `xlsx` output.
    pub apply_excel_formatting: bool,
    /// Fallback name template used when no input path is known; `{date}` expands
    /// to the local date as `YYYYMMDD`.
    pub filename: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            delimiter: "\t".to_string(),
            headers: true,
            apply_excel_formatting: false,
            filename: None,
        }
    }
}
