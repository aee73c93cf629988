pub mod annotations;
pub mod config;
pub mod error;
pub mod rules;
pub mod selector;

pub use annotations::{AccountingAnnotations, accounting_format_code};
pub use config::{Config, ExportConfig, ExportFormat, LoadOptions, SheetSelector};
pub use error::ConfigError;
pub use rules::{
    CellText, ColumnRef, NumberFormat, RowCondition, RowFilter, Rule, RuleEntry,
    SeparatorColumns,
};
pub use selector::ColumnSelector;
