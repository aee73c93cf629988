//! Error and warning types for rule execution.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Fatal failures while applying rules.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Result type for rule execution.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Non-fatal problems; the offending rule or reference is skipped and the
/// chain continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleWarning {
    #[error("unknown rule type '{rule_type}', skipped")]
    UnknownRuleType { rule_type: String },

    #[error("{rule}: no column matches {selector}")]
    SelectorNotFound { rule: &'static str, selector: String },

    #[error("{rule}: {message}")]
    InvalidParameter { rule: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = RuleWarning::SelectorNotFound {
            rule: "select_columns",
            selector: "name 'Total'".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "select_columns: no column matches name 'Total'"
        );
    }
}
