//! Ordered rule execution.

use polars::prelude::DataFrame;
use tabmod_model::{AccountingAnnotations, Rule, RuleEntry};
use tracing::{debug, info, info_span, warn};

use crate::error::{Result, RuleWarning};
use crate::executors;

/// What a rule chain produced besides the mutated table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    /// Accounting display requests for the exporter.
    pub annotations: AccountingAnnotations,
    /// Number of recognized rules that ran.
    pub applied: usize,
    pub warnings: Vec<RuleWarning>,
}

/// Per-rule state handed to the executors.
#[derive(Debug)]
pub struct RuleContext {
    rule: &'static str,
    pub annotations: AccountingAnnotations,
    warnings: Vec<RuleWarning>,
}

impl RuleContext {
    fn new() -> Self {
        Self {
            rule: "",
            annotations: AccountingAnnotations::new(),
            warnings: Vec::new(),
        }
    }

    /// Report a reference that matched no column.
    pub fn not_found(&mut self, selector: String) {
        self.push(RuleWarning::SelectorNotFound {
            rule: self.rule,
            selector,
        });
    }

    /// Report an unusable rule parameter.
    pub fn invalid(&mut self, message: String) {
        self.push(RuleWarning::InvalidParameter {
            rule: self.rule,
            message,
        });
    }

    fn push(&mut self, warning: RuleWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Apply `rules` to `df` in declaration order.
///
/// Unknown rule types and unresolvable references are skipped with a warning.
/// A Polars failure aborts the chain; rules already applied are not rolled back.
pub fn apply_rules(df: &mut DataFrame, rules: &[RuleEntry]) -> Result<RuleOutcome> {
    let span = info_span!("transform", rules = rules.len());
    let _guard = span.enter();

    let mut ctx = RuleContext::new();
    let mut applied = 0usize;
    for (index, entry) in rules.iter().enumerate() {
        match entry {
            RuleEntry::Known(rule) => {
                ctx.rule = rule.kind();
                debug!(index, rule = rule.kind(), "applying rule");
                apply_rule(df, rule, &mut ctx)?;
                applied += 1;
            }
            RuleEntry::Unknown { rule_type } => {
                ctx.push(RuleWarning::UnknownRuleType {
                    rule_type: rule_type.clone(),
                });
            }
        }
    }

    info!(
        applied,
        warnings = ctx.warnings.len(),
        rows = df.height(),
        columns = df.width(),
        "rules applied"
    );
    Ok(RuleOutcome {
        annotations: ctx.annotations,
        applied,
        warnings: ctx.warnings,
    })
}

fn apply_rule(df: &mut DataFrame, rule: &Rule, ctx: &mut RuleContext) -> Result<()> {
    match rule {
        Rule::DeleteColumns { columns } => executors::delete_columns(df, columns, ctx),
        Rule::DeleteRows { conditions } => executors::delete_rows(df, conditions),
        Rule::RoundNumbers { columns, decimals } => {
            executors::round_numbers(df, columns, *decimals, ctx)
        }
        Rule::RenameColumns { mapping } => executors::rename_columns(df, mapping, ctx),
        Rule::ReorderColumns { order } => executors::reorder_columns(df, order, ctx),
        Rule::SelectColumns { columns } => executors::select_columns(df, columns, ctx),
        Rule::FormatNumbers {
            columns,
            format,
            decimals,
            currency,
        } => executors::format_numbers(df, columns, *format, *decimals, currency, ctx),
        Rule::DateFormat {
            columns,
            from_format,
            to_format,
        } => executors::date_format(
            df,
            columns,
            from_format.as_deref(),
            to_format.as_deref(),
            ctx,
        ),
        Rule::FormatAccounting { columns, decimals } => {
            executors::format_accounting(df, columns, *decimals, ctx)
        }
        Rule::RoundLastColumn { decimals } => executors::round_last_column(df, *decimals),
        Rule::ReplaceDecimalSeparator {
            columns,
            from_separator,
            to_separator,
        } => executors::replace_decimal_separator(df, columns, from_separator, to_separator, ctx),
    }
}
