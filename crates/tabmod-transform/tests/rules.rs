//! Tests for the rule engine.

use polars::prelude::*;
use tabmod_common::{any_to_string, column_names};
use tabmod_model::{Config, RuleEntry};
use tabmod_transform::{RuleWarning, apply_rules};

fn rules(yaml: &str) -> Vec<RuleEntry> {
    Config::from_yaml_str(yaml).unwrap().transformations
}

fn text(df: &DataFrame, column: &str, row: usize) -> String {
    any_to_string(df.column(column).unwrap().get(row).unwrap())
}

fn ledger() -> DataFrame {
    DataFrame::new(vec![
        Series::new("Cuenta".into(), vec![Some("Caja"), Some("Bancos"), Some("Subtotal"), None])
            .into(),
        Series::new("Debe".into(), vec![Some(1234.567), Some(-0.005), Some(1234.562), None]).into(),
        Series::new("Haber".into(), vec![Some("10.5"), Some("n/a"), Some("7"), None]).into(),
        Series::new("Total".into(), vec![Some(1.0), Some(2.0), Some(3.0), None]).into(),
    ])
    .unwrap()
}

#[test]
fn empty_rows_then_rounding() {
    let mut df = DataFrame::new(vec![
        Series::new("A".into(), vec![Some("x"), None]).into(),
        Series::new("B".into(), vec![Some(1.005), None]).into(),
        Series::new("C".into(), vec![Some("2024-01-01"), Some("")]).into(),
    ])
    .unwrap();

    let outcome = apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: delete_rows
    conditions:
      - empty: true
  - type: round_numbers
    columns: [B]
    decimals: 2
",
        ),
    )
    .unwrap();

    assert_eq!(outcome.applied, 2);
    assert!(outcome.warnings.is_empty());
    assert_eq!(df.height(), 1);
    assert_eq!(df.column("B").unwrap().f64().unwrap().get(0), Some(1.0));
    assert_eq!(text(&df, "A", 0), "x");
}

#[test]
fn delete_columns_by_index_and_name_collapse() {
    let mut df = DataFrame::new(vec![
        Series::new("Total".into(), vec![1.0]).into(),
        Series::new("B".into(), vec![2.0]).into(),
        Series::new("C".into(), vec![3.0]).into(),
    ])
    .unwrap();

    let outcome = apply_rules(
        &mut df,
        &rules("transformations:\n  - type: delete_columns\n    columns: [0, \"Total\"]\n"),
    )
    .unwrap();

    assert_eq!(column_names(&df), vec!["B", "C"]);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn delete_columns_negative_position_counts_from_end() {
    let mut df = ledger();
    let outcome = apply_rules(
        &mut df,
        &rules("transformations:\n  - type: delete_columns\n    columns: [-1, -9]\n"),
    )
    .unwrap();

    assert_eq!(column_names(&df), vec!["Cuenta", "Debe", "Haber"]);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [RuleWarning::SelectorNotFound { rule: "delete_columns", .. }]
    ));
}

#[test]
fn delete_columns_falls_back_to_substring() {
    let mut df = ledger();
    let outcome = apply_rules(
        &mut df,
        &rules("transformations:\n  - type: delete_columns\n    columns: [\"HAB\", \"tot\", 9, -9]\n"),
    )
    .unwrap();

    assert_eq!(column_names(&df), vec!["Cuenta", "Debe"]);
    assert_eq!(outcome.warnings.len(), 2);
    assert!(outcome.warnings.iter().all(|warning| matches!(
        warning,
        RuleWarning::SelectorNotFound { rule: "delete_columns", .. }
    )));
}

#[test]
fn delete_rows_conditions_apply_in_sequence() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: delete_rows
    conditions:
      - contains: [subtotal]
      - empty: true
      - range: [0, 0]
",
        ),
    )
    .unwrap();

    assert_eq!(df.height(), 1);
    assert_eq!(text(&df, "Cuenta", 0), "Bancos");
}

#[test]
fn delete_rows_contains_matches_numbers_by_text() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules("transformations:\n  - type: delete_rows\n    conditions:\n      - contains: [1234.5]\n"),
    )
    .unwrap();
    assert_eq!(df.height(), 2);
}

#[test]
fn range_is_clipped_to_table_length() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules("transformations:\n  - type: delete_rows\n    conditions:\n      - range: [2, 99]\n"),
    )
    .unwrap();
    assert_eq!(df.height(), 2);
}

#[test]
fn disabled_empty_condition_still_applies_range() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules(
            "transformations:\n  - type: delete_rows\n    conditions:\n      - empty: false\n        range: [0, 0]\n",
        ),
    )
    .unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(text(&df, "Cuenta", 0), "Bancos");
}

#[test]
fn round_numbers_coerces_text_to_missing() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules("transformations:\n  - type: round_numbers\n    columns: [Haber, Debe]\n    decimals: 1\n"),
    )
    .unwrap();

    let haber = df.column("Haber").unwrap().f64().unwrap();
    assert_eq!(haber.get(0), Some(10.5));
    assert_eq!(haber.get(1), None);
    let debe = df.column("Debe").unwrap().f64().unwrap();
    assert_eq!(debe.get(0), Some(1234.6));
    assert_eq!(debe.get(1), Some(-0.0));
}

#[test]
fn rename_rejects_duplicate_results() {
    let mut df = ledger();
    let outcome = apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: rename_columns
    mapping:
      Debe: Total
  - type: rename_columns
    mapping:
      Debe: Total
      Total: Saldo
      Missing: Other
",
        ),
    )
    .unwrap();

    assert_eq!(column_names(&df), vec!["Cuenta", "Total", "Haber", "Saldo"]);
    assert!(matches!(
        outcome.warnings[0],
        RuleWarning::InvalidParameter { rule: "rename_columns", .. }
    ));
    assert!(matches!(
        outcome.warnings[1],
        RuleWarning::SelectorNotFound { rule: "rename_columns", .. }
    ));
}

#[test]
fn select_then_reorder_is_idempotent() {
    let chain = rules(
        "transformations:
  - type: select_columns
    columns: [Total, Cuenta, Debe, Nope]
  - type: reorder_columns
    order: [Debe]
",
    );
    let mut df = ledger();
    apply_rules(&mut df, &chain).unwrap();
    let first = column_names(&df);
    apply_rules(&mut df, &chain).unwrap();

    assert_eq!(first, vec!["Debe", "Total", "Cuenta"]);
    assert_eq!(column_names(&df), first);
}

#[test]
fn format_numbers_fixed_and_currency() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: format_numbers
    columns: [Debe]
    format: currency
  - type: format_numbers
    columns: [Total]
    format: fixed_point
    decimals: 3
  - type: format_numbers
    columns: [Haber]
",
        ),
    )
    .unwrap();

    assert_eq!(text(&df, "Debe", 0), "1,234.57 EUR");
    assert_eq!(text(&df, "Debe", 3), "");
    assert_eq!(text(&df, "Total", 1), "2.000");
    assert_eq!(df.column("Total").unwrap().dtype(), &DataType::String);
    assert_eq!(text(&df, "Haber", 1), "n/a");
}

#[test]
fn date_format_parses_and_renders() {
    let mut df = DataFrame::new(vec![
        Series::new("Fecha".into(), vec![Some("31/12/2023"), Some("garbage"), None]).into(),
        Series::new("Alta".into(), vec![Some("2024-02-01"), Some("2024-02-02 08:00:00"), None])
            .into(),
    ])
    .unwrap();

    let outcome = apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: date_format
    columns: [Fecha]
    from_format: \"%d/%m/%Y\"
    to_format: \"%Y-%m-%d\"
  - type: date_format
    columns: [Alta]
",
        ),
    )
    .unwrap();

    assert!(outcome.warnings.is_empty());
    assert_eq!(text(&df, "Fecha", 0), "2023-12-31");
    assert_eq!(df.column("Fecha").unwrap().get(1).unwrap(), AnyValue::Null);
    assert!(matches!(
        df.column("Alta").unwrap().dtype(),
        DataType::Datetime(_, _)
    ));
    assert_eq!(text(&df, "Alta", 1), "2024-02-02 08:00:00");
}

#[test]
fn invalid_to_format_yields_missing_values() {
    let mut df = DataFrame::new(vec![
        Series::new("Fecha".into(), vec!["2024-01-01"]).into(),
    ])
    .unwrap();
    let outcome = apply_rules(
        &mut df,
        &rules("transformations:\n  - type: date_format\n    columns: [Fecha]\n    to_format: \"%Q\"\n"),
    )
    .unwrap();

    assert_eq!(df.column("Fecha").unwrap().get(0).unwrap(), AnyValue::Null);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [RuleWarning::InvalidParameter { rule: "date_format", .. }]
    ));
}

#[test]
fn format_accounting_resolves_letters_positions_and_names() {
    let mut df = ledger();
    let outcome = apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: format_accounting
    columns: [B, 3, Haber, Z]
    decimals: 1
",
        ),
    )
    .unwrap();

    let annotations: Vec<(&str, u32)> = outcome.annotations.iter().collect();
    assert_eq!(annotations, vec![("Debe", 1), ("Haber", 1), ("Total", 1)]);
    assert_eq!(df.column("Debe").unwrap().f64().unwrap().get(0), Some(1234.6));
    assert_eq!(df.column("Haber").unwrap().dtype(), &DataType::Float64);
    assert_eq!(outcome.warnings.len(), 1);
}

#[test]
fn round_last_column_targets_final_position() {
    let mut df = ledger();
    apply_rules(
        &mut df,
        &rules("transformations:\n  - type: reorder_columns\n    order: [Total, Cuenta, Haber]\n  - type: round_last_column\n    decimals: 0\n"),
    )
    .unwrap();
    assert_eq!(column_names(&df).last().map(String::as_str), Some("Debe"));
    assert_eq!(df.column("Debe").unwrap().f64().unwrap().get(0), Some(1235.0));

    let mut empty = DataFrame::empty();
    apply_rules(&mut empty, &rules("transformations:\n  - type: round_last_column\n")).unwrap();
    assert_eq!(empty.width(), 0);
}

#[test]
fn separator_replacement_is_literal() {
    let mut df = DataFrame::new(vec![
        Series::new("Nota".into(), vec![Some("a.b"), Some("a*b"), None]).into(),
        Series::new("Importe".into(), vec![Some(1.5), Some(2.0), Some(1234.25)]).into(),
    ])
    .unwrap();
    apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: replace_decimal_separator
    columns: last
  - type: replace_decimal_separator
    columns: [Nota]
    from_separator: \"*\"
    to_separator: \"#\"
",
        ),
    )
    .unwrap();

    assert_eq!(text(&df, "Importe", 0), "1,5");
    assert_eq!(text(&df, "Importe", 1), "2,0");
    assert_eq!(text(&df, "Importe", 2), "1234,25");
    assert_eq!(text(&df, "Nota", 0), "a.b");
    assert_eq!(text(&df, "Nota", 1), "a#b");
    assert_eq!(df.column("Nota").unwrap().get(2).unwrap(), AnyValue::Null);
}

#[test]
fn integer_columns_stay_integral() {
    let mut df = DataFrame::new(vec![
        Series::new("Cuenta".into(), vec![100i64, 4300]).into(),
        Series::new("Codigo".into(), vec!["007", "12"]).into(),
        Series::new("Saldo".into(), vec![2.0, 0.125]).into(),
    ])
    .unwrap();
    apply_rules(
        &mut df,
        &rules(
            "transformations:
  - type: round_numbers
    columns: [Cuenta, Codigo, Saldo]
  - type: replace_decimal_separator
    columns: [Cuenta, Saldo]
",
        ),
    )
    .unwrap();

    assert_eq!(df.column("Codigo").unwrap().dtype(), &DataType::Int64);
    assert_eq!(text(&df, "Codigo", 0), "7");
    assert_eq!(text(&df, "Cuenta", 1), "4300");
    assert_eq!(text(&df, "Saldo", 0), "2,0");
    assert_eq!(text(&df, "Saldo", 1), "0,13");
}

#[test]
fn unknown_rule_is_skipped_with_warning() {
    let with_unknown = rules(
        "transformations:
  - type: frobnicate
    strength: 11
  - type: round_numbers
    columns: [Debe]
",
    );
    let without = rules("transformations:\n  - type: round_numbers\n    columns: [Debe]\n");

    let mut a = ledger();
    let mut b = ledger();
    let outcome = apply_rules(&mut a, &with_unknown).unwrap();
    apply_rules(&mut b, &without).unwrap();

    assert!(a.equals_missing(&b));
    assert_eq!(outcome.applied, 1);
    assert_eq!(
        outcome.warnings,
        vec![RuleWarning::UnknownRuleType {
            rule_type: "frobnicate".to_string()
        }]
    );
}

mod properties {
    use proptest::prelude::*;

    use super::*;

    fn frame(values: &[Option<f64>], labels: &[String]) -> DataFrame {
        let labels: Vec<Option<&str>> = labels
            .iter()
            .map(|label| (!label.is_empty()).then_some(label.as_str()))
            .collect();
        DataFrame::new(vec![
            Series::new("V".into(), values.to_vec()).into(),
            Series::new("L".into(), labels).into(),
        ])
        .unwrap()
    }

    fn any_rule() -> impl Strategy<Value = String> {
        prop_oneof![
            (0usize..6, 0usize..6).prop_map(|(a, b)| format!(
                "  - type: delete_rows\n    conditions:\n      - range: [{a}, {b}]\n"
            )),
            Just("  - type: delete_rows\n    conditions:\n      - empty: true\n".to_string()),
            "[a-c]".prop_map(|needle| format!(
                "  - type: delete_rows\n    conditions:\n      - contains: [{needle}]\n"
            )),
            (0i32..4).prop_map(|d| format!("  - type: round_numbers\n    columns: [V]\n    decimals: {d}\n")),
            Just("  - type: replace_decimal_separator\n    columns: [V]\n".to_string()),
            Just("  - type: reorder_columns\n    order: [L]\n".to_string()),
            Just("  - type: format_accounting\n    columns: [A]\n".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn row_count_never_increases(
            values in prop::collection::vec(prop::option::of(-1e6f64..1e6), 0..8),
            labels in prop::collection::vec("[a-c]{0,3}", 8),
            chain in prop::collection::vec(any_rule(), 0..6),
        ) {
            let mut df = frame(&values, &labels[..values.len()]);
            let yaml = format!("transformations:\n{}", chain.concat());
            let entries = rules(&yaml);

            let mut previous = df.height();
            for entry in &entries {
                apply_rules(&mut df, std::slice::from_ref(entry)).unwrap();
                prop_assert!(df.height() <= previous);
                previous = df.height();
            }
        }

        #[test]
        fn round_numbers_is_idempotent(
            values in prop::collection::vec(prop::option::of(-1e9f64..1e9), 1..10),
            decimals in 0i32..6,
        ) {
            let labels = vec![String::new(); values.len()];
            let mut df = frame(&values, &labels);
            let chain = rules(&format!(
                "transformations:\n  - type: round_numbers\n    columns: [V]\n    decimals: {decimals}\n"
            ));
            apply_rules(&mut df, &chain).unwrap();
            let once = df.clone();
            apply_rules(&mut df, &chain).unwrap();
            prop_assert!(df.equals_missing(&once));
        }
    }
}
