//! Tests for configuration parsing.

use std::fs;

use tabmod_model::{
    CellText, ColumnRef, Config, ConfigError, ExportFormat, NumberFormat, RowFilter, Rule,
    RuleEntry, SeparatorColumns, SheetSelector,
};

const FULL_CONFIG: &str = r#"
load_options:
  sheet_name: Balance
  data_only: true
transformations:
  - type: delete_columns
    columns: [0, "Total"]
  - type: delete_rows
    conditions:
      - contains: ["Subtotal", 2023]
      - empty: true
      - range: [0, 2]
  - type: round_numbers
    columns: [Amount]
  - type: rename_columns
    mapping:
      Amount: Importe
  - type: format_numbers
    columns: [Importe]
    format: currency
    currency: USD
  - type: date_format
    columns: [Date]
    from_format: "%d/%m/%Y"
  - type: format_accounting
    columns: ["B", 3, "Balance"]
    decimals: 0
  - type: replace_decimal_separator
    columns: last
  - type: frobnicate
    level: 11
export:
  format: csv
  delimiter: ";"
  headers: false
"#;

#[test]
fn parses_every_section() {
    let config = Config::from_yaml_str(FULL_CONFIG).expect("parse config");

    assert_eq!(
        config.load_options.sheet_name,
        Some(SheetSelector::Name("Balance".to_string()))
    );
    assert!(config.load_options.data_only);
    assert_eq!(config.transformations.len(), 9);
    assert_eq!(config.export.format, ExportFormat::Csv);
    assert_eq!(config.export.delimiter, ";");
    assert!(!config.export.headers);
    assert!(!config.export.apply_excel_formatting);
}

#[test]
fn mixed_column_references_keep_their_kind() {
    let config = Config::from_yaml_str(FULL_CONFIG).expect("parse config");
    let RuleEntry::Known(Rule::DeleteColumns { columns }) = &config.transformations[0] else {
        panic!("expected delete_columns");
    };
    assert_eq!(
        columns,
        &vec![ColumnRef::Index(0), ColumnRef::Name("Total".to_string())]
    );
}

#[test]
fn row_conditions_and_defaults() {
    let config = Config::from_yaml_str(FULL_CONFIG).expect("parse config");
    let RuleEntry::Known(Rule::DeleteRows { conditions }) = &config.transformations[1] else {
        panic!("expected delete_rows");
    };
    assert_eq!(conditions.len(), 3);
    match conditions[0].filter() {
        Some(RowFilter::Contains(texts)) => {
            assert_eq!(texts[0], CellText::Text("Subtotal".to_string()));
            assert_eq!(texts[1].to_string(), "2023");
        }
        other => panic!("unexpected filter {other:?}"),
    }
    assert_eq!(conditions[1].filter(), Some(RowFilter::Empty));
    assert_eq!(
        conditions[2].filter(),
        Some(RowFilter::Range { start: 0, end: 2 })
    );

    assert_eq!(
        config.transformations[2],
        RuleEntry::Known(Rule::RoundNumbers {
            columns: vec!["Amount".to_string()],
            decimals: 2,
        })
    );
    let RuleEntry::Known(Rule::FormatNumbers {
        format,
        decimals,
        currency,
        ..
    }) = &config.transformations[4]
    else {
        panic!("expected format_numbers");
    };
    assert_eq!(*format, NumberFormat::Currency);
    assert_eq!(*decimals, 2);
    assert_eq!(currency, "USD");
}

#[test]
fn separator_keyword_and_unknown_rules() {
    let config = Config::from_yaml_str(FULL_CONFIG).expect("parse config");
    let RuleEntry::Known(Rule::ReplaceDecimalSeparator {
        columns,
        from_separator,
        to_separator,
    }) = &config.transformations[7]
    else {
        panic!("expected replace_decimal_separator");
    };
    assert_eq!(columns, &SeparatorColumns::Last);
    assert_eq!(from_separator, ".");
    assert_eq!(to_separator, ",");

    assert_eq!(
        config.transformations[8],
        RuleEntry::Unknown {
            rule_type: "frobnicate".to_string()
        }
    );
    assert_eq!(config.transformations[8].kind(), "frobnicate");
}

#[test]
fn known_rule_with_missing_field_is_rejected() {
    let error = Config::from_yaml_str("transformations:\n  - type: select_columns\n")
        .expect_err("missing columns");
    assert!(error.to_string().contains("select_columns"));
}

#[test]
fn rule_without_type_is_rejected() {
    let result = Config::from_yaml_str("transformations:\n  - columns: [A]\n");
    assert!(result.is_err());
}

#[test]
fn reads_from_disk_and_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = dir.path().join("good.yaml");
    fs::write(&good, "export:\n  format: txt\n").expect("write config");
    let config = Config::from_path(&good).expect("read config");
    assert_eq!(config.export.format, ExportFormat::Txt);

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        Config::from_path(&missing),
        Err(ConfigError::Read { .. })
    ));

    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "export:\n  format: ods\n").expect("write config");
    match Config::from_path(&bad) {
        Err(ConfigError::Invalid { path, .. }) => assert_eq!(path, bad),
        other => panic!("unexpected result {other:?}"),
    }
}
