use polars::prelude::{DataFrame, DataType, NamedFrom, Series};

use prs_model::schema::default_contract;
use prs_model::{CanonicalField, FieldType, SchemaContract, ViolationKind};
use prs_validate::{ValidationResult, Validator};

fn string_frame(columns: &[(&str, &[&str])]) -> DataFrame {
    let cols = columns
        .iter()
        .map(|(name, values)| {
            let owned: Vec<String> = values.iter().map(|value| (*value).to_string()).collect();
            Series::new((*name).into(), owned).into()
        })
        .collect();
    DataFrame::new(cols).expect("build test frame")
}

#[test]
fn missing_required_field_is_reported_once() {
    let contract = SchemaContract::new(vec![
        CanonicalField::new("customer_id", FieldType::Text).required(),
        CanonicalField::new("sales_amount", FieldType::Number),
    ])
    .expect("contract");
    let df = string_frame(&[("sales_amount", &["1", "2"])]);

    let result = Validator::new(&contract).validate(&df);
    let violations = result.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::MissingRequiredField);
    assert_eq!(violations[0].field, "customer_id");
    assert!(violations[0].row.is_none());
}

#[test]
fn validation_collects_every_violation() {
    // Three independent problems in three different rows; all must appear.
    let contract = SchemaContract::new(vec![
        CanonicalField::new("article_sku", FieldType::Text).required(),
        CanonicalField::new("sales_amount", FieldType::Number),
        CanonicalField::new("report_date", FieldType::Date),
    ])
    .expect("contract");
    let df = string_frame(&[
        ("article_sku", &["s1", "", "s3"]),
        ("sales_amount", &["1", "2", "not a number"]),
        ("report_date", &["definitely not a date", "2024-01-02", "2024-01-03"]),
    ]);

    let result = Validator::new(&contract).validate(&df);
    let violations = result.violations();
    assert_eq!(violations.len(), 3);

    assert!(violations.iter().any(|v| {
        v.kind == ViolationKind::NullInRequiredField && v.field == "article_sku" && v.row == Some(1)
    }));
    assert!(violations.iter().any(|v| {
        v.kind == ViolationKind::TypeMismatch && v.field == "sales_amount" && v.row == Some(2)
    }));
    assert!(violations.iter().any(|v| {
        v.kind == ViolationKind::TypeMismatch && v.field == "report_date" && v.row == Some(0)
    }));
}

#[test]
fn valid_table_comes_back_typed() {
    let contract = default_contract();
    let df = string_frame(&[
        ("provider_id", &["acme", "acme"]),
        ("article_sku", &["s1", "s2"]),
        ("report_date", &["2020_Jan", "15.02.2020"]),
        ("sales_amount", &["10.5", "20"]),
        ("promo_flag", &["yes", "no"]),
        ("source_sheet", &["north", "south"]),
    ]);

    let result = Validator::new(&contract).validate(&df);
    let coerced = match result {
        ValidationResult::Valid(df) => df,
        ValidationResult::Invalid(violations) => {
            panic!("expected valid result, got {violations:?}")
        }
    };

    let amount = coerced.column("sales_amount").expect("amount column");
    assert_eq!(amount.dtype(), &DataType::Float64);
    let promo = coerced.column("promo_flag").expect("promo column");
    assert_eq!(promo.dtype(), &DataType::Boolean);

    // Dates normalize to ISO strings, period labels included.
    let dates = coerced.column("report_date").expect("date column");
    let first = dates.get(0).map(|v| v.to_string()).unwrap_or_default();
    assert!(first.contains("2020-01"), "got {first}");

    // Pass-through columns outside the contract are untouched.
    assert!(coerced.column("source_sheet").is_ok());
}

#[test]
fn invalid_result_leaves_input_untouched() {
    let contract = default_contract();
    let df = string_frame(&[
        ("provider_id", &["acme"]),
        ("article_sku", &["s1"]),
        ("report_date", &["garbage"]),
        ("sales_amount", &["1"]),
    ]);

    let result = Validator::new(&contract).validate(&df);
    assert!(!result.is_valid());
    // The original frame still holds the raw string.
    let raw = df.column("report_date").expect("column");
    assert_eq!(raw.dtype(), &DataType::String);
}

#[test]
fn optional_empty_cells_are_not_violations() {
    let contract = SchemaContract::new(vec![
        CanonicalField::new("article_sku", FieldType::Text).required(),
        CanonicalField::new("sales_qty", FieldType::Number),
    ])
    .expect("contract");
    let df = string_frame(&[
        ("article_sku", &["s1", "s2"]),
        ("sales_qty", &["", "4"]),
    ]);

    let result = Validator::new(&contract).validate(&df);
    assert!(result.is_valid());
}
