use polars::prelude::DataFrame;
use proptest::proptest;

use prs_ingest::HeaderSpec;
use prs_model::{ColumnEntry, ColumnMapping, MappingOrigin, RawTable, ReshapeConfig};
use prs_transform::data_utils::column_values;
use prs_transform::{
    ProjectedSheet, ReshapeInput, TransformError, aggregate, apply_reshape, combine_sheets, dedupe,
    drop_empty_rows, drop_sparse_columns, project_sheet, strip_thousands, trim_strings, unpivot,
};

fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
    ColumnMapping {
        entries: pairs
            .iter()
            .map(|(header, field)| ColumnEntry {
                source_header: (*header).to_string(),
                target_field: Some((*field).to_string()),
                origin: MappingOrigin::SynonymExact,
                confidence: 1.0,
            })
            .collect(),
        collisions: Vec::new(),
    }
}

fn raw_table(sheet: &str, rows: Vec<Vec<&str>>) -> RawTable {
    RawTable::new(
        format!("{sheet}.csv"),
        sheet,
        rows.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect(),
    )
}

fn spec(labels: &[&str]) -> HeaderSpec {
    HeaderSpec {
        header_rows: vec![0],
        labels: labels.iter().map(|label| (*label).to_string()).collect(),
        data_start: 1,
    }
}

fn string_frame(columns: &[(&str, &[&str])]) -> DataFrame {
    use polars::prelude::{NamedFrom, Series};
    let cols = columns
        .iter()
        .map(|(name, values)| {
            let owned: Vec<String> = values.iter().map(|value| (*value).to_string()).collect();
            Series::new((*name).into(), owned).into()
        })
        .collect();
    DataFrame::new(cols).expect("build test frame")
}

fn frames_equal(a: &DataFrame, b: &DataFrame) -> bool {
    let a_names: Vec<String> = a.get_column_names().iter().map(|n| n.to_string()).collect();
    let b_names: Vec<String> = b.get_column_names().iter().map(|n| n.to_string()).collect();
    if a_names != b_names || a.height() != b.height() {
        return false;
    }
    a_names
        .iter()
        .all(|name| column_values(a, name) == column_values(b, name))
}

#[test]
fn projection_renames_and_records_dropped() {
    let table = raw_table(
        "acme",
        vec![
            vec!["Vendor", "SKU", "Internal Note"],
            vec!["acme", "A-1", "skip me"],
            vec!["", "", ""],
        ],
    );
    let mapping = mapping(&[("Vendor", "provider_id"), ("SKU", "article_sku")]);
    let sheet =
        project_sheet(&table, &spec(&["Vendor", "SKU", "Internal Note"]), &mapping, false)
            .expect("project");

    let names: Vec<String> = sheet
        .data
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["provider_id", "article_sku"]);
    assert_eq!(sheet.dropped_columns, vec!["Internal Note"]);
    // The fully empty trailing row never enters the frame.
    assert_eq!(sheet.data.height(), 1);
}

#[test]
fn combining_sheets_tags_origin_and_sums_rows() {
    let north = ProjectedSheet {
        sheet_id: "north".to_string(),
        data: string_frame(&[("article_sku", &["A-1", "A-2"]), ("sales_amount", &["1", "2"])]),
        dropped_columns: Vec::new(),
    };
    let south = ProjectedSheet {
        sheet_id: "south".to_string(),
        data: string_frame(&[("article_sku", &["B-1"]), ("sales_amount", &["3"])]),
        dropped_columns: Vec::new(),
    };
    let combined = combine_sheets(&[north, south]).expect("combine");

    assert_eq!(combined.height(), 3);
    assert_eq!(
        column_values(&combined, "source_sheet"),
        vec!["north", "north", "south"]
    );
    assert_eq!(column_values(&combined, "article_sku"), vec!["A-1", "A-2", "B-1"]);
}

#[test]
fn combining_mismatched_sheets_fails() {
    let left = ProjectedSheet {
        sheet_id: "left".to_string(),
        data: string_frame(&[("article_sku", &["A-1"])]),
        dropped_columns: Vec::new(),
    };
    let right = ProjectedSheet {
        sheet_id: "right".to_string(),
        data: string_frame(&[("sales_amount", &["3"])]),
        dropped_columns: Vec::new(),
    };
    let result = combine_sheets(&[left, right]);
    assert!(matches!(
        result,
        Err(TransformError::SchemaMismatch { .. })
    ));
}

#[test]
fn unpivot_stacks_value_columns() {
    let df = string_frame(&[
        ("article_sku", &["s1", "s2"]),
        ("Jan", &["1", "2"]),
        ("Feb", &["3", "4"]),
    ]);
    let long = unpivot(
        &df,
        &["article_sku".to_string()],
        "report_date",
        "sales_amount",
    )
    .expect("unpivot");

    assert_eq!(long.height(), 4);
    assert_eq!(
        column_values(&long, "article_sku"),
        vec!["s1", "s1", "s2", "s2"]
    );
    assert_eq!(
        column_values(&long, "report_date"),
        vec!["Jan", "Feb", "Jan", "Feb"]
    );
    assert_eq!(column_values(&long, "sales_amount"), vec!["1", "3", "2", "4"]);
}

#[test]
fn unpivot_then_repivot_round_trips() {
    let df = string_frame(&[
        ("article_sku", &["s1", "s2"]),
        ("Jan", &["1", "2"]),
        ("Feb", &["3", "4"]),
    ]);
    let long = unpivot(
        &df,
        &["article_sku".to_string()],
        "report_date",
        "sales_amount",
    )
    .expect("unpivot");

    // Re-pivot by hand: group on the identifier, spread category back out.
    let ids = column_values(&long, "article_sku");
    let cats = column_values(&long, "report_date");
    let vals = column_values(&long, "sales_amount");
    let mut rebuilt: std::collections::BTreeMap<(String, String), String> =
        std::collections::BTreeMap::new();
    for ((id, cat), val) in ids.iter().zip(cats.iter()).zip(vals.iter()) {
        rebuilt.insert((id.clone(), cat.clone()), val.clone());
    }
    for (sku, jan, feb) in [("s1", "1", "3"), ("s2", "2", "4")] {
        assert_eq!(
            rebuilt.get(&(sku.to_string(), "Jan".to_string())),
            Some(&jan.to_string())
        );
        assert_eq!(
            rebuilt.get(&(sku.to_string(), "Feb".to_string())),
            Some(&feb.to_string())
        );
    }
}

#[test]
fn aggregate_sums_numeric_and_keeps_first_text() {
    let df = string_frame(&[
        ("article_sku", &["s1", "s2", "s1"]),
        ("sales_amount", &["1.5", "2", "3"]),
        ("region", &["", "south", "north"]),
    ]);
    let out = aggregate(&df, &["article_sku".to_string()]).expect("aggregate");

    assert_eq!(out.height(), 2);
    // Groups come out in first-occurrence order.
    assert_eq!(column_values(&out, "article_sku"), vec!["s1", "s2"]);
    assert_eq!(column_values(&out, "sales_amount"), vec!["4.5", "2"]);
    // First non-empty value in row order wins for text columns.
    assert_eq!(column_values(&out, "region"), vec!["north", "south"]);
}

#[test]
fn aggregate_with_missing_keys_is_a_no_op() {
    let df = string_frame(&[("sales_amount", &["1", "2"])]);
    let out = aggregate(&df, &["nonexistent".to_string()]).expect("aggregate");
    assert!(frames_equal(&df, &out));
}

#[test]
fn trim_and_strip_thousands() {
    let df = string_frame(&[("sales_amount", &[" 1,234 ", "5 678", "acme, inc"])]);
    let trimmed = trim_strings(&df).expect("trim");
    let stripped = strip_thousands(&trimmed).expect("strip");
    assert_eq!(
        column_values(&stripped, "sales_amount"),
        vec!["1234", "5678", "acme, inc"]
    );
}

#[test]
fn drop_empty_rows_and_sparse_columns() {
    let df = string_frame(&[
        ("article_sku", &["s1", "", "s2"]),
        ("notes", &["", "", ""]),
    ]);
    let (no_empty, dropped_rows) = drop_empty_rows(&df).expect("drop rows");
    assert_eq!(dropped_rows, 1);
    assert_eq!(no_empty.height(), 2);

    let (dense, dropped_cols) = drop_sparse_columns(&no_empty, 0.5).expect("drop cols");
    assert_eq!(dropped_cols, vec!["notes"]);
    let names: Vec<String> = dense
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["article_sku"]);
}

#[test]
fn dedupe_keeps_first_occurrence() {
    let df = string_frame(&[
        ("order_id", &["o1", "o2", "o1", ""]),
        ("sales_amount", &["1", "2", "9", "4"]),
    ]);
    let (deduped, dropped) = dedupe(&df, &["order_id".to_string()]).expect("dedupe");
    assert_eq!(dropped, 1);
    assert_eq!(column_values(&deduped, "order_id"), vec!["o1", "o2", ""]);
    // First occurrence wins; empty keys are kept.
    assert_eq!(column_values(&deduped, "sales_amount"), vec!["1", "2", "4"]);
}

#[test]
fn dedupe_is_idempotent() {
    let df = string_frame(&[("order_id", &["o1", "o1", "o2"])]);
    let (once, _) = dedupe(&df, &["order_id".to_string()]).expect("dedupe once");
    let (twice, dropped) = dedupe(&once, &["order_id".to_string()]).expect("dedupe twice");
    assert_eq!(dropped, 0);
    assert!(frames_equal(&once, &twice));
}

proptest! {
    #[test]
    fn dedupe_idempotent_for_arbitrary_keys(keys in proptest::collection::vec("[a-c]{0,2}", 0..24)) {
        use polars::prelude::{NamedFrom, Series};
        let series = Series::new("order_id".into(), keys);
        let df = DataFrame::new(vec![series.into()]).expect("frame");
        let (once, _) = dedupe(&df, &["order_id".to_string()]).expect("dedupe once");
        let (twice, dropped) = dedupe(&once, &["order_id".to_string()]).expect("dedupe twice");
        assert_eq!(dropped, 0);
        assert!(frames_equal(&once, &twice));
    }
}

#[test]
fn reshape_pipeline_unpivots_and_stamps_provider() {
    let table = raw_table(
        "acme",
        vec![
            vec!["SKU", "Jan", "Feb"],
            vec!["s1", "1", "3"],
            vec!["s2", "2", "4"],
        ],
    );
    let mapping = mapping(&[("SKU", "article_sku")]);
    let reshape = ReshapeConfig {
        unpivot: true,
        ..ReshapeConfig::default()
    };
    let sheet = project_sheet(&table, &spec(&["SKU", "Jan", "Feb"]), &mapping, true)
        .expect("project");

    let result = apply_reshape(ReshapeInput {
        sheets: vec![sheet],
        source_file: "acme.csv".to_string(),
        mapping: &mapping,
        reshape: &reshape,
        provider: Some("acme"),
    })
    .expect("reshape");

    assert_eq!(result.record_count(), 4);
    assert_eq!(result.meta.metrics.unpivot_rows, Some((2, 4)));
    let names: Vec<String> = result
        .data
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert!(names.contains(&"article_sku".to_string()));
    assert!(names.contains(&"report_date".to_string()));
    assert!(names.contains(&"sales_amount".to_string()));
    assert!(names.contains(&"provider_id".to_string()));
    assert_eq!(
        column_values(&result.data, "provider_id"),
        vec!["acme", "acme", "acme", "acme"]
    );
}
