use prs_ingest::{HeaderOptions, resolve_headers};
use prs_model::RawTable;

fn table(rows: Vec<Vec<&str>>) -> RawTable {
    RawTable::new(
        "sample.csv",
        "sample",
        rows.into_iter()
            .map(|row| row.into_iter().map(str::to_string).collect())
            .collect(),
    )
}

#[test]
fn plain_header_on_first_row() {
    let table = table(vec![
        vec!["Provider", "SKU", "Amount"],
        vec!["acme", "A-1", "10"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.header_rows, vec![0]);
    assert_eq!(spec.labels, vec!["Provider", "SKU", "Amount"]);
    assert_eq!(spec.data_start, 1);
}

#[test]
fn banner_rows_are_skipped() {
    let table = table(vec![
        vec!["ACME Monthly Sales Report", "", ""],
        vec!["", "", ""],
        vec!["Provider", "SKU", "Amount"],
        vec!["acme", "A-1", "10"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.header_rows, vec![2]);
    assert_eq!(spec.labels, vec!["Provider", "SKU", "Amount"]);
    assert_eq!(spec.data_start, 3);
}

#[test]
fn explicit_header_row_wins_over_heuristics() {
    // Row 0 would score as a plausible header; the explicit hint must win.
    let table = table(vec![
        vec!["Provider", "SKU", "Amount"],
        vec!["Vendor", "Item", "Total"],
        vec!["acme", "A-1", "10"],
    ]);
    let options = HeaderOptions {
        header_row: Some(1),
        ..HeaderOptions::default()
    };
    let spec = resolve_headers(&table, &options).expect("resolve");
    assert_eq!(spec.header_rows, vec![1]);
    assert_eq!(spec.labels, vec!["Vendor", "Item", "Total"]);
    assert_eq!(spec.data_start, 2);
}

#[test]
fn year_over_months_combines_labels() {
    let table = table(vec![
        vec!["2020", "", ""],
        vec!["Jan", "Feb", "Mar"],
        vec!["10", "20", "30"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.header_rows, vec![0, 1]);
    assert_eq!(spec.labels, vec!["2020_Jan", "2020_Feb", "2020_Mar"]);
    assert_eq!(spec.data_start, 2);
}

#[test]
fn localized_months_normalize_before_combining() {
    let table = table(vec![
        vec!["", "2021", ""],
        vec!["SKU", "Tammikuu", "Helmikuu"],
        vec!["A-1", "10", "20"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.labels, vec!["SKU", "2021_Jan", "2021_Feb"]);
}

#[test]
fn merged_group_row_combines_with_sub_labels() {
    let table = table(vec![
        vec!["Customer", "Sales", ""],
        vec!["Name", "Q1", "Q2"],
        vec!["acme", "10", "20"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.header_rows, vec![0, 1]);
    assert_eq!(
        spec.labels,
        vec!["Customer_Name", "Sales_Q1", "Sales_Q2"]
    );
    assert_eq!(spec.data_start, 2);
}

#[test]
fn no_plausible_header_is_an_error() {
    let table = table(vec![vec!["1", "2", "3"], vec!["4", "5", "6"]]);
    let result = resolve_headers(&table, &HeaderOptions::default());
    assert!(result.is_err());
}

#[test]
fn long_banner_above_header_is_not_a_group_row() {
    let table = table(vec![
        vec!["Quarterly report for partners", "", ""],
        vec!["Provider", "SKU", "Amount"],
        vec!["acme", "A-1", "10"],
    ]);
    let spec = resolve_headers(&table, &HeaderOptions::default()).expect("resolve");
    assert_eq!(spec.header_rows, vec![1]);
    assert_eq!(spec.labels, vec!["Provider", "SKU", "Amount"]);
}
