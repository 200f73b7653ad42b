use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use prs_model::RawTable;

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read a CSV file into a [`RawTable`] without interpreting any row as a
/// header. Banner rows and multi-row headers are preserved so the header
/// resolver can work on the sheet exactly as exported; row indices in
/// explicit header hints therefore refer to the file as-is.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        rows.push(record.iter().map(normalize_cell).collect());
    }
    let source_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    let sheet_id = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(RawTable::new(source_file, sheet_id, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_and_whitespace_are_stripped() {
        assert_eq!(normalize_cell("\u{feff}Provider "), "Provider");
        assert_eq!(normalize_cell("  "), "");
    }
}
