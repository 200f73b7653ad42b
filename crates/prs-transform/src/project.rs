//! Column projection: raw columns to canonical names via a confirmed mapping.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, NamedFrom, Series};

use prs_ingest::HeaderSpec;
use prs_model::{ColumnMapping, RawTable};

use crate::error::Result;

/// One sheet after projection, ready for combining.
#[derive(Debug, Clone)]
pub struct ProjectedSheet {
    pub sheet_id: String,
    pub data: DataFrame,
    /// Raw headers not carried into the frame.
    pub dropped_columns: Vec<String>,
}

/// Project a raw sheet into a string-celled frame with canonical names.
///
/// Mapped columns are renamed to their canonical field; unmapped columns
/// are dropped and recorded, except with `keep_unmapped` (the unpivot
/// case), where they survive under their raw label as value columns.
/// Rows that are entirely empty never make it into the frame.
pub fn project_sheet(
    table: &RawTable,
    spec: &HeaderSpec,
    mapping: &ColumnMapping,
    keep_unmapped: bool,
) -> Result<ProjectedSheet> {
    let mut keep: Vec<(usize, String)> = Vec::new();
    let mut dropped: Vec<String> = Vec::new();
    let mut used_names: BTreeSet<String> = BTreeSet::new();

    for (idx, label) in spec.labels.iter().enumerate() {
        let out_name = match mapping.target_for(label) {
            Some(target) => Some(target.to_string()),
            None if keep_unmapped => Some(label.clone()),
            None => None,
        };
        match out_name {
            Some(name) => {
                // A raw label shadowing a canonical name would collide
                // after renaming; drop the raw column instead.
                if used_names.insert(name.to_lowercase()) {
                    keep.push((idx, name));
                } else {
                    dropped.push(label.clone());
                }
            }
            None => dropped.push(label.clone()),
        }
    }

    let data_rows: Vec<&Vec<String>> = table
        .rows
        .iter()
        .skip(spec.data_start)
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    let mut columns = Vec::with_capacity(keep.len());
    for (idx, name) in &keep {
        let values: Vec<String> = data_rows
            .iter()
            .map(|row| row.get(*idx).map(|cell| cell.trim().to_string()).unwrap_or_default())
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    let data = DataFrame::new(columns)?;

    Ok(ProjectedSheet {
        sheet_id: table.sheet_id.clone(),
        data,
        dropped_columns: dropped,
    })
}
