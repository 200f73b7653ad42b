//! Concatenation of multiple sources through one mapping.

use std::collections::BTreeSet;

use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::data_utils::column_value_string;
use crate::error::{Result, TransformError};
use crate::project::ProjectedSheet;

/// Origin column appended when multiple sheets are combined.
pub const SOURCE_SHEET_COLUMN: &str = "source_sheet";
/// Origin column appended when multiple files are aggregated.
pub const SOURCE_FILE_COLUMN: &str = "source";

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Concatenate tagged frames, appending `tag_column` with each frame's tag.
///
/// Every frame must carry an identical column-name set; a mismatch fails
/// with [`TransformError::SchemaMismatch`] rather than padding silently.
pub fn combine_tagged(frames: &[(String, DataFrame)], tag_column: &str) -> Result<DataFrame> {
    let Some((_, first)) = frames.first() else {
        return Ok(DataFrame::new(Vec::new())?);
    };
    let base_names = column_names(first);
    let base_set: BTreeSet<String> = base_names.iter().map(|name| name.to_lowercase()).collect();
    for (_, df) in frames.iter().skip(1) {
        let names = column_names(df);
        let set: BTreeSet<String> = names.iter().map(|name| name.to_lowercase()).collect();
        if set != base_set {
            return Err(TransformError::SchemaMismatch {
                left: base_names,
                right: names,
            });
        }
    }

    let total: usize = frames.iter().map(|(_, df)| df.height()).sum();
    let mut columns = Vec::with_capacity(base_names.len() + 1);
    for name in &base_names {
        let mut values = Vec::with_capacity(total);
        for (_, df) in frames {
            for idx in 0..df.height() {
                values.push(column_value_string(df, name, idx));
            }
        }
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    let mut tags = Vec::with_capacity(total);
    for (tag, df) in frames {
        for _ in 0..df.height() {
            tags.push(tag.clone());
        }
    }
    columns.push(Series::new(tag_column.into(), tags).into());
    Ok(DataFrame::new(columns)?)
}

/// Concatenate projected sheets. A single sheet passes through untouched;
/// combining more than one appends [`SOURCE_SHEET_COLUMN`] recording each
/// row's origin.
pub fn combine_sheets(sheets: &[ProjectedSheet]) -> Result<DataFrame> {
    if sheets.len() == 1 {
        return Ok(sheets[0].data.clone());
    }
    let frames: Vec<(String, DataFrame)> = sheets
        .iter()
        .map(|sheet| (sheet.sheet_id.clone(), sheet.data.clone()))
        .collect();
    combine_tagged(&frames, SOURCE_SHEET_COLUMN)
}
