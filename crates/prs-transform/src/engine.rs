//! Reshape pipeline composition.
//!
//! Stages run as an ordered sequence of pure functions: combine, provider
//! stamping, unpivot, then cleanup in its fixed order, aggregation, and
//! dedupe. No stage mutates its input; each returns a new frame.

use polars::prelude::DataFrame;
use tracing::debug;

use prs_model::{ColumnMapping, ReshapeConfig};

use crate::cleanup::{dedupe, drop_empty_rows, drop_sparse_columns, strip_thousands, trim_strings};
use crate::combine::{SOURCE_SHEET_COLUMN, combine_sheets};
use crate::data_utils::fill_string_column;
use crate::error::Result;
use crate::frame::{TransformMeta, TransformMetrics, TransformedTable};
use crate::project::ProjectedSheet;
use crate::unpivot::unpivot;

/// Everything the reshape pipeline needs for one file.
pub struct ReshapeInput<'a> {
    pub sheets: Vec<ProjectedSheet>,
    pub source_file: String,
    pub mapping: &'a ColumnMapping,
    pub reshape: &'a ReshapeConfig,
    /// Provider identity stamped into an empty/missing `provider_id`.
    pub provider: Option<&'a str>,
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names()
        .iter()
        .any(|column| column.as_str().eq_ignore_ascii_case(name))
}

/// Run the reshape pipeline over projected sheets.
pub fn apply_reshape(input: ReshapeInput<'_>) -> Result<TransformedTable> {
    let mut metrics = TransformMetrics {
        rows_in: input.sheets.iter().map(|sheet| sheet.data.height()).sum(),
        ..TransformMetrics::default()
    };
    let sheets: Vec<String> = input
        .sheets
        .iter()
        .map(|sheet| sheet.sheet_id.clone())
        .collect();
    let mut dropped_columns: Vec<String> = Vec::new();
    for sheet in &input.sheets {
        for column in &sheet.dropped_columns {
            if !dropped_columns.contains(column) {
                dropped_columns.push(column.clone());
            }
        }
    }

    let mut df = combine_sheets(&input.sheets)?;

    if let Some(provider) = input.provider {
        fill_string_column(&mut df, "provider_id", provider)?;
    }

    if input.reshape.unpivot {
        let mut ids: Vec<String> = if input.reshape.id_fields.is_empty() {
            input
                .mapping
                .mapped_pairs()
                .iter()
                .map(|(_, field)| (*field).to_string())
                .collect()
        } else {
            input.reshape.id_fields.clone()
        };
        for extra in [
            SOURCE_SHEET_COLUMN,
            crate::combine::SOURCE_FILE_COLUMN,
            "provider_id",
        ] {
            if has_column(&df, extra) && !ids.iter().any(|id| id.eq_ignore_ascii_case(extra)) {
                ids.push(extra.to_string());
            }
        }
        let before = df.height();
        df = unpivot(
            &df,
            &ids,
            &input.reshape.var_field,
            &input.reshape.value_field,
        )?;
        metrics.unpivot_rows = Some((before, df.height()));
        debug!(
            rows_before = before,
            rows_after = df.height(),
            "unpivot applied"
        );
    }

    if input.reshape.trim_strings {
        df = trim_strings(&df)?;
    }
    if input.reshape.strip_thousands {
        df = strip_thousands(&df)?;
    }
    if input.reshape.drop_empty_rows {
        let (next, dropped) = drop_empty_rows(&df)?;
        df = next;
        metrics.empty_rows_dropped = dropped;
    }
    if let Some(threshold) = input.reshape.drop_sparse_threshold {
        let (next, dropped) = drop_sparse_columns(&df, threshold)?;
        df = next;
        metrics.sparse_columns_dropped = dropped;
    }
    if !input.reshape.group_by.is_empty() {
        let mut keys = input.reshape.group_by.clone();
        if input.reshape.unpivot
            && has_column(&df, &input.reshape.var_field)
            && !keys
                .iter()
                .any(|key| key.eq_ignore_ascii_case(&input.reshape.var_field))
        {
            keys.push(input.reshape.var_field.clone());
        }
        if has_column(&df, "provider_id")
            && !keys.iter().any(|key| key.eq_ignore_ascii_case("provider_id"))
        {
            keys.push("provider_id".to_string());
        }
        df = crate::aggregate::aggregate(&df, &keys)?;
    }
    if !input.reshape.dedupe_on.is_empty() {
        let (next, dropped) = dedupe(&df, &input.reshape.dedupe_on)?;
        df = next;
        metrics.dedupe_dropped = dropped;
    }

    metrics.rows_out = df.height();
    Ok(TransformedTable {
        data: df,
        meta: TransformMeta {
            source_file: input.source_file,
            sheets,
            dropped_columns,
            metrics,
        },
    })
}

/// Missing and extra columns versus what the mapping and reshape settings
/// lead us to expect. Both lists come back sorted.
pub fn schema_drift(
    df: &DataFrame,
    mapping: &ColumnMapping,
    reshape: &ReshapeConfig,
) -> (Vec<String>, Vec<String>) {
    let mut expected: Vec<String> = mapping
        .mapped_pairs()
        .iter()
        .map(|(_, field)| (*field).to_string())
        .collect();
    if reshape.unpivot {
        // Value columns collapse into the var/value pair.
        expected.retain(|field| {
            reshape.id_fields.is_empty()
                || reshape
                    .id_fields
                    .iter()
                    .any(|id| id.eq_ignore_ascii_case(field))
        });
        expected.push(reshape.var_field.clone());
        expected.push(reshape.value_field.clone());
    }

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut missing: Vec<String> = expected
        .iter()
        .filter(|field| !names.iter().any(|name| name.eq_ignore_ascii_case(field)))
        .cloned()
        .collect();
    let mut extra: Vec<String> = names
        .iter()
        .filter(|name| {
            !expected.iter().any(|field| field.eq_ignore_ascii_case(name))
                && !name.eq_ignore_ascii_case(SOURCE_SHEET_COLUMN)
                && !name.eq_ignore_ascii_case(crate::combine::SOURCE_FILE_COLUMN)
                && !name.eq_ignore_ascii_case("provider_id")
        })
        .cloned()
        .collect();
    missing.sort();
    extra.sort();
    (missing, extra)
}
