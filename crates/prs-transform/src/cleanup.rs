//! Cell-level cleanup operations.
//!
//! Each operation is a pure function returning a new frame; the engine
//! applies the toggled ones in a fixed order: trim, strip thousands
//! separators, drop empty rows, drop sparse columns, dedupe.

use std::collections::BTreeSet;

use polars::prelude::{BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};
use tracing::warn;

use crate::data_utils::{column_value_string, column_values};
use crate::error::Result;

/// Characters removed from numeric-looking cells by [`strip_thousands`].
pub const THOUSANDS_SEPARATORS: [char; 3] = [',', ' ', '\u{a0}'];

fn rebuild_cells(df: &DataFrame, transform: impl Fn(&str) -> String) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        let values: Vec<String> = column_values(df, name)
            .iter()
            .map(|value| transform(value))
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Strip leading and trailing whitespace from every cell.
pub fn trim_strings(df: &DataFrame) -> Result<DataFrame> {
    rebuild_cells(df, |value| value.trim().to_string())
}

fn looks_like_separated_number(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    let mut has_digit = false;
    let mut has_separator = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
        } else if THOUSANDS_SEPARATORS.contains(&ch) {
            has_separator = true;
        } else if !matches!(ch, '.' | '+' | '-') {
            return false;
        }
    }
    has_digit && has_separator
}

/// Remove thousands-separator characters from numeric-looking cells, so a
/// later type coercion sees "1234567" instead of "1,234,567".
pub fn strip_thousands(df: &DataFrame) -> Result<DataFrame> {
    rebuild_cells(df, |value| {
        if looks_like_separated_number(value) {
            value
                .trim()
                .chars()
                .filter(|ch| !THOUSANDS_SEPARATORS.contains(ch))
                .collect()
        } else {
            value.to_string()
        }
    })
}

/// Remove rows where every cell is empty. Returns the new frame and the
/// number of rows dropped.
pub fn drop_empty_rows(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let height = df.height();
    let mut keep = Vec::with_capacity(height);
    for idx in 0..height {
        let non_empty = names
            .iter()
            .any(|name| !column_value_string(df, name, idx).trim().is_empty());
        keep.push(non_empty);
    }
    let dropped = keep.iter().filter(|flag| !**flag).count();
    if dropped == 0 {
        return Ok((df.clone(), 0));
    }
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok((df.filter(&mask)?, dropped))
}

/// Remove columns whose non-null ratio falls below `threshold`. Returns
/// the new frame and the dropped column names.
pub fn drop_sparse_columns(df: &DataFrame, threshold: f64) -> Result<(DataFrame, Vec<String>)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let height = df.height();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for name in &names {
        let non_empty = (0..height)
            .filter(|idx| !column_value_string(df, name, *idx).trim().is_empty())
            .count();
        let ratio = if height == 0 {
            0.0
        } else {
            non_empty as f64 / height as f64
        };
        if ratio >= threshold {
            kept.push(name.clone());
        } else {
            dropped.push(name.clone());
        }
    }
    if dropped.is_empty() {
        return Ok((df.clone(), dropped));
    }
    let mut columns = Vec::with_capacity(kept.len());
    for name in &kept {
        columns.push(df.column(name)?.clone());
    }
    Ok((DataFrame::new(columns)?, dropped))
}

/// Remove rows duplicating an earlier row on the key columns, keeping the
/// first occurrence. Rows with entirely empty keys are kept. Idempotent:
/// deduping an already-deduped frame changes nothing.
pub fn dedupe(df: &DataFrame, keys: &[String]) -> Result<(DataFrame, usize)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let key_columns: Vec<String> = keys
        .iter()
        .filter_map(|key| {
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(key))
                .cloned()
        })
        .collect();
    if key_columns.is_empty() {
        warn!("dedupe keys not found in columns, skipping dedupe");
        return Ok((df.clone(), 0));
    }

    let mut seen = BTreeSet::new();
    let height = df.height();
    let mut keep = Vec::with_capacity(height);
    for idx in 0..height {
        let mut composite = String::new();
        for (pos, name) in key_columns.iter().enumerate() {
            if pos > 0 {
                composite.push('|');
            }
            composite.push_str(column_value_string(df, name, idx).trim());
        }
        if composite.trim_matches('|').is_empty() {
            keep.push(true);
            continue;
        }
        keep.push(seen.insert(composite));
    }
    let dropped = keep.iter().filter(|flag| !**flag).count();
    if dropped == 0 {
        return Ok((df.clone(), 0));
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    Ok((df.filter(&mask)?, dropped))
}
