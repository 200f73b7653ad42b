//! Multi-key grouping and aggregation.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::warn;

use crate::data_utils::{column_value_string, format_numeric, parse_f64};
use crate::error::Result;

fn resolve_keys(df: &DataFrame, group_keys: &[String]) -> Vec<String> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    group_keys
        .iter()
        .filter_map(|key| {
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(key))
                .cloned()
        })
        .collect()
}

fn is_numeric_column(df: &DataFrame, name: &str) -> bool {
    let mut any_value = false;
    for idx in 0..df.height() {
        let value = column_value_string(df, name, idx);
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if parse_f64(trimmed).is_none() {
            return false;
        }
        any_value = true;
    }
    any_value
}

/// Merge rows sharing identical group-key values.
///
/// Numeric columns are summed; other columns take the first non-empty
/// value in input row order. Groups come out in first-occurrence order, so
/// the result is deterministic for a stable input order. Keys missing from
/// the frame skip aggregation entirely.
pub fn aggregate(df: &DataFrame, group_keys: &[String]) -> Result<DataFrame> {
    let keys = resolve_keys(df, group_keys);
    if keys.is_empty() {
        warn!("aggregation keys not found in columns, skipping aggregation");
        return Ok(df.clone());
    }

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let value_columns: Vec<String> = names
        .iter()
        .filter(|name| !keys.iter().any(|key| key.eq_ignore_ascii_case(name)))
        .cloned()
        .collect();
    let numeric: Vec<bool> = value_columns
        .iter()
        .map(|name| is_numeric_column(df, name))
        .collect();

    struct Group {
        key_values: Vec<String>,
        sums: Vec<Option<f64>>,
        firsts: Vec<String>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for row in 0..df.height() {
        let key_values: Vec<String> = keys
            .iter()
            .map(|key| column_value_string(df, key, row))
            .collect();
        let composite = key_values.join("|");
        let group = groups.entry(composite.clone()).or_insert_with(|| {
            order.push(composite.clone());
            Group {
                key_values,
                sums: vec![None; value_columns.len()],
                firsts: vec![String::new(); value_columns.len()],
            }
        });
        for (pos, name) in value_columns.iter().enumerate() {
            let value = column_value_string(df, name, row);
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if numeric[pos] {
                if let Some(parsed) = parse_f64(trimmed) {
                    group.sums[pos] = Some(group.sums[pos].unwrap_or(0.0) + parsed);
                }
            } else if group.firsts[pos].is_empty() {
                group.firsts[pos] = trimmed.to_string();
            }
        }
    }

    let mut columns = Vec::with_capacity(keys.len() + value_columns.len());
    for (pos, key) in keys.iter().enumerate() {
        let values: Vec<String> = order
            .iter()
            .map(|composite| groups[composite].key_values[pos].clone())
            .collect();
        columns.push(Series::new(key.as_str().into(), values).into());
    }
    for (pos, name) in value_columns.iter().enumerate() {
        let values: Vec<String> = order
            .iter()
            .map(|composite| {
                let group = &groups[composite];
                if numeric[pos] {
                    group.sums[pos].map(format_numeric).unwrap_or_default()
                } else {
                    group.firsts[pos].clone()
                }
            })
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}
