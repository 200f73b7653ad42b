//! Wide-to-long reshaping.

use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::data_utils::column_value_string;
use crate::error::Result;

/// Stack every non-identifier column into (category, value) rows.
///
/// Identifier values repeat on each produced row; the category column
/// receives the original column name and the value column the cell. Row
/// count multiplies by the number of stacked columns. With nothing to
/// stack the frame passes through unchanged.
pub fn unpivot(
    df: &DataFrame,
    id_columns: &[String],
    var_field: &str,
    value_field: &str,
) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let ids: Vec<String> = names
        .iter()
        .filter(|name| {
            id_columns
                .iter()
                .any(|id| id.eq_ignore_ascii_case(name))
        })
        .cloned()
        .collect();
    let value_cols: Vec<String> = names
        .iter()
        .filter(|name| !ids.iter().any(|id| id.eq_ignore_ascii_case(name)))
        .cloned()
        .collect();
    if value_cols.is_empty() {
        return Ok(df.clone());
    }

    let height = df.height();
    let out_len = height * value_cols.len();
    let mut id_values: Vec<Vec<String>> = ids.iter().map(|_| Vec::with_capacity(out_len)).collect();
    let mut categories = Vec::with_capacity(out_len);
    let mut values = Vec::with_capacity(out_len);

    for row in 0..height {
        for value_col in &value_cols {
            for (pos, id) in ids.iter().enumerate() {
                id_values[pos].push(column_value_string(df, id, row));
            }
            categories.push(value_col.clone());
            values.push(column_value_string(df, value_col, row));
        }
    }

    let mut columns = Vec::with_capacity(ids.len() + 2);
    for (pos, id) in ids.iter().enumerate() {
        let vals = std::mem::take(&mut id_values[pos]);
        columns.push(Series::new(id.as_str().into(), vals).into());
    }
    columns.push(Series::new(var_field.into(), categories).into());
    columns.push(Series::new(value_field.into(), values).into());
    Ok(DataFrame::new(columns)?)
}
