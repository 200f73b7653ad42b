use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};

use crate::error::Result;

pub fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        AnyValue::Null => String::new(),
        _ => value.to_string(),
    }
}

pub fn any_to_string_for_output(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        AnyValue::Float64(value) => format_numeric(value),
        AnyValue::Float32(value) => format_numeric(value as f64),
        AnyValue::Int64(value) => value.to_string(),
        AnyValue::Int32(value) => value.to_string(),
        AnyValue::Boolean(value) => {
            if value {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        value => value.to_string(),
    }
}

pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(series) => any_to_string(series.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// All cell values of a column rendered as strings.
pub fn column_values(df: &DataFrame, name: &str) -> Vec<String> {
    (0..df.height())
        .map(|idx| column_value_string(df, name, idx))
        .collect()
}

/// Fill empty cells of a string column, creating the column if absent.
pub fn fill_string_column(df: &mut DataFrame, name: &str, fill: &str) -> Result<()> {
    if fill.is_empty() {
        return Ok(());
    }
    let mut values = if df.column(name).is_ok() {
        column_values(df, name)
    } else {
        vec![String::new(); df.height()]
    };
    for value in &mut values {
        if value.trim().is_empty() {
            *value = fill.to_string();
        }
    }
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_formatting_drops_trailing_fraction() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(10.5), "10.5");
    }

    #[test]
    fn empty_strings_do_not_parse() {
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64("12.5"), Some(12.5));
    }
}
