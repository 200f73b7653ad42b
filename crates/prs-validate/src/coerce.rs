//! Cell coercion to the contract's declared types.

use chrono::NaiveDate;

use prs_model::{month_number, normalize_month};

/// Parse a numeric cell; empty strings are not numbers.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parse a boolean cell from the spellings providers actually use.
pub fn parse_boolean(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y"];

fn is_year(token: &str) -> bool {
    token.len() == 4
        && token.chars().all(|ch| ch.is_ascii_digit())
        && token
            .parse::<u32>()
            .is_ok_and(|year| (1900..=2100).contains(&year))
}

/// Year-month without a day, e.g. "2020-03".
fn parse_year_month(value: &str) -> Option<String> {
    let (year, month) = value.split_once('-')?;
    if !is_year(year) || month.len() != 2 {
        return None;
    }
    let month_num = month.parse::<u32>().ok()?;
    if !(1..=12).contains(&month_num) {
        return None;
    }
    Some(format!("{year}-{month_num:02}"))
}

/// Period labels produced by two-row header combination, e.g. "2020_Jan",
/// "2020 Tammikuu", "Jan-2020".
fn parse_period(value: &str) -> Option<String> {
    let tokens: Vec<&str> = value
        .split(['_', '-', ' ', '/'])
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return None;
    }
    let year = tokens.iter().find(|token| is_year(token))?;
    let month = tokens
        .iter()
        .filter(|token| !is_year(token))
        .find_map(|token| normalize_month(token))?;
    let month_num = month_number(month)?;
    Some(format!("{year}-{month_num:02}"))
}

/// Coerce a date cell to an ISO 8601 string, preserving partial precision
/// (a bare year or year-month stays that way). Returns `None` when the
/// value does not read as a date.
pub fn parse_date_iso(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    if let Some(year_month) = parse_year_month(trimmed) {
        return Some(year_month);
    }
    if let Some(period) = parse_period(trimmed) {
        return Some(period);
    }
    if is_year(trimmed) {
        return Some(trimmed.to_string());
    }
    None
}
