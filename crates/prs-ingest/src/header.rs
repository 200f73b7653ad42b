//! Header resolution for raw provider sheets.
//!
//! Provider exports rarely start with a clean header row: banner rows,
//! merged group cells spanning sub-columns, and two-row year/month headers
//! all occur. The resolver scans a bounded window of leading rows, picks
//! the most plausible header row, and combines a second header row when a
//! two-row pattern is present.

use prs_model::{RawTable, normalize_month};
use tracing::debug;

use crate::error::HeaderError;

/// How many leading rows are scanned for a plausible header.
pub const HEADER_SCAN_WINDOW: usize = 10;
/// Minimum fraction of non-numeric strings among a header row's non-empty cells.
pub const HEADER_TEXT_RATIO_MIN: f64 = 0.8;
/// Minimum fraction of the sheet width a header row must populate.
pub const HEADER_WIDTH_RATIO_MIN: f64 = 0.5;
/// Minimum numeric fraction for the row below to read as data.
pub const DATA_NUMERIC_RATIO_MIN: f64 = 0.2;
/// Longest cell still plausible as a spanning group label.
const GROUP_LABEL_MAX_LEN: usize = 12;

/// Resolved header location and labels for one sheet.
///
/// Derived from a [`RawTable`]; never mutated in place. Re-running the
/// resolver produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    /// Row indices that contributed labels (one, or two for combined headers).
    pub header_rows: Vec<usize>,
    /// Final column labels, duplicates disambiguated, empties named.
    pub labels: Vec<String>,
    /// Index of the first data row.
    pub data_start: usize,
}

/// Caller hints for header resolution.
#[derive(Debug, Clone, Default)]
pub struct HeaderOptions {
    /// Use exactly this row as the header, bypassing the heuristic scan.
    pub header_row: Option<usize>,
    /// Override the default scan window.
    pub scan_window: Option<usize>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RowStats {
    width: usize,
    non_empty: usize,
    numeric: usize,
}

impl RowStats {
    fn width_ratio(self) -> f64 {
        if self.width == 0 {
            0.0
        } else {
            self.non_empty as f64 / self.width as f64
        }
    }

    fn numeric_ratio(self) -> f64 {
        if self.non_empty == 0 {
            0.0
        } else {
            self.numeric as f64 / self.non_empty as f64
        }
    }

    fn text_ratio(self) -> f64 {
        if self.non_empty == 0 {
            0.0
        } else {
            (self.non_empty - self.numeric) as f64 / self.non_empty as f64
        }
    }
}

fn row_stats(row: &[String], width: usize) -> RowStats {
    let mut stats = RowStats {
        width,
        ..RowStats::default()
    };
    for cell in row {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            continue;
        }
        stats.non_empty += 1;
        if trimmed.parse::<f64>().is_ok() {
            stats.numeric += 1;
        }
    }
    stats
}

fn is_header_like(stats: RowStats) -> bool {
    stats.non_empty > 0
        && stats.text_ratio() > HEADER_TEXT_RATIO_MIN
        && stats.width_ratio() > HEADER_WIDTH_RATIO_MIN
}

fn is_data_like(stats: RowStats) -> bool {
    stats.numeric_ratio() >= DATA_NUMERIC_RATIO_MIN
}

fn is_year_like(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.len() == 4
        && trimmed.chars().all(|ch| ch.is_ascii_digit())
        && trimmed
            .parse::<u32>()
            .is_ok_and(|year| (1900..=2100).contains(&year))
}

/// A row above the header reads as a spanning group row (year row, quarter
/// row) when it is sparser than the header and its labels are short.
/// A single short non-year label reads as a banner, not a group row.
fn is_group_row(row: &[String], header_non_empty: usize) -> bool {
    let cells: Vec<&str> = row
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect();
    if cells.is_empty() || cells.len() >= header_non_empty {
        return false;
    }
    let all_group_shaped = cells.iter().all(|cell| {
        is_year_like(cell) || (cell.len() <= GROUP_LABEL_MAX_LEN && !cell.contains(' '))
    });
    if !all_group_shaped {
        return false;
    }
    cells.len() >= 2 || cells.iter().any(|cell| is_year_like(cell))
}

/// Forward-fill empty labels from the nearest preceding non-empty label.
///
/// Idempotent: running it on an already-filled sequence changes nothing
/// (leading empties stay empty and are named later).
pub fn forward_fill_labels(labels: &[String]) -> Vec<String> {
    let mut filled = Vec::with_capacity(labels.len());
    let mut last: Option<String> = None;
    for label in labels {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            filled.push(last.clone().unwrap_or_default());
        } else {
            last = Some(trimmed.to_string());
            filled.push(trimmed.to_string());
        }
    }
    filled
}

fn pad_row(row: &[String], width: usize) -> Vec<String> {
    let mut padded: Vec<String> = row.to_vec();
    padded.resize(width, String::new());
    padded
}

fn title_case(abbrev: &str) -> String {
    let mut chars = abbrev.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Combine a forward-filled top row with the row carrying the sub-labels.
/// Year + month pairs normalize the month through the locale table first.
fn combine_rows(top: &[String], bottom: &[String]) -> Vec<String> {
    top.iter()
        .zip(bottom.iter())
        .map(|(t, b)| {
            let t = t.trim();
            let b = b.trim();
            if b.is_empty() {
                t.to_string()
            } else if t.is_empty() {
                b.to_string()
            } else if is_year_like(t)
                && let Some(month) = normalize_month(b)
            {
                format!("{t}_{}", title_case(month))
            } else {
                format!("{t}_{b}")
            }
        })
        .collect()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Final label pass: collapse whitespace, name empty columns positionally,
/// disambiguate duplicates with a positional suffix.
fn finalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    labels
        .into_iter()
        .enumerate()
        .map(|(idx, label)| {
            let mut name = collapse_whitespace(&label);
            if name.is_empty() {
                name = format!("column_{}", idx + 1);
            }
            if !seen.insert(name.to_lowercase()) {
                name = format!("{}_{}", name, idx + 1);
                seen.insert(name.to_lowercase());
            }
            name
        })
        .collect()
}

/// Resolve the header location and labels for a raw sheet.
///
/// An explicit `header_row` hint is honored exactly, regardless of what
/// the heuristics would score; labels then come from that row alone.
pub fn resolve_headers(table: &RawTable, options: &HeaderOptions) -> Result<HeaderSpec, HeaderError> {
    let width = table.width();

    if let Some(row) = options.header_row {
        if row >= table.rows.len() {
            return Err(HeaderError::RowOutOfRange {
                row,
                rows: table.rows.len(),
            });
        }
        let labels = finalize_labels(pad_row(&table.rows[row], width));
        return Ok(HeaderSpec {
            header_rows: vec![row],
            labels,
            data_start: row + 1,
        });
    }

    let scan = options
        .scan_window
        .unwrap_or(HEADER_SCAN_WINDOW)
        .min(table.rows.len());
    let stats: Vec<RowStats> = table.rows[..scan]
        .iter()
        .map(|row| row_stats(row, width))
        .collect();

    let mut header_idx = None;
    for idx in 0..scan {
        if !is_header_like(stats[idx]) {
            continue;
        }
        let next_ok = match table.rows.get(idx + 1) {
            Some(next_row) => {
                let next = row_stats(next_row, width);
                next.non_empty == 0 || is_data_like(next) || is_header_like(next)
            }
            None => true,
        };
        if next_ok {
            header_idx = Some(idx);
            break;
        }
    }
    let Some(header_idx) = header_idx else {
        return Err(HeaderError::NoHeaderRow { scanned: scan });
    };

    let header_row = pad_row(&table.rows[header_idx], width);

    // Two-row pattern below: a merged group row selected as the header,
    // with the sub-labels on the next row.
    if let Some(below_row) = table.rows.get(header_idx + 1) {
        let below = row_stats(below_row, width);
        if is_header_like(below) && stats[header_idx].non_empty < below.non_empty {
            let top = forward_fill_labels(&header_row);
            let labels = finalize_labels(combine_rows(&top, &pad_row(below_row, width)));
            debug!(
                header_row = header_idx,
                sub_row = header_idx + 1,
                "combined two-row header (merged group row)"
            );
            return Ok(HeaderSpec {
                header_rows: vec![header_idx, header_idx + 1],
                labels,
                data_start: header_idx + 2,
            });
        }
    }

    // Two-row pattern above: a sparse year/group row over the label row.
    if header_idx > 0 {
        let above_row = pad_row(&table.rows[header_idx - 1], width);
        if is_group_row(&above_row, stats[header_idx].non_empty) {
            let top = forward_fill_labels(&above_row);
            let labels = finalize_labels(combine_rows(&top, &header_row));
            debug!(
                group_row = header_idx - 1,
                header_row = header_idx,
                "combined two-row header (group row above)"
            );
            return Ok(HeaderSpec {
                header_rows: vec![header_idx - 1, header_idx],
                labels,
                data_start: header_idx + 1,
            });
        }
    }

    Ok(HeaderSpec {
        header_rows: vec![header_idx],
        labels: finalize_labels(header_row),
        data_start: header_idx + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_like_accepts_plausible_years_only() {
        assert!(is_year_like("2020"));
        assert!(is_year_like(" 1999 "));
        assert!(!is_year_like("20"));
        assert!(!is_year_like("2500"));
        assert!(!is_year_like("20a0"));
    }

    #[test]
    fn forward_fill_is_idempotent() {
        let labels = vec![
            "2020".to_string(),
            String::new(),
            String::new(),
            "2021".to_string(),
            String::new(),
        ];
        let once = forward_fill_labels(&labels);
        assert_eq!(once, vec!["2020", "2020", "2020", "2021", "2021"]);
        assert_eq!(forward_fill_labels(&once), once);
    }

    #[test]
    fn finalize_disambiguates_and_names() {
        let labels = vec![
            "Amount".to_string(),
            "Amount".to_string(),
            String::new(),
            "  Net   Sales ".to_string(),
        ];
        assert_eq!(
            finalize_labels(labels),
            vec!["Amount", "Amount_2", "column_3", "Net Sales"]
        );
    }
}
