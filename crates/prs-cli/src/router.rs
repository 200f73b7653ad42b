//! Outcome routing: archive on success, quarantine with an error log on
//! failure.
//!
//! The decision is total and deterministic: a `Valid` result always
//! archives, anything else always quarantines, and the output destination
//! is only written after validation has fully succeeded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{AnyValue, DataFrame};
use tracing::{error, info};

use prs_model::OutcomeRecord;
use prs_transform::TransformMeta;
use prs_transform::data_utils::any_to_string_for_output;
use prs_validate::ValidationResult;

/// Output destinations for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeSinks<'a> {
    pub output_dir: &'a Path,
    pub quarantine_dir: &'a Path,
}

/// Route a validation result to its destination and produce the audit
/// record. Never panics; quarantine-side I/O failures degrade to a record
/// with the reason attached.
pub fn route_outcome(
    source: &Path,
    validation: ValidationResult,
    meta: &TransformMeta,
    sinks: &OutcomeSinks<'_>,
) -> OutcomeRecord {
    let source_name = file_name(source);
    match validation {
        ValidationResult::Valid(table) => match archive(source, &table, meta, sinks) {
            Ok(record) => record,
            Err(err) => {
                error!(source = %source_name, error = %err, "archive failed");
                quarantine_failure(source, &format!("archive failed: {err:#}"), sinks)
            }
        },
        ValidationResult::Invalid(violations) => {
            let record = OutcomeRecord::quarantined(source_name.clone(), violations)
                .with_dropped_columns(meta.dropped_columns.clone());
            if let Err(err) = write_quarantine_artifacts(source, &record, sinks) {
                error!(source = %source_name, error = %err, "quarantine write failed");
            }
            info!(
                source = %source_name,
                violations = record.violations.len(),
                "file quarantined"
            );
            record
        }
    }
}

/// Quarantine a run aborted by a single fatal stage error.
pub fn quarantine_failure(
    source: &Path,
    reason: &str,
    sinks: &OutcomeSinks<'_>,
) -> OutcomeRecord {
    let record = OutcomeRecord::failed(file_name(source), reason);
    if let Err(err) = write_quarantine_artifacts(source, &record, sinks) {
        error!(source = %file_name(source), error = %err, "quarantine write failed");
    }
    info!(source = %file_name(source), reason = %reason, "file quarantined");
    record
}

fn archive(
    source: &Path,
    table: &DataFrame,
    meta: &TransformMeta,
    sinks: &OutcomeSinks<'_>,
) -> Result<OutcomeRecord> {
    std::fs::create_dir_all(sinks.output_dir)
        .with_context(|| format!("create output dir {}", sinks.output_dir.display()))?;
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    let output_path = sinks.output_dir.join(format!("{stem}.csv"));
    let rows = write_csv(table, &output_path)?;

    let report_path = sinks.output_dir.join(format!("{stem}.validation.txt"));
    if let Err(err) = std::fs::write(&report_path, build_report(meta, rows)) {
        error!(path = %report_path.display(), error = %err, "validation report write failed");
    }

    info!(
        source = %file_name(source),
        output = %output_path.display(),
        rows,
        "file archived"
    );
    Ok(
        OutcomeRecord::archived(file_name(source), output_path, rows)
            .with_dropped_columns(meta.dropped_columns.clone()),
    )
}

fn write_quarantine_artifacts(
    source: &Path,
    record: &OutcomeRecord,
    sinks: &OutcomeSinks<'_>,
) -> Result<()> {
    std::fs::create_dir_all(sinks.quarantine_dir)
        .with_context(|| format!("create quarantine dir {}", sinks.quarantine_dir.display()))?;
    // Keep the offending input next to its error log.
    if source.exists() {
        let dest = sinks.quarantine_dir.join(file_name(source));
        std::fs::copy(source, &dest)
            .with_context(|| format!("copy source into {}", dest.display()))?;
    }
    let log_path = sinks
        .quarantine_dir
        .join(format!("{}.error.log", file_name(source)));
    let serialized =
        serde_json::to_string_pretty(record).context("serialize outcome record")?;
    std::fs::write(&log_path, serialized)
        .with_context(|| format!("write error log {}", log_path.display()))?;
    Ok(())
}

fn write_csv(df: &DataFrame, path: &Path) -> Result<usize> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    writer
        .write_record(&names)
        .with_context(|| format!("write header to {}", path.display()))?;
    for idx in 0..df.height() {
        let record: Vec<String> = names
            .iter()
            .map(|name| match df.column(name) {
                Ok(column) => {
                    any_to_string_for_output(column.get(idx).unwrap_or(AnyValue::Null))
                }
                Err(_) => String::new(),
            })
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("write row {idx} to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(df.height())
}

fn build_report(meta: &TransformMeta, rows_written: usize) -> String {
    let metrics = &meta.metrics;
    let mut lines = Vec::new();
    lines.push(format!("Source: {}", meta.source_file));
    lines.push(format!(
        "Rows before/after: {} -> {}",
        metrics.rows_in, rows_written
    ));
    if let Some((before, after)) = metrics.unpivot_rows {
        lines.push(format!("Unpivot rows: {before} -> {after}"));
    }
    if metrics.empty_rows_dropped > 0 {
        lines.push(format!("Empty rows dropped: {}", metrics.empty_rows_dropped));
    }
    if !metrics.sparse_columns_dropped.is_empty() {
        lines.push(format!(
            "Sparse columns dropped: {}",
            metrics.sparse_columns_dropped.join(", ")
        ));
    }
    if metrics.dedupe_dropped > 0 {
        lines.push(format!("Dedupe dropped rows: {}", metrics.dedupe_dropped));
    }
    if !meta.dropped_columns.is_empty() {
        lines.push(format!(
            "Unmapped columns dropped: {}",
            meta.dropped_columns.join(", ")
        ));
    }
    if !meta.sheets.is_empty() {
        lines.push(format!("Sources: {}", meta.sheets.join(", ")));
    }
    lines.join("\n")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string()
}
