//! Per-file processing pipeline with explicit stages.
//!
//! The stages run in order for every file:
//! 1. **Ingest**: read the raw sheet
//! 2. **Resolve**: locate the header row and labels
//! 3. **Map**: template replay, synonyms, similarity
//! 4. **Transform**: projection, combine, unpivot, cleanup
//! 5. **Validate**: contract checks, exhaustive
//! 6. **Route**: archive or quarantine with an audit record
//!
//! A fatal stage error aborts that file's run and routes it to quarantine
//! with the causing error recorded; nothing propagates to the batch
//! runner, so one bad file never aborts a batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use prs_ingest::{HeaderOptions, list_source_files, read_raw_table, resolve_headers};
use prs_map::{MappingEngine, SynonymBook};
use prs_model::{OutcomeRecord, ReshapeConfig, SchemaContract, Template};
use prs_transform::{
    ProjectedSheet, ReshapeInput, SOURCE_FILE_COLUMN, apply_reshape, combine_tagged,
    project_sheet, schema_drift,
};
use prs_validate::Validator;

use crate::router::{OutcomeSinks, quarantine_failure, route_outcome};
use crate::types::BatchResult;

/// Everything a pipeline run needs besides the input file itself.
pub struct FilePipeline<'a> {
    pub contract: &'a SchemaContract,
    pub synonyms: &'a SynonymBook,
    /// Prior template replayed by the mapping stage.
    pub template: Option<&'a Template>,
    /// Resolved reshape settings (template plus CLI overrides).
    pub reshape: ReshapeConfig,
    pub provider: Option<String>,
    /// Explicit header row; falls back to the template's confirmed row.
    pub header_row: Option<usize>,
    pub sinks: OutcomeSinks<'a>,
}

impl FilePipeline<'_> {
    fn header_options(&self) -> HeaderOptions {
        HeaderOptions {
            header_row: self
                .header_row
                .or_else(|| self.template.and_then(|template| template.header_row)),
            scan_window: None,
        }
    }
}

/// Run one file through the full pipeline. Always returns an outcome
/// record; failures quarantine instead of propagating.
pub fn process_file(path: &Path, pipeline: &FilePipeline<'_>) -> OutcomeRecord {
    let span = info_span!("process_file", source_file = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let record = match run_stages(path, pipeline) {
        Ok(record) => record,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "pipeline run aborted");
            quarantine_failure(path, &format!("{error:#}"), &pipeline.sinks)
        }
    };
    info!(
        state = %record.state,
        rows_written = record.rows_written,
        duration_ms = start.elapsed().as_millis(),
        "pipeline finished"
    );
    record
}

fn run_stages(path: &Path, pipeline: &FilePipeline<'_>) -> Result<OutcomeRecord> {
    let raw = read_raw_table(path)?;
    let spec = resolve_headers(&raw, &pipeline.header_options())
        .with_context(|| format!("resolve headers for {}", path.display()))?;
    debug!(
        header_rows = ?spec.header_rows,
        columns = spec.labels.len(),
        "headers resolved"
    );

    let engine = MappingEngine::new(pipeline.contract, pipeline.synonyms.clone());
    let mapping = info_span!("map").in_scope(|| engine.suggest(&spec.labels, pipeline.template));
    if !mapping.collisions.is_empty() {
        warn!(
            collisions = ?mapping.collisions,
            "headers left unmapped pending manual resolution"
        );
    }
    debug!(
        mapped = mapping.mapped_count(),
        unmapped = mapping.unmapped_headers().len(),
        "columns mapped"
    );

    let transformed = info_span!("transform").in_scope(|| -> Result<_> {
        let sheet = project_sheet(&raw, &spec, &mapping, pipeline.reshape.unpivot)?;
        let transformed = apply_reshape(ReshapeInput {
            sheets: vec![sheet],
            source_file: raw.source_file.clone(),
            mapping: &mapping,
            reshape: &pipeline.reshape,
            provider: pipeline.provider.as_deref(),
        })?;
        Ok(transformed)
    })?;

    let (missing, extra) = schema_drift(&transformed.data, &mapping, &pipeline.reshape);
    if !missing.is_empty() {
        warn!(missing = ?missing, "columns missing versus expectations");
    }
    if !extra.is_empty() {
        warn!(extra = ?extra, "unexpected extra columns");
    }

    let validation = info_span!("validate")
        .in_scope(|| Validator::new(pipeline.contract).validate(&transformed.data));
    Ok(route_outcome(
        path,
        validation,
        &transformed.meta,
        &pipeline.sinks,
    ))
}

/// Process every source file in a directory as independent pipeline runs.
pub fn process_batch(dir: &Path, pipeline: &FilePipeline<'_>) -> Result<BatchResult> {
    let files = list_source_files(dir)?;
    if files.is_empty() {
        bail!("no source files found in {}", dir.display());
    }
    info!(files = files.len(), directory = %dir.display(), "batch started");
    let outcomes: Vec<OutcomeRecord> = files
        .iter()
        .map(|file| process_file(file, pipeline))
        .collect();
    Ok(BatchResult {
        output_dir: pipeline.sinks.output_dir.to_path_buf(),
        quarantine_dir: pipeline.sinks.quarantine_dir.to_path_buf(),
        outcomes,
    })
}

/// Combine several files through one mapping into a single output with a
/// `source` column. The combined table validates and routes as one unit.
pub fn process_combined(
    files: &[PathBuf],
    output_name: &str,
    pipeline: &FilePipeline<'_>,
) -> OutcomeRecord {
    let span = info_span!("process_combined", output_name = %output_name);
    let _guard = span.enter();
    let synthetic = PathBuf::from(format!("{output_name}.csv"));

    match combine_stages(files, output_name, pipeline) {
        Ok(record) => record,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "combine run aborted");
            quarantine_failure(&synthetic, &format!("{error:#}"), &pipeline.sinks)
        }
    }
}

fn combine_stages(
    files: &[PathBuf],
    output_name: &str,
    pipeline: &FilePipeline<'_>,
) -> Result<OutcomeRecord> {
    let engine = MappingEngine::new(pipeline.contract, pipeline.synonyms.clone());
    let mut tagged: Vec<(String, DataFrame)> = Vec::new();
    let mut dropped_columns: Vec<String> = Vec::new();
    let mut last_mapping = None;

    for path in files {
        let raw = read_raw_table(path)?;
        let spec = resolve_headers(&raw, &pipeline.header_options())
            .with_context(|| format!("resolve headers for {}", path.display()))?;
        let mapping = engine.suggest(&spec.labels, pipeline.template);
        let sheet = project_sheet(&raw, &spec, &mapping, pipeline.reshape.unpivot)?;
        for column in &sheet.dropped_columns {
            if !dropped_columns.contains(column) {
                dropped_columns.push(column.clone());
            }
        }
        tagged.push((raw.sheet_id.clone(), sheet.data));
        last_mapping = Some(mapping);
    }
    let Some(mapping) = last_mapping else {
        bail!("no input files to combine");
    };

    let combined = combine_tagged(&tagged, SOURCE_FILE_COLUMN)?;
    let sheet = ProjectedSheet {
        sheet_id: output_name.to_string(),
        data: combined,
        dropped_columns,
    };
    let transformed = apply_reshape(ReshapeInput {
        sheets: vec![sheet],
        source_file: format!("{output_name}.csv"),
        mapping: &mapping,
        reshape: &pipeline.reshape,
        provider: pipeline.provider.as_deref(),
    })?;

    let validation = Validator::new(pipeline.contract).validate(&transformed.data);
    let synthetic = PathBuf::from(format!("{output_name}.csv"));
    Ok(route_outcome(
        &synthetic,
        validation,
        &transformed.meta,
        &pipeline.sinks,
    ))
}
