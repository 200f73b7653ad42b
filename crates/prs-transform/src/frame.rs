use polars::prelude::DataFrame;

/// Counters describing what the reshape pipeline did to one file.
#[derive(Debug, Clone, Default)]
pub struct TransformMetrics {
    pub rows_in: usize,
    pub rows_out: usize,
    /// (rows before, rows after) when unpivot ran.
    pub unpivot_rows: Option<(usize, usize)>,
    pub empty_rows_dropped: usize,
    pub sparse_columns_dropped: Vec<String>,
    pub dedupe_dropped: usize,
}

/// Provenance and audit metadata for a transformed table.
#[derive(Debug, Clone, Default)]
pub struct TransformMeta {
    pub source_file: String,
    /// Sheet identities that contributed rows.
    pub sheets: Vec<String>,
    /// Raw headers the mapping dropped; recorded, never silently lost.
    pub dropped_columns: Vec<String>,
    pub metrics: TransformMetrics,
}

/// A canonical-column table plus the metadata describing how it was made.
///
/// Produced by the transform engine, consumed by the contract validator.
#[derive(Debug, Clone)]
pub struct TransformedTable {
    pub data: DataFrame,
    pub meta: TransformMeta,
}

impl TransformedTable {
    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}
