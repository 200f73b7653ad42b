//! Persisted template records: a confirmed mapping plus reshape settings.

use serde::{Deserialize, Serialize};

use crate::mapping::ColumnMapping;

fn default_var_field() -> String {
    "report_date".to_string()
}

fn default_value_field() -> String {
    "sales_amount".to_string()
}

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Structural reshape and cleanup settings applied by the transform engine.
///
/// Cleanup toggles apply in a fixed order: trim, strip thousands
/// separators, drop empty rows, drop sparse columns, dedupe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshapeConfig {
    /// Stack non-identifier columns into (category, value) rows.
    #[serde(default)]
    pub unpivot: bool,
    /// Canonical fields kept per row during unpivot. When empty, every
    /// mapped field acts as an identifier.
    #[serde(default)]
    pub id_fields: Vec<String>,
    /// Column receiving the original column name during unpivot.
    #[serde(default = "default_var_field")]
    pub var_field: String,
    /// Column receiving the stacked cell value during unpivot.
    #[serde(default = "default_value_field")]
    pub value_field: String,
    /// Group keys for aggregation; numeric fields sum, text fields take
    /// the first non-empty value in row order.
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default = "default_true")]
    pub trim_strings: bool,
    #[serde(default)]
    pub strip_thousands: bool,
    #[serde(default)]
    pub drop_empty_rows: bool,
    /// Drop a canonical column when its non-null ratio falls below this.
    #[serde(default)]
    pub drop_sparse_threshold: Option<f64>,
    /// Exact-duplicate keys; first occurrence wins.
    #[serde(default)]
    pub dedupe_on: Vec<String>,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            unpivot: false,
            id_fields: Vec::new(),
            var_field: default_var_field(),
            value_field: default_value_field(),
            group_by: Vec::new(),
            trim_strings: true,
            strip_thousands: false,
            drop_empty_rows: false,
            drop_sparse_threshold: None,
            dedupe_on: Vec::new(),
        }
    }
}

/// A named, replayable mapping for a recurring provider layout.
///
/// Owned by the template store; readers receive a copy, never a shared
/// mutable reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Caller-supplied key, typically the provider name.
    pub provider: String,
    pub mapping: ColumnMapping,
    #[serde(default)]
    pub reshape: ReshapeConfig,
    /// Confirmed header row for this layout, replayed on ingest.
    #[serde(default)]
    pub header_row: Option<usize>,
    /// ISO 8601 timestamp set by the store on save.
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Template {
    pub fn new(provider: impl Into<String>, mapping: ColumnMapping, reshape: ReshapeConfig) -> Self {
        Self {
            provider: provider.into(),
            mapping,
            reshape,
            header_row: None,
            saved_at: None,
            version: default_version(),
        }
    }

    pub fn with_header_row(mut self, header_row: Option<usize>) -> Self {
        self.header_row = header_row;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reshape_defaults_from_empty_json() {
        let reshape: ReshapeConfig = serde_json::from_str("{}").expect("parse defaults");
        assert!(reshape.trim_strings);
        assert!(!reshape.unpivot);
        assert_eq!(reshape.var_field, "report_date");
        assert_eq!(reshape.value_field, "sales_amount");
        assert!(reshape.drop_sparse_threshold.is_none());
    }

    #[test]
    fn template_round_trips() {
        let template = Template::new("acme", ColumnMapping::default(), ReshapeConfig::default());
        let json = serde_json::to_string(&template).expect("serialize");
        let round: Template = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round.provider, "acme");
        assert_eq!(round.version, "1.0");
    }
}
