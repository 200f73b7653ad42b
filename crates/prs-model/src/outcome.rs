//! Terminal artifacts of a per-file pipeline run.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kinds of contract violations collected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A required canonical column is absent from the table.
    MissingRequiredField,
    /// A required column contains a null/empty cell.
    NullInRequiredField,
    /// A cell failed coercion to the column's declared type.
    TypeMismatch,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "MissingRequiredField",
            ViolationKind::NullInRequiredField => "NullInRequiredField",
            ViolationKind::TypeMismatch => "TypeMismatch",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contract violation, located by column and (where applicable) row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub field: String,
    /// Zero-based data row index; `None` for table-level violations.
    pub row: Option<usize>,
    pub message: String,
}

/// Terminal state of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeState {
    Archived,
    Quarantined,
}

impl fmt::Display for OutcomeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeState::Archived => write!(f, "archived"),
            OutcomeState::Quarantined => write!(f, "quarantined"),
        }
    }
}

/// The audit record produced once per input file; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub source_file: String,
    pub state: OutcomeState,
    /// Where the standardized output landed; `None` when quarantined.
    pub output_path: Option<PathBuf>,
    /// The full violation list; empty for archived files.
    #[serde(default)]
    pub violations: Vec<Violation>,
    /// Raw headers the mapping dropped, kept for the audit trail.
    #[serde(default)]
    pub dropped_columns: Vec<String>,
    #[serde(default)]
    pub rows_written: usize,
    /// The single fatal error for stage-aborted runs (header resolution,
    /// combine mismatch); `None` when validation violations tell the story.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl OutcomeRecord {
    pub fn archived(
        source_file: impl Into<String>,
        output_path: PathBuf,
        rows_written: usize,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            state: OutcomeState::Archived,
            output_path: Some(output_path),
            violations: Vec::new(),
            dropped_columns: Vec::new(),
            rows_written,
            failure_reason: None,
        }
    }

    pub fn quarantined(source_file: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            source_file: source_file.into(),
            state: OutcomeState::Quarantined,
            output_path: None,
            violations,
            dropped_columns: Vec::new(),
            rows_written: 0,
            failure_reason: None,
        }
    }

    /// Quarantine outcome for a run aborted by a single fatal stage error.
    pub fn failed(source_file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            state: OutcomeState::Quarantined,
            output_path: None,
            violations: Vec::new(),
            dropped_columns: Vec::new(),
            rows_written: 0,
            failure_reason: Some(reason.into()),
        }
    }

    pub fn with_dropped_columns(mut self, dropped: Vec<String>) -> Self {
        self.dropped_columns = dropped;
        self
    }

    pub fn is_archived(&self) -> bool {
        self.state == OutcomeState::Archived
    }
}
