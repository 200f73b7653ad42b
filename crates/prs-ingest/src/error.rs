use std::path::PathBuf;

use thiserror::Error;

/// Errors from file discovery at the ingestion boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors from header resolution. Fatal for the affected file; the caller
/// decides whether to prompt for an explicit offset or quarantine.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("no plausible header row found in the first {scanned} rows")]
    NoHeaderRow { scanned: usize },
    #[error("header row {row} is out of range for a sheet with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },
}

pub type Result<T> = std::result::Result<T, IngestError>;
