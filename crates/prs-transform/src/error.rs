use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors from reshape and cleanup operations.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Combined sources did not share an identical canonical column set.
    /// Fatal for the combine operation; nothing is padded silently.
    #[error("schema mismatch between combined sources: {left:?} vs {right:?}")]
    SchemaMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
