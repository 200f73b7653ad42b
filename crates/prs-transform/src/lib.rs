pub mod aggregate;
pub mod cleanup;
pub mod combine;
pub mod data_utils;
pub mod engine;
pub mod error;
pub mod frame;
pub mod project;
pub mod unpivot;

pub use aggregate::aggregate;
pub use cleanup::{dedupe, drop_empty_rows, drop_sparse_columns, strip_thousands, trim_strings};
pub use combine::{SOURCE_FILE_COLUMN, SOURCE_SHEET_COLUMN, combine_sheets, combine_tagged};
pub use engine::{ReshapeInput, apply_reshape, schema_drift};
pub use error::{Result, TransformError};
pub use frame::{TransformMeta, TransformMetrics, TransformedTable};
pub use project::{ProjectedSheet, project_sheet};
pub use unpivot::unpivot;
