pub mod discovery;
pub mod error;
pub mod header;
pub mod reader;

pub use discovery::list_source_files;
pub use error::{HeaderError, IngestError};
pub use header::{
    DATA_NUMERIC_RATIO_MIN, HEADER_SCAN_WINDOW, HEADER_TEXT_RATIO_MIN, HEADER_WIDTH_RATIO_MIN,
    HeaderOptions, HeaderSpec, forward_fill_labels, resolve_headers,
};
pub use reader::read_raw_table;
