/// An untyped sheet as delivered by an ingestion boundary.
///
/// Rows are kept exactly as read (including banner rows above the real
/// header); header resolution works on this value and never mutates it.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Identity of the file this sheet came from.
    pub source_file: String,
    /// Sheet identity within the file (a CSV file has a single sheet).
    pub sheet_id: String,
    /// Cell values, row-major, untyped.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(
        source_file: impl Into<String>,
        sheet_id: impl Into<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            sheet_id: sheet_id.into(),
            rows,
        }
    }

    /// The widest row length, used to size header scans.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
