//! Source file discovery for batch processing.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

const SOURCE_SUFFIXES: [&str; 1] = ["csv"];

/// Lists processable source files in a directory, sorted by filename.
pub fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SOURCE_SUFFIXES
                    .iter()
                    .any(|suffix| ext.eq_ignore_ascii_case(suffix))
            });
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
