//! Newline-delimited JSON extraction.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use logweld_core::Record;

use crate::EtlError;

/// Reads one record per line from an NDJSON file.
///
/// Blank lines are skipped. A missing file or a malformed line is fatal —
/// bad input should abort the run before any processing starts, not produce
/// a silently truncated dataset.
///
/// # Errors
///
/// - [`EtlError::Io`] if the file cannot be opened or read.
/// - [`EtlError::MalformedLine`] if any line is not a JSON object.
pub fn read_ndjson(path: &Path) -> Result<Vec<Record>, EtlError> {
    let file = File::open(path).map_err(|e| EtlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| EtlError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record: Record =
            serde_json::from_str(trimmed).map_err(|e| EtlError::MalformedLine {
                path: path.display().to_string(),
                line: index + 1,
                source: e,
            })?;
        records.push(record);
    }

    tracing::debug!(path = %path.display(), records = records.len(), "extracted NDJSON input");
    Ok(records)
}
