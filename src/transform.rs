use crate::error::{IngestError, Result};
use crate::flatten::flatten;
use crate::types::{FlatRow, Vulnerability};
use tracing::info;

/// Flattens every fetched record in arrival order and concatenates the rows.
/// An empty result from non-empty input signals a systemic flattening problem
/// rather than a legitimately empty feed and is surfaced as an error.
pub fn transform(records: &[Vulnerability]) -> Result<Vec<FlatRow>> {
    let mut rows = Vec::new();
    for record in records {
        rows.extend(flatten(record));
    }

    if rows.is_empty() && !records.is_empty() {
        return Err(IngestError::EmptyResult {
            records: records.len(),
        });
    }

    info!(
        "Flattened {} records into {} rows",
        records.len(),
        rows.len()
    );
    Ok(rows)
}
