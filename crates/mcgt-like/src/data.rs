//! Shared CSV ingestion for the tabulated probes.

use std::path::Path;

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::de::DeserializeOwned;

/// Reads every data row of `path` into `T`, skipping `#` comment lines.
///
/// Columns are matched by header name; extra columns are ignored.
pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, McgtError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|err| McgtError::io("dataset-open", path, err))?;
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|err| {
            McgtError::Data(
                ErrorInfo::new("dataset-row", err.to_string())
                    .with_context("path", path.display().to_string())
                    .with_context("row", (index + 1).to_string()),
            )
        })?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(empty(path));
    }
    Ok(rows)
}

pub(crate) fn empty(path: &Path) -> McgtError {
    McgtError::Data(
        ErrorInfo::new("dataset-empty", "dataset has no rows")
            .with_context("path", path.display().to_string()),
    )
}

/// Row-level validation failure naming the offending column.
pub(crate) fn invalid(source: &str, row: usize, column: &str, value: f64) -> McgtError {
    McgtError::Data(
        ErrorInfo::new("dataset-value", "invalid value in dataset")
            .with_context("path", source)
            .with_context("row", row.to_string())
            .with_context("column", column)
            .with_context("value", value.to_string()),
    )
}

/// Checks the invariants shared by every tabulated probe: z > 0, finite value, σ > 0.
pub(crate) fn check_point(
    source: &str,
    row: usize,
    z: f64,
    value: (&str, f64),
    sigma: (&str, f64),
) -> Result<(), McgtError> {
    if !(z.is_finite() && z > 0.0) {
        return Err(invalid(source, row, "z", z));
    }
    if !value.1.is_finite() {
        return Err(invalid(source, row, value.0, value.1));
    }
    if !(sigma.1.is_finite() && sigma.1 > 0.0) {
        return Err(invalid(source, row, sigma.0, sigma.1));
    }
    Ok(())
}
