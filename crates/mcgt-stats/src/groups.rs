//! Grouped samples read from a headed CSV table.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

/// Values sharing one group label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Label from the group column.
    pub label: String,
    /// Finite values in file order.
    pub values: Vec<f64>,
}

impl Group {
    /// Convenience constructor.
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, McgtError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        McgtError::Data(
            ErrorInfo::new("missing-column", "column not present in header")
                .with_context("path", path.display().to_string())
                .with_context("column", name)
                .with_hint(format!("available: {}", headers.iter().collect::<Vec<_>>().join(","))),
        )
    })
}

/// Reads `value_column` grouped by `group_column`; without a group column every row
/// belongs to a single group named `all`. Groups keep first-appearance order.
pub fn load_groups(
    path: &Path,
    value_column: &str,
    group_column: Option<&str>,
) -> Result<Vec<Group>, McgtError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|err| McgtError::io("dataset-open", path, err))?;
    let headers = reader
        .headers()
        .map_err(|err| McgtError::io("dataset-open", path, err))?
        .clone();
    let value_index = column_index(&headers, value_column, path)?;
    let group_index = group_column
        .map(|name| column_index(&headers, name, path))
        .transpose()?;

    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|err| {
            McgtError::Data(
                ErrorInfo::new("dataset-row", err.to_string())
                    .with_context("path", path.display().to_string())
                    .with_context("row", (row + 1).to_string()),
            )
        })?;
        let raw = record.get(value_index).unwrap_or("");
        let value: f64 = raw.parse().map_err(|_| {
            McgtError::Data(
                ErrorInfo::new("dataset-value", "value is not a number")
                    .with_context("path", path.display().to_string())
                    .with_context("row", (row + 1).to_string())
                    .with_context("value", raw),
            )
        })?;
        // Non-finite rows are dropped rather than poisoning the percentiles.
        if !value.is_finite() {
            continue;
        }
        let label = match group_index {
            Some(index) => record.get(index).unwrap_or("").to_string(),
            None => "all".to_string(),
        };
        groups.entry(label).or_default().push(value);
    }
    if groups.is_empty() {
        return Err(McgtError::Data(
            ErrorInfo::new("dataset-empty", "no finite values found")
                .with_context("path", path.display().to_string()),
        ));
    }
    Ok(groups
        .into_iter()
        .map(|(label, values)| Group { label, values })
        .collect())
}
