//! Pretty JSON persistence shared by checkpoints, manifests and summaries.

use std::fs;
use std::path::Path;

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::SchemaVersion;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn failure(kind: &str, action: &str, path: &Path, err: impl ToString) -> McgtError {
    McgtError::Serde(
        ErrorInfo::new(format!("{kind}-{action}"), err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

/// Writes `value` as pretty JSON, creating parent directories.
///
/// Error codes are `{kind}-mkdir`, `{kind}-serialize` and `{kind}-write`.
pub(crate) fn store_json<T: Serialize>(kind: &str, path: &Path, value: &T) -> Result<(), McgtError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| failure(kind, "mkdir", parent, err))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| failure(kind, "serialize", path, err))?;
    fs::write(path, json).map_err(|err| failure(kind, "write", path, err))
}

/// Reads JSON written by [`store_json`]; codes `{kind}-read` and `{kind}-parse`.
pub(crate) fn load_json<T: DeserializeOwned>(kind: &str, path: &Path) -> Result<T, McgtError> {
    let contents = fs::read_to_string(path).map_err(|err| failure(kind, "read", path, err))?;
    serde_json::from_str(&contents).map_err(|err| failure(kind, "parse", path, err))
}

/// Layout version written into checkpoints and manifests.
pub(crate) const ARTIFACT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Rejects artefacts this build cannot read; code `{kind}-schema`.
pub(crate) fn check_schema(kind: &str, path: &Path, found: &SchemaVersion) -> Result<(), McgtError> {
    if ARTIFACT_SCHEMA.reads(found) {
        return Ok(());
    }
    Err(McgtError::Serde(
        ErrorInfo::new(format!("{kind}-schema"), "unsupported artefact schema")
            .with_context("path", path.display().to_string())
            .with_context(
                "found",
                format!("{}.{}.{}", found.major, found.minor, found.patch),
            )
            .with_context(
                "supported",
                format!("{}.{}.x", ARTIFACT_SCHEMA.major, ARTIFACT_SCHEMA.minor),
            ),
    ))
}
