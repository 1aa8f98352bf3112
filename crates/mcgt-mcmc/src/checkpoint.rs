use std::path::{Path, PathBuf};

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::config::RunConfig;
use crate::io::{check_schema, load_json, store_json};
use crate::kernel::{BestPoint, SamplerState};

/// Everything needed to continue a run exactly where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// Layout version of the file.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// First step still to be executed.
    pub next_step: usize,
    /// Configuration snapshot associated with the run.
    pub config: RunConfig,
    /// Master seed used to derive per-step substreams.
    pub master_seed: u64,
    /// Sampler state after `next_step` steps.
    pub state: SamplerState,
    /// Samples recorded so far.
    pub chain: Chain,
    /// Highest-density point visited so far.
    pub best: Option<BestPoint>,
}

impl CheckpointPayload {
    /// Reads a checkpoint, rejecting files from an incompatible schema.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let payload: Self = load_json("checkpoint", path)?;
        check_schema("checkpoint", path, &payload.schema)?;
        Ok(payload)
    }

    /// Pretty JSON at `path`.
    pub fn store(&self, path: &Path) -> Result<(), McgtError> {
        store_json("checkpoint", path, self)
    }
}

/// Checkpoint file written after `step` completed steps.
pub fn checkpoint_path(root: &Path, step: usize) -> PathBuf {
    root.join(format!("ckpt_{step:05}.json"))
}

/// Checkpoints already in `root` written after at most `up_to` steps, oldest first.
///
/// A missing directory yields an empty list. Files not named like
/// [`checkpoint_path`] output are ignored.
pub fn existing_checkpoints(root: &Path, up_to: usize) -> Result<Vec<PathBuf>, McgtError> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(McgtError::Serde(
                ErrorInfo::new("checkpoint-list", err.to_string())
                    .with_context("path", root.display().to_string()),
            ))
        }
    };
    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| {
                McgtError::Serde(
                    ErrorInfo::new("checkpoint-list", err.to_string())
                        .with_context("path", root.display().to_string()),
                )
            })?
            .path();
        let step = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix("ckpt_"))
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|digits| digits.parse::<usize>().ok());
        if let Some(step) = step.filter(|&step| step <= up_to) {
            found.push((step, path));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}
