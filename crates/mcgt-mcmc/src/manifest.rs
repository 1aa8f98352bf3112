use std::path::{Path, PathBuf};

use mcgt_core::errors::McgtError;
use mcgt_core::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::io::{check_schema, load_json, store_json};

/// Record of a finished run: what was sampled, with which seed, and where the files went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Layout version of the file.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Run configuration.
    pub config: RunConfig,
    /// Seed every step stream derives from.
    pub master_seed: u64,
    /// `seed_policy.label`.
    pub seed_label: Option<String>,
    /// Sampled parameter names in chain column order.
    pub param_names: Vec<String>,
    /// Canonical hash of the terminal sampler state.
    pub final_state_hash: String,
    /// Chain CSV (relative to the run directory).
    pub chain_file: Option<PathBuf>,
    /// Summary JSON (relative to the run directory).
    pub summary_file: Option<PathBuf>,
    /// Checkpoints still on disk, oldest first.
    pub checkpoints: Vec<PathBuf>,
    /// Hashes, seed, timestamp and tool versions.
    pub provenance: RunProvenance,
}

impl RunManifest {
    /// Reads a manifest, rejecting files from an incompatible schema.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let manifest: Self = load_json("manifest", path)?;
        check_schema("manifest", path, &manifest.schema)?;
        Ok(manifest)
    }

    /// Pretty JSON at `path`.
    pub fn write(&self, path: &Path) -> Result<(), McgtError> {
        store_json("manifest", path, self)
    }
}
