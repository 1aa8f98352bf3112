use std::fs;
use std::path::{Path, PathBuf};

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::ParamSet;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a sampler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Sampler kind and its tuning knobs.
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Total number of steps, burn-in included.
    pub steps: usize,
    /// Leading steps excluded from the recorded chain.
    #[serde(default)]
    pub burn_in: usize,
    /// Record every `thinning`-th post burn-in step.
    #[serde(default = "default_thinning")]
    pub thinning: usize,
    /// Free parameters with bounds, starting point and proposal widths.
    pub parameters: ParamSet,
    /// When to write checkpoints and how many to keep.
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    /// Seed all step streams derive from.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Where chain, summary, manifest and checkpoints go.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_thinning() -> usize {
    1
}

fn invalid(field: &str, message: &str) -> McgtError {
    McgtError::Config(ErrorInfo::new("config-invalid", message).with_context("field", field))
}

impl RunConfig {
    /// Metropolis run over `parameters` with default settings.
    pub fn new(parameters: ParamSet, steps: usize) -> Self {
        Self {
            sampler: SamplerConfig::default(),
            steps,
            burn_in: 0,
            thinning: default_thinning(),
            parameters,
            checkpoint: CheckpointConfig::default(),
            seed_policy: SeedPolicy::default(),
            output: OutputConfig::default(),
        }
    }

    /// Parses a YAML document and validates it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, McgtError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|err| {
            McgtError::Config(ErrorInfo::new("run-config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let text =
            fs::read_to_string(path).map_err(|err| McgtError::io("run-config-read", path, err))?;
        Self::from_yaml_str(&text).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Checks step counts and sampler settings against the parameter dimension.
    pub fn validate(&self) -> Result<(), McgtError> {
        if self.steps == 0 {
            return Err(invalid("steps", "steps must be positive"));
        }
        if self.thinning == 0 {
            return Err(invalid("thinning", "thinning must be positive"));
        }
        if self.burn_in >= self.steps {
            return Err(invalid("burn_in", "burn_in must be smaller than steps"));
        }
        if self.checkpoint.max_to_keep == 0 {
            return Err(invalid("checkpoint.max_to_keep", "max_to_keep must be positive"));
        }
        self.sampler.validate(self.parameters.len())
    }

    /// Number of chain samples a complete run records.
    pub fn recorded_steps(&self) -> usize {
        (self.steps - self.burn_in.min(self.steps)).div_ceil(self.thinning.max(1))
    }

    /// Whether `step` (zero based) is written to the chain.
    pub fn records(&self, step: usize) -> bool {
        step >= self.burn_in && (step - self.burn_in) % self.thinning == 0
    }
}

/// Supported samplers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SamplerConfig {
    /// Gaussian random-walk Metropolis-Hastings on a single chain.
    Metropolis {
        /// Global multiplier of the per-parameter steps.
        #[serde(default = "default_proposal_scale")]
        proposal_scale: f64,
        /// Burn-in adaptation of `proposal_scale`.
        #[serde(default)]
        adaptation: AdaptationConfig,
    },
    /// Affine-invariant stretch-move ensemble.
    Ensemble {
        /// Number of walkers (even, at least twice the dimension).
        #[serde(default = "default_walkers")]
        walkers: usize,
        /// Stretch scale `a`.
        #[serde(default = "default_stretch")]
        stretch: f64,
        /// Width of the initial ball in units of each parameter's step.
        #[serde(default = "default_init_spread")]
        init_spread: f64,
    },
}

fn default_proposal_scale() -> f64 {
    1.0
}

fn default_walkers() -> usize {
    32
}

fn default_stretch() -> f64 {
    2.0
}

fn default_init_spread() -> f64 {
    1.0
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig::Metropolis {
            proposal_scale: default_proposal_scale(),
            adaptation: AdaptationConfig::default(),
        }
    }
}

impl SamplerConfig {
    /// Stable kind name recorded in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SamplerConfig::Metropolis { .. } => "metropolis",
            SamplerConfig::Ensemble { .. } => "ensemble",
        }
    }

    /// Number of chains advanced per step.
    pub fn walkers(&self) -> usize {
        match self {
            SamplerConfig::Metropolis { .. } => 1,
            SamplerConfig::Ensemble { walkers, .. } => *walkers,
        }
    }

    fn validate(&self, dim: usize) -> Result<(), McgtError> {
        match self {
            SamplerConfig::Metropolis {
                proposal_scale,
                adaptation,
            } => {
                if !(proposal_scale.is_finite() && *proposal_scale > 0.0) {
                    return Err(invalid("sampler.proposal_scale", "proposal_scale must be positive"));
                }
                let target = adaptation.target_acceptance;
                if !(target > 0.0 && target < 1.0) {
                    return Err(invalid(
                        "sampler.adaptation.target_acceptance",
                        "target_acceptance must lie in (0, 1)",
                    ));
                }
            }
            SamplerConfig::Ensemble {
                walkers,
                stretch,
                init_spread,
            } => {
                if walkers % 2 != 0 || *walkers < 2 * dim.max(1) {
                    return Err(McgtError::Config(
                        ErrorInfo::new("config-invalid", "walkers must be even and at least 2·dim")
                            .with_context("field", "sampler.walkers")
                            .with_context("walkers", walkers.to_string())
                            .with_context("dim", dim.to_string()),
                    ));
                }
                if !(stretch.is_finite() && *stretch > 1.0) {
                    return Err(invalid("sampler.stretch", "stretch must exceed 1"));
                }
                if !(init_spread.is_finite() && *init_spread > 0.0) {
                    return Err(invalid("sampler.init_spread", "init_spread must be positive"));
                }
            }
        }
        Ok(())
    }
}

/// Burn-in adaptation of the Metropolis proposal scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationConfig {
    /// Steps between scale updates (0 disables adaptation).
    #[serde(default = "default_adapt_interval")]
    pub interval: usize,
    /// Acceptance rate the scale is steered towards.
    #[serde(default = "default_target_acceptance")]
    pub target_acceptance: f64,
}

fn default_adapt_interval() -> usize {
    100
}

fn default_target_acceptance() -> f64 {
    0.234
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            interval: default_adapt_interval(),
            target_acceptance: default_target_acceptance(),
        }
    }
}

/// Checkpoint cadence and retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Interval in steps between checkpoint writes (0 disables checkpoints).
    #[serde(default)]
    pub interval: usize,
    /// Newest checkpoints kept on disk; older ones are deleted.
    #[serde(default = "default_checkpoint_retention")]
    pub max_to_keep: usize,
}

fn default_checkpoint_retention() -> usize {
    4
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: 0,
            max_to_keep: default_checkpoint_retention(),
        }
    }
}

/// Master seed plus a free-form label copied into the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Seed of every walker and step stream.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label documented in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// File layout of a run directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Run directory; nothing is written when absent.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Chain CSV relative to `run_directory`.
    #[serde(default = "default_chain_filename")]
    pub chain_file: PathBuf,
    /// Summary JSON relative to `run_directory`.
    #[serde(default = "default_summary_filename")]
    pub summary_file: PathBuf,
    /// Manifest JSON relative to `run_directory`.
    #[serde(default = "default_manifest_filename")]
    pub manifest_file: PathBuf,
    /// Checkpoint directory relative to `run_directory`.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
}

fn default_chain_filename() -> PathBuf {
    PathBuf::from("chain.csv")
}

fn default_summary_filename() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_manifest_filename() -> PathBuf {
    PathBuf::from("manifest.json")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            chain_file: default_chain_filename(),
            summary_file: default_summary_filename(),
            manifest_file: default_manifest_filename(),
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}
