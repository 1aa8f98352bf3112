use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::{stable_hash_string, LogDensity, RunProvenance};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::Chain;
use crate::checkpoint::{self, CheckpointPayload};
use crate::config::{OutputConfig, RunConfig, SamplerConfig};
use crate::diagnostics::{self, PosteriorSummary};
use crate::ensemble::{EnsembleState, StretchKernel};
use crate::io::{store_json, ARTIFACT_SCHEMA};
use crate::manifest::RunManifest;
use crate::metropolis::{MetropolisKernel, MetropolisState};

/// State of whichever sampler the run uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SamplerState {
    /// Single Metropolis chain.
    Metropolis(MetropolisState),
    /// Stretch-move ensemble.
    Ensemble(EnsembleState),
}

impl SamplerState {
    fn snapshot(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        match self {
            SamplerState::Metropolis(state) => (vec![state.position.clone()], vec![state.log_prob]),
            SamplerState::Ensemble(state) => (state.walkers.clone(), state.log_probs.clone()),
        }
    }

    fn acceptance(&self) -> f64 {
        let (accepted, proposed) = match self {
            SamplerState::Metropolis(state) => (state.accepted, state.proposed),
            SamplerState::Ensemble(state) => (state.accepted, state.proposed),
        };
        if proposed == 0 {
            0.0
        } else {
            accepted as f64 / proposed as f64
        }
    }

    fn proposal_scale(&self) -> Option<f64> {
        match self {
            SamplerState::Metropolis(state) => Some(state.scale),
            SamplerState::Ensemble(_) => None,
        }
    }
}

/// Highest-density point visited during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPoint {
    /// Parameter values keyed by name, in parameter order.
    pub params: IndexMap<String, f64>,
    /// Log density at the point.
    pub log_prob: f64,
}

impl BestPoint {
    /// Values in parameter order.
    pub fn values(&self) -> Vec<f64> {
        self.params.values().copied().collect()
    }
}

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Sampler kind (`metropolis` or `ensemble`).
    pub sampler: String,
    /// Total steps executed, burn-in included.
    pub steps: usize,
    /// Walkers advanced per step.
    pub walkers: usize,
    /// Accepted fraction of all proposals.
    pub acceptance: f64,
    /// Final Metropolis proposal scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_scale: Option<f64>,
    /// Highest-density point visited.
    pub best: Option<BestPoint>,
    /// Diagnostics of the recorded chain.
    pub diagnostics: Option<PosteriorSummary>,
    /// Canonical hash of the terminal sampler state.
    pub final_state_hash: String,
    /// Chain CSV, if written.
    pub chain_path: Option<PathBuf>,
    /// Summary JSON, if written.
    pub summary_path: Option<PathBuf>,
    /// Manifest path, if emitted.
    pub manifest_path: Option<PathBuf>,
    /// Checkpoint files still on disk.
    pub checkpoints: Vec<PathBuf>,
}

/// Summary plus the in-memory chain.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Persisted run summary.
    pub summary: RunSummary,
    /// Recorded samples.
    pub chain: Chain,
}

struct Progress {
    state: SamplerState,
    chain: Chain,
    best: Option<BestPoint>,
}

fn check_target<T: LogDensity + ?Sized>(config: &RunConfig, target: &T) -> Result<(), McgtError> {
    let expected = config.parameters.names();
    if target.dim() != expected.len() || target.param_names() != expected {
        return Err(McgtError::Sampler(
            ErrorInfo::new("target-parameters", "target parameters differ from the run config")
                .with_context("config", expected.join(","))
                .with_context("target", target.param_names().join(",")),
        ));
    }
    Ok(())
}

/// Runs the configured sampler from scratch.
pub fn run<T: LogDensity + ?Sized>(
    config: &RunConfig,
    target: &T,
    seed: u64,
) -> Result<RunOutput, McgtError> {
    config.validate()?;
    check_target(config, target)?;
    let state = match &config.sampler {
        SamplerConfig::Metropolis { proposal_scale, .. } => SamplerState::Metropolis(
            MetropolisState::initialize(&config.parameters, target, *proposal_scale)?,
        ),
        SamplerConfig::Ensemble {
            walkers,
            stretch,
            init_spread,
        } => SamplerState::Ensemble(
            StretchKernel::new(&config.parameters, *stretch)
                .initialize(target, *walkers, *init_spread, seed)?,
        ),
    };
    let mut progress = Progress {
        state,
        chain: Chain::new(config.parameters.names()),
        best: None,
    };
    track_best(config, &mut progress);
    run_from(config, target, seed, progress, 0)
}

/// Resumes a run from a checkpoint file.
pub fn resume<T: LogDensity + ?Sized>(path: &Path, target: &T) -> Result<RunOutput, McgtError> {
    let payload = CheckpointPayload::load(path)?;
    payload.config.validate()?;
    check_target(&payload.config, target)?;
    let start = payload.next_step.min(payload.config.steps);
    info!(path = %path.display(), next_step = start, "resuming from checkpoint");
    let progress = Progress {
        state: payload.state,
        chain: payload.chain,
        best: payload.best,
    };
    run_from(&payload.config, target, payload.master_seed, progress, start)
}

fn run_from<T: LogDensity + ?Sized>(
    config: &RunConfig,
    target: &T,
    seed: u64,
    mut progress: Progress,
    start_step: usize,
) -> Result<RunOutput, McgtError> {
    let layout = resolve_output_paths(&config.output);
    // Files from before the resume count toward the retention limit.
    let mut checkpoints = match (&layout.run_directory, start_step) {
        (Some(run_dir), start) if start > 0 => checkpoint::existing_checkpoints(
            &run_dir.join(layout.checkpoint_dir.clone().unwrap_or_default()),
            start,
        )?,
        _ => Vec::new(),
    };
    info!(
        sampler = config.sampler.kind(),
        steps = config.steps,
        walkers = config.sampler.walkers(),
        seed,
        start_step,
        "sampler start"
    );

    for step in start_step..config.steps {
        advance(config, &mut progress.state, target, seed, step)?;
        track_best(config, &mut progress);
        if config.records(step) {
            let (walkers, log_probs) = progress.state.snapshot();
            progress.chain.push(step, &walkers, &log_probs)?;
        }

        if config.checkpoint.interval > 0 && (step + 1) % config.checkpoint.interval == 0 {
            if let Some(path) = write_checkpoint(config, seed, step + 1, &progress, &layout)? {
                checkpoints.push(path);
                enforce_checkpoint_retention(&mut checkpoints, config.checkpoint.max_to_keep)?;
            }
        }
    }

    let final_state_hash = stable_hash_string(&progress.state)?;
    let diagnostics = if progress.chain.is_empty() {
        None
    } else {
        Some(diagnostics::summarize(&progress.chain)?)
    };
    let acceptance = progress.state.acceptance();
    if acceptance < 0.05 {
        warn!(acceptance, "very low acceptance rate");
    }

    let mut summary = RunSummary {
        sampler: config.sampler.kind().to_string(),
        steps: config.steps,
        walkers: config.sampler.walkers(),
        acceptance,
        proposal_scale: progress.state.proposal_scale(),
        best: progress.best.clone(),
        diagnostics,
        final_state_hash,
        chain_path: None,
        summary_path: None,
        manifest_path: None,
        checkpoints,
    };

    if let Some(run_dir) = layout.run_directory.clone() {
        let chain_path = run_dir.join(&config.output.chain_file);
        progress.chain.write_csv(&chain_path)?;
        let summary_path = run_dir.join(&config.output.summary_file);
        let manifest_path = run_dir.join(&config.output.manifest_file);
        summary.chain_path = Some(chain_path);
        summary.summary_path = Some(summary_path.clone());
        summary.manifest_path = Some(manifest_path.clone());
        store_json("summary", &summary_path, &summary)?;
        build_manifest(config, target, seed, &summary, &run_dir)?.write(&manifest_path)?;
    }

    info!(
        acceptance = summary.acceptance,
        samples = progress.chain.len(),
        hash = %summary.final_state_hash,
        "sampler finished"
    );
    Ok(RunOutput {
        summary,
        chain: progress.chain,
    })
}

fn advance<T: LogDensity + ?Sized>(
    config: &RunConfig,
    state: &mut SamplerState,
    target: &T,
    seed: u64,
    step: usize,
) -> Result<(), McgtError> {
    match (&config.sampler, state) {
        (SamplerConfig::Metropolis { adaptation, .. }, SamplerState::Metropolis(state)) => {
            MetropolisKernel::new(&config.parameters, adaptation, config.burn_in)
                .step(state, target, seed, step)
                .map(|_| ())
        }
        (SamplerConfig::Ensemble { stretch, .. }, SamplerState::Ensemble(state)) => {
            StretchKernel::new(&config.parameters, *stretch).step(state, target, seed, step)
        }
        _ => Err(McgtError::Sampler(ErrorInfo::new(
            "state-mismatch",
            "sampler state does not match the configured sampler",
        ))),
    }
}

fn track_best(config: &RunConfig, progress: &mut Progress) {
    let (walkers, log_probs) = progress.state.snapshot();
    for (position, log_prob) in walkers.iter().zip(log_probs) {
        let better = progress.best.as_ref().map_or(true, |b| log_prob > b.log_prob);
        if log_prob.is_finite() && better {
            progress.best = Some(BestPoint {
                params: config
                    .parameters
                    .names()
                    .into_iter()
                    .zip(position.iter().copied())
                    .collect(),
                log_prob,
            });
        }
    }
}

fn build_manifest<T: LogDensity + ?Sized>(
    config: &RunConfig,
    target: &T,
    seed: u64,
    summary: &RunSummary,
    run_dir: &Path,
) -> Result<RunManifest, McgtError> {
    let relative = |path: &PathBuf| path.strip_prefix(run_dir).ok().map(Path::to_path_buf);
    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        env!("CARGO_PKG_NAME").to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    Ok(RunManifest {
        schema: ARTIFACT_SCHEMA,
        config: config.clone(),
        master_seed: seed,
        seed_label: config.seed_policy.label.clone(),
        param_names: config.parameters.names(),
        final_state_hash: summary.final_state_hash.clone(),
        chain_file: summary.chain_path.as_ref().and_then(relative),
        summary_file: summary.summary_path.as_ref().and_then(relative),
        checkpoints: summary.checkpoints.iter().filter_map(relative).collect(),
        provenance: RunProvenance {
            config_hash: stable_hash_string(config)?,
            data_hash: target.data_hash()?.unwrap_or_default(),
            seed,
            created_at: chrono::Utc::now().to_rfc3339(),
            tool_versions,
        },
    })
}

fn write_checkpoint(
    config: &RunConfig,
    seed: u64,
    next_step: usize,
    progress: &Progress,
    layout: &ResolvedOutput,
) -> Result<Option<PathBuf>, McgtError> {
    let run_dir = match &layout.run_directory {
        Some(dir) => dir,
        None => return Ok(None),
    };
    let checkpoint_dir = run_dir.join(layout.checkpoint_dir.clone().unwrap_or_default());
    let path = checkpoint::checkpoint_path(&checkpoint_dir, next_step);
    let payload = CheckpointPayload {
        schema: ARTIFACT_SCHEMA,
        next_step,
        config: config.clone(),
        master_seed: seed,
        state: progress.state.clone(),
        chain: progress.chain.clone(),
        best: progress.best.clone(),
    };
    payload.store(&path)?;
    info!(path = %path.display(), next_step, "checkpoint written");
    Ok(Some(path))
}

fn enforce_checkpoint_retention(
    paths: &mut Vec<PathBuf>,
    max_to_keep: usize,
) -> Result<(), McgtError> {
    while paths.len() > max_to_keep {
        let oldest = paths.remove(0);
        std::fs::remove_file(&oldest).map_err(|err| {
            McgtError::Serde(
                ErrorInfo::new("checkpoint-remove", err.to_string())
                    .with_context("path", oldest.display().to_string()),
            )
        })?;
    }
    Ok(())
}

#[derive(Default)]
struct ResolvedOutput {
    run_directory: Option<PathBuf>,
    checkpoint_dir: Option<PathBuf>,
}

fn resolve_output_paths(config: &OutputConfig) -> ResolvedOutput {
    match &config.run_directory {
        None => ResolvedOutput::default(),
        Some(dir) => ResolvedOutput {
            run_directory: Some(dir.clone()),
            checkpoint_dir: Some(config.checkpoint_dir.clone()),
        },
    }
}
