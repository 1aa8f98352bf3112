#![deny(missing_docs)]

//! Deterministic MCMC samplers for MCGT posteriors.
//!
//! Every proposal draws from its own RNG substream derived from the master
//! seed, the walker and the step, so a run resumed from a checkpoint ends in
//! the same state as an uninterrupted run.

/// In-memory chain storage and CSV export.
pub mod chain;
/// Checkpoint payload and file naming.
pub mod checkpoint;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Gelman-Rubin, autocorrelation time and posterior summaries.
pub mod diagnostics;
/// Affine-invariant stretch-move ensemble.
pub mod ensemble;
mod io;
/// Sampling loop and public `run`/`resume` entry points.
pub mod kernel;
/// Run manifest serialization helpers.
pub mod manifest;
/// Gaussian random-walk Metropolis-Hastings.
pub mod metropolis;

pub use chain::Chain;
pub use checkpoint::CheckpointPayload;
pub use config::{
    AdaptationConfig, CheckpointConfig, OutputConfig, RunConfig, SamplerConfig, SeedPolicy,
};
pub use diagnostics::{
    autocorr_time, effective_sample_size, split_r_hat, summarize, ParamSummary, PosteriorSummary,
};
pub use ensemble::{EnsembleState, StretchKernel};
pub use kernel::{resume, run, BestPoint, RunOutput, RunSummary, SamplerState};
pub use manifest::RunManifest;
pub use metropolis::{MetropolisKernel, MetropolisState};
