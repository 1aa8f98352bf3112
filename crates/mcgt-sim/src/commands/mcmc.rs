use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use indexmap::IndexMap;
use mcgt_cosmo::{CosmoModel, GlobalConfig};
use mcgt_like::{ChiSquareBreakdown, LikelihoodConfig, TriProbeLikelihood};
use mcgt_mcmc::{BestPoint, RunConfig, RunSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{emit_json, write_json, GlobalOpts};

const BESTFIT_FILE: &str = "bestfit.json";

#[derive(Args, Debug)]
pub struct McmcArgs {
    /// YAML job: run configuration plus a `likelihood` section.
    #[arg(long)]
    pub job: PathBuf,
    /// Run directory; overrides `output.run_directory` in the job.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Master seed; overrides `seed_policy.master_seed`.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Job file the checkpointed run was started from.
    #[arg(long)]
    pub job: PathBuf,
    /// Checkpoint JSON to continue from.
    #[arg(long)]
    pub checkpoint: PathBuf,
}

/// A run configuration with the datasets it samples against.
#[derive(Debug, Deserialize)]
struct JobFile {
    #[serde(flatten)]
    run: RunConfig,
    likelihood: LikelihoodConfig,
    /// Global config overriding `--config`, relative to the job file.
    #[serde(default)]
    global_config: Option<PathBuf>,
}

struct Job {
    run: RunConfig,
    likelihood: TriProbeLikelihood,
}

#[derive(Debug, Serialize)]
struct BestFit<'a> {
    params: &'a IndexMap<String, f64>,
    log_prob: f64,
    chi2: ChiSquareBreakdown,
    data_hash: String,
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_job(global: &GlobalOpts, path: &Path) -> Result<Job, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read job {}: {err}", path.display()))?;
    let job: JobFile = serde_yaml::from_str(&text)
        .map_err(|err| format!("invalid job {}: {err}", path.display()))?;
    job.run.validate()?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let model: CosmoModel = match &job.global_config {
        Some(config) => GlobalConfig::load(&anchor(base_dir, config))?.model(),
        None => global.model()?,
    };
    let likelihood =
        TriProbeLikelihood::from_config(&job.likelihood, base_dir, model, job.run.parameters.clone())?;
    let mut run = job.run;
    if let Some(dir) = run.output.run_directory.take() {
        run.output.run_directory = Some(anchor(base_dir, &dir));
    }
    Ok(Job { run, likelihood })
}

fn write_bestfit(
    summary: &RunSummary,
    likelihood: &TriProbeLikelihood,
    run_directory: &Path,
) -> Result<(), Box<dyn Error>> {
    let Some(best) = summary.best.as_ref() else {
        return Ok(());
    };
    let report = bestfit_report(best, likelihood)?;
    let path = run_directory.join(BESTFIT_FILE);
    write_json(&path, &report)?;
    info!(
        path = %path.display(),
        chi2 = report.chi2.total,
        "best fit written"
    );
    Ok(())
}

fn bestfit_report<'a>(
    best: &'a BestPoint,
    likelihood: &TriProbeLikelihood,
) -> Result<BestFit<'a>, Box<dyn Error>> {
    Ok(BestFit {
        params: &best.params,
        log_prob: best.log_prob,
        chi2: likelihood.breakdown(&best.values())?,
        data_hash: likelihood.data_hash()?,
    })
}

pub fn run(global: &GlobalOpts, args: &McmcArgs) -> Result<(), Box<dyn Error>> {
    let Job { mut run, likelihood } = load_job(global, &args.job)?;
    if let Some(out) = &args.out {
        run.output.run_directory = Some(out.clone());
    }
    let run_directory = run
        .output
        .run_directory
        .clone()
        .ok_or("no run directory: set output.run_directory in the job or pass --out")?;
    let seed = args.seed.unwrap_or(run.seed_policy.master_seed);
    run.seed_policy.master_seed = seed;

    let output = mcgt_mcmc::run(&run, &likelihood, seed)?;
    write_bestfit(&output.summary, &likelihood, &run_directory)?;
    emit_json(None, &output.summary)
}

pub fn resume(global: &GlobalOpts, args: &ResumeArgs) -> Result<(), Box<dyn Error>> {
    let Job { likelihood, .. } = load_job(global, &args.job)?;
    let output = mcgt_mcmc::resume(&args.checkpoint, &likelihood)?;
    if let Some(dir) = output.summary.summary_path.as_deref().and_then(Path::parent) {
        write_bestfit(&output.summary, &likelihood, dir)?;
    }
    emit_json(None, &output.summary)
}
