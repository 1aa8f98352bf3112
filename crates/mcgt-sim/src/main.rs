use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{
    background::{self, BackgroundArgs},
    coverage::{self, CoverageArgs},
    growth::{self, GrowthArgs},
    mcmc::{self, McmcArgs, ResumeArgs},
    power::{self, PowerArgs},
    recombination::{self, RecombinationArgs},
    summarize::{self, SummarizeArgs},
    GlobalOpts,
};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

const DEFAULT_FILTER: &str = "mcgt=info";

#[derive(Parser, Debug)]
#[command(name = "mcgt", version, about = "MCGT/ΨTMG cosmology pipeline")]
struct Cli {
    /// Global cosmology configuration (TOML).
    #[arg(long, global = true, default_value = "mcgt-global-config.toml")]
    config: PathBuf,
    /// Ignore --config and use the built-in Planck-like defaults.
    #[arg(long, global = true)]
    defaults: bool,
    /// Log filter directive; overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tabulate expansion rate and distances on a redshift grid.
    Background(BackgroundArgs),
    /// Tabulate the linear growth factor and rate.
    Growth(GrowthArgs),
    /// Tabulate the linear matter power spectrum.
    Power(PowerArgs),
    /// Print decoupling and drag quantities plus CMB shift parameters.
    Recombination(RecombinationArgs),
    /// Sample the posterior described by a job file.
    Mcmc(McmcArgs),
    /// Continue a sampler run from a checkpoint.
    Resume(ResumeArgs),
    /// Summarise a chain CSV.
    Summarize(SummarizeArgs),
    /// Bootstrap coverage of a per-group statistic.
    Coverage(CoverageArgs),
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    let global = GlobalOpts {
        config: cli.config,
        defaults: cli.defaults,
    };
    match cli.command {
        Command::Background(args) => background::run(&global, &args),
        Command::Growth(args) => growth::run(&global, &args),
        Command::Power(args) => power::run(&global, &args),
        Command::Recombination(args) => recombination::run(&global, &args),
        Command::Mcmc(args) => mcmc::run(&global, &args),
        Command::Resume(args) => mcmc::resume(&global, &args),
        Command::Summarize(args) => summarize::run(&args),
        Command::Coverage(args) => coverage::run(&args),
    }
}
