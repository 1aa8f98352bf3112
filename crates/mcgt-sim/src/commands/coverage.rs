use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_stats::{coverage, load_groups, CoverageOptions, Statistic};

use super::emit_json;

#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// CSV with one value per row.
    #[arg(long)]
    pub input: PathBuf,
    /// Column holding the values.
    #[arg(long)]
    pub value_column: String,
    /// Column splitting rows into groups; one group when omitted.
    #[arg(long)]
    pub group_column: Option<String>,
    /// mean, median, p95 or p95_abs.
    #[arg(long, default_value = "p95")]
    pub statistic: Statistic,
    /// Bootstrap replicates per group.
    #[arg(long, default_value_t = 1000)]
    pub n_boot: usize,
    /// Two-sided interval level.
    #[arg(long, default_value_t = 0.95)]
    pub confidence: f64,
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,
    /// Value every interval should cover; the pooled statistic when omitted.
    #[arg(long)]
    pub reference: Option<f64>,
    /// Output JSON; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &CoverageArgs) -> Result<(), Box<dyn Error>> {
    let groups = load_groups(&args.input, &args.value_column, args.group_column.as_deref())?;
    let opts = CoverageOptions {
        statistic: args.statistic,
        n_boot: args.n_boot,
        confidence: args.confidence,
    };
    let report = coverage(&groups, args.reference, &opts, args.seed)?;
    emit_json(args.out.as_deref(), &report)
}
