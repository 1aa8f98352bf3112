use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_mcmc::{diagnostics, Chain};
use tracing::info;

use super::emit_json;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Chain CSV written by `mcgt mcmc`.
    #[arg(long)]
    pub chain: PathBuf,
    /// Leading samples to drop before summarising.
    #[arg(long, default_value_t = 0)]
    pub discard: usize,
    /// Output JSON; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &SummarizeArgs) -> Result<(), Box<dyn Error>> {
    let chain = Chain::read_csv(&args.chain)?.discard(args.discard);
    info!(samples = chain.len(), walkers = chain.n_walkers(), "chain loaded");
    let summary = diagnostics::summarize(&chain)?;
    emit_json(args.out.as_deref(), &summary)
}
