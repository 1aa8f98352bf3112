use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_cosmo::{CmbShift, RecombinationSummary};
use serde::Serialize;

use super::{emit_json, GlobalOpts};

#[derive(Args, Debug)]
pub struct RecombinationArgs {
    /// Output JSON; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RecombinationReport {
    z_star: f64,
    z_drag: f64,
    r_s_star: f64,
    r_drag: f64,
    #[serde(rename = "R")]
    r_shift: f64,
    l_a: f64,
    omega_b_h2: f64,
}

pub fn run(global: &GlobalOpts, args: &RecombinationArgs) -> Result<(), Box<dyn Error>> {
    let model = global.model()?;
    let summary = RecombinationSummary::compute(&model)?;
    let shift = CmbShift::compute(&model)?;
    let report = RecombinationReport {
        z_star: summary.z_star,
        z_drag: summary.z_drag,
        r_s_star: summary.r_s_star,
        r_drag: summary.r_drag,
        r_shift: shift.r_shift,
        l_a: shift.l_a,
        omega_b_h2: shift.omega_b_h2,
    };
    emit_json(args.out.as_deref(), &report)
}
