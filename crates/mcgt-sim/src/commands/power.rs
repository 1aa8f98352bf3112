use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_cosmo::{GrowthSolver, PowerSpectrum};
use serde::Serialize;

use super::{emit_csv, log_grid, GlobalOpts};

#[derive(Args, Debug)]
pub struct PowerArgs {
    /// Smallest wavenumber in 1/Mpc (no factor of h).
    #[arg(long, default_value_t = 1e-4)]
    pub k_min: f64,
    /// Largest wavenumber in 1/Mpc.
    #[arg(long, default_value_t = 10.0)]
    pub k_max: f64,
    /// Number of log-spaced wavenumbers.
    #[arg(long, default_value_t = 200)]
    pub points: usize,
    /// Redshift of the spectrum.
    #[arg(long, default_value_t = 0.0)]
    pub z: f64,
    /// Output CSV; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PowerRow {
    k: f64,
    #[serde(rename = "P")]
    p: f64,
}

pub fn run(global: &GlobalOpts, args: &PowerArgs) -> Result<(), Box<dyn Error>> {
    let model = global.model()?;
    let spectrum = PowerSpectrum::new(&model.params)?;
    let growth = GrowthSolver::new(&model)?;
    let ks = log_grid(args.k_min, args.k_max, args.points)?;
    let power = spectrum.at_redshift(&ks, args.z, &growth)?;
    let rows: Vec<PowerRow> = ks.iter().zip(power).map(|(&k, p)| PowerRow { k, p }).collect();
    emit_csv(args.out.as_deref(), &rows)
}
