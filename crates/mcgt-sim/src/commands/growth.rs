use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_cosmo::GrowthSolver;
use serde::Serialize;

use super::{emit_csv, log_grid, GlobalOpts};

#[derive(Args, Debug)]
pub struct GrowthArgs {
    /// Smallest tabulated scale factor.
    #[arg(long, default_value_t = 0.01)]
    pub a_min: f64,
    /// Number of points, log-spaced up to a = 1.
    #[arg(long, default_value_t = 200)]
    pub points: usize,
    /// Output CSV; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GrowthRow {
    a: f64,
    z: f64,
    #[serde(rename = "D")]
    d: f64,
    f: f64,
    fsigma8: f64,
}

pub fn run(global: &GlobalOpts, args: &GrowthArgs) -> Result<(), Box<dyn Error>> {
    let model = global.model()?;
    let solver = GrowthSolver::new(&model)?;
    if args.a_min < solver.a_init() {
        return Err(format!(
            "--a-min {} lies before the growth start a = {}",
            args.a_min,
            solver.a_init()
        )
        .into());
    }
    let grid = log_grid(args.a_min, 1.0, args.points)?;
    let table = solver.solve(&grid)?;
    let fs8 = table.fsigma8(model.params.sigma8);
    let rows: Vec<GrowthRow> = (0..table.a.len())
        .map(|i| GrowthRow {
            a: table.a[i],
            z: table.z[i],
            d: table.d[i],
            f: table.f[i],
            fsigma8: fs8[i],
        })
        .collect();
    emit_csv(args.out.as_deref(), &rows)
}
