use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mcgt_cosmo::{Background, DistanceTable};

use super::{emit_csv, GlobalOpts};

#[derive(Args, Debug)]
pub struct BackgroundArgs {
    /// Largest tabulated redshift.
    #[arg(long, default_value_t = 3.0)]
    pub z_max: f64,
    /// Number of grid points, including z = 0.
    #[arg(long, default_value_t = 301)]
    pub points: usize,
    /// Output CSV; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(global: &GlobalOpts, args: &BackgroundArgs) -> Result<(), Box<dyn Error>> {
    let model = global.model()?;
    let background = Background::new(&model.params)?;
    let table = DistanceTable::build(&background, args.z_max, args.points)?;
    emit_csv(args.out.as_deref(), &table.rows())
}
