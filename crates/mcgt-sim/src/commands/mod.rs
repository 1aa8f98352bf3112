use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mcgt_cosmo::{CosmoModel, GlobalConfig};
use serde::Serialize;
use tracing::info;

pub mod background;
pub mod coverage;
pub mod growth;
pub mod mcmc;
pub mod power;
pub mod recombination;
pub mod summarize;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub config: PathBuf,
    pub defaults: bool,
}

impl GlobalOpts {
    pub fn global_config(&self) -> Result<GlobalConfig, Box<dyn Error>> {
        if self.defaults {
            return Ok(GlobalConfig::default());
        }
        if !self.config.exists() {
            return Err(format!(
                "global config {} not found; pass --config <path> or --defaults",
                self.config.display()
            )
            .into());
        }
        info!(path = %self.config.display(), "loading global config");
        Ok(GlobalConfig::load(&self.config)?)
    }

    pub fn model(&self) -> Result<CosmoModel, Box<dyn Error>> {
        Ok(self.global_config()?.model())
    }
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Pretty JSON to `out`, or stdout when absent.
pub fn emit_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => write_json(path, value),
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
            Ok(())
        }
    }
}

/// Serialises `rows` as CSV to `out`, or stdout when absent.
pub fn emit_csv<T: Serialize>(out: Option<&Path>, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let sink: Box<dyn Write> = match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Box::new(fs::File::create(path)?)
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut wtr = csv::Writer::from_writer(sink);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    if let Some(path) = out {
        info!(path = %path.display(), rows = rows.len(), "table written");
    }
    Ok(())
}

/// `n` points spaced uniformly in ln x between `lo` and `hi`.
pub fn log_grid(lo: f64, hi: f64, n: usize) -> Result<Vec<f64>, Box<dyn Error>> {
    if !(lo > 0.0 && hi > lo) || n < 2 {
        return Err(format!("invalid grid: need 0 < {lo} < {hi} and at least 2 points").into());
    }
    let (a, b) = (lo.ln(), hi.ln());
    let mut grid: Vec<f64> = (0..n)
        .map(|i| (a + (b - a) * i as f64 / (n - 1) as f64).exp())
        .collect();
    grid[0] = lo;
    grid[n - 1] = hi;
    Ok(grid)
}
