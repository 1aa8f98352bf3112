use std::fs;
use std::path::Path;

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

/// Recorded walker positions, one entry per kept step.
///
/// `positions[sample][walker][param]` and `log_probs[sample][walker]`. A
/// Metropolis run is stored as a single-walker ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    param_names: Vec<String>,
    steps: Vec<usize>,
    positions: Vec<Vec<Vec<f64>>>,
    log_probs: Vec<Vec<f64>>,
}

fn shape_error(message: &str) -> McgtError {
    McgtError::Sampler(ErrorInfo::new("chain-shape", message))
}

fn csv_error(code: &str, path: &Path, err: impl ToString) -> McgtError {
    McgtError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

impl Chain {
    /// Empty chain over `param_names`.
    pub fn new(param_names: Vec<String>) -> Self {
        Self {
            param_names,
            steps: Vec::new(),
            positions: Vec::new(),
            log_probs: Vec::new(),
        }
    }

    /// Appends the ensemble state at `step`.
    pub fn push(&mut self, step: usize, walkers: &[Vec<f64>], log_probs: &[f64]) -> Result<(), McgtError> {
        if walkers.is_empty() || walkers.len() != log_probs.len() {
            return Err(shape_error("one log density per walker is required"));
        }
        if walkers.iter().any(|w| w.len() != self.param_names.len()) {
            return Err(shape_error("walker dimension differs from parameter count"));
        }
        if let Some(first) = self.positions.first() {
            if first.len() != walkers.len() {
                return Err(shape_error("walker count changed between samples"));
            }
        }
        if self.steps.last().is_some_and(|last| *last >= step) {
            return Err(shape_error("steps must increase"));
        }
        self.steps.push(step);
        self.positions.push(walkers.to_vec());
        self.log_probs.push(log_probs.to_vec());
        Ok(())
    }

    /// Parameter names in column order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Walkers per sample (0 for an empty chain).
    pub fn n_walkers(&self) -> usize {
        self.positions.first().map_or(0, Vec::len)
    }

    /// Step index of every recorded sample.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Chain without its first `discard` samples.
    pub fn discard(&self, discard: usize) -> Chain {
        let skip = discard.min(self.len());
        Chain {
            param_names: self.param_names.clone(),
            steps: self.steps[skip..].to_vec(),
            positions: self.positions[skip..].to_vec(),
            log_probs: self.log_probs[skip..].to_vec(),
        }
    }

    /// All positions, sample-major then walker-major.
    pub fn flat_samples(&self) -> Vec<Vec<f64>> {
        self.positions.iter().flatten().cloned().collect()
    }

    /// All log densities in the order of [`Chain::flat_samples`].
    pub fn flat_log_probs(&self) -> Vec<f64> {
        self.log_probs.iter().flatten().copied().collect()
    }

    /// Flattened values of parameter `index`.
    pub fn param_column(&self, index: usize) -> Vec<f64> {
        self.positions
            .iter()
            .flat_map(|sample| sample.iter().map(move |walker| walker[index]))
            .collect()
    }

    /// Per-walker trace of parameter `index`: `[walker][sample]`.
    pub fn walker_series(&self, index: usize) -> Vec<Vec<f64>> {
        (0..self.n_walkers())
            .map(|w| self.positions.iter().map(|sample| sample[w][index]).collect())
            .collect()
    }

    /// Highest-density recorded point.
    pub fn best(&self) -> Option<(Vec<f64>, f64)> {
        let mut best: Option<(Vec<f64>, f64)> = None;
        for (sample, lps) in self.positions.iter().zip(&self.log_probs) {
            for (position, lp) in sample.iter().zip(lps) {
                if lp.is_finite() && best.as_ref().map_or(true, |(_, b)| lp > b) {
                    best = Some((position.clone(), *lp));
                }
            }
        }
        best
    }

    /// Writes `step,walker,log_prob,<params…>` rows.
    pub fn write_csv(&self, path: &Path) -> Result<(), McgtError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| csv_error("chain-mkdir", path, err))?;
        }
        let mut wtr = csv::Writer::from_path(path).map_err(|err| csv_error("chain-write", path, err))?;
        let mut header = vec!["step".to_string(), "walker".to_string(), "log_prob".to_string()];
        header.extend(self.param_names.iter().cloned());
        wtr.write_record(&header)
            .map_err(|err| csv_error("chain-write", path, err))?;
        for ((step, sample), lps) in self.steps.iter().zip(&self.positions).zip(&self.log_probs) {
            for (walker, (position, lp)) in sample.iter().zip(lps).enumerate() {
                let mut record = vec![step.to_string(), walker.to_string(), lp.to_string()];
                record.extend(position.iter().map(f64::to_string));
                wtr.write_record(&record)
                    .map_err(|err| csv_error("chain-write", path, err))?;
            }
        }
        wtr.flush().map_err(|err| csv_error("chain-write", path, err))
    }

    /// Reads a file produced by [`Chain::write_csv`].
    pub fn read_csv(path: &Path) -> Result<Chain, McgtError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|err| McgtError::io("chain-read", path, err))?;
        let header = rdr
            .headers()
            .map_err(|err| csv_error("chain-read", path, err))?
            .clone();
        let fixed: Vec<&str> = header.iter().take(3).collect();
        if fixed != ["step", "walker", "log_prob"] || header.len() < 4 {
            return Err(McgtError::Data(
                ErrorInfo::new("chain-format", "expected header step,walker,log_prob,<params>")
                    .with_context("path", path.display().to_string()),
            ));
        }
        let mut chain = Chain::new(header.iter().skip(3).map(str::to_string).collect());
        let mut current: Option<usize> = None;
        let mut walkers: Vec<Vec<f64>> = Vec::new();
        let mut lps: Vec<f64> = Vec::new();

        for (row, record) in rdr.records().enumerate() {
            let record = record.map_err(|err| csv_error("chain-read", path, err))?;
            let bad_row = |message: &str| {
                McgtError::Data(
                    ErrorInfo::new("chain-format", message)
                        .with_context("path", path.display().to_string())
                        .with_context("row", (row + 1).to_string()),
                )
            };
            let step: usize = record
                .get(0)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| bad_row("step is not an integer"))?;
            let walker: usize = record
                .get(1)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| bad_row("walker is not an integer"))?;
            let values = record
                .iter()
                .skip(2)
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|_| bad_row("non-numeric value"))?;
            if current != Some(step) {
                if let Some(previous) = current {
                    chain.push(previous, &walkers, &lps)?;
                }
                current = Some(step);
                walkers.clear();
                lps.clear();
            }
            if walker != walkers.len() {
                return Err(bad_row("walkers must be listed in order starting at 0"));
            }
            lps.push(values[0]);
            walkers.push(values[1..].to_vec());
        }
        if let Some(previous) = current {
            chain.push(previous, &walkers, &lps)?;
        }
        Ok(chain)
    }
}
