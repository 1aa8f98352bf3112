//! Convergence diagnostics and posterior summaries of a recorded chain.

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_stats::percentile;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;

/// Largest lag used in the autocorrelation sum.
const MAX_LAG: usize = 100;

/// Split-chain Gelman-Rubin statistic over per-walker traces `[walker][sample]`.
///
/// Each trace is split into halves so a single Metropolis chain still yields
/// two sequences. `None` below four samples per trace.
pub fn split_r_hat(series: &[Vec<f64>]) -> Option<f64> {
    let n_keep = series.iter().map(Vec::len).min()?;
    if n_keep < 4 {
        return None;
    }
    let n_split = n_keep / 2;
    let halves: Vec<&[f64]> = series
        .iter()
        .flat_map(|trace| [&trace[..n_split], &trace[n_split..2 * n_split]])
        .collect();
    let n_chains = halves.len();

    let means: Vec<f64> = halves
        .iter()
        .map(|h| h.iter().sum::<f64>() / n_split as f64)
        .collect();
    let vars: Vec<f64> = halves
        .iter()
        .zip(&means)
        .map(|(h, m)| h.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n_split - 1) as f64)
        .collect();

    let w = vars.iter().sum::<f64>() / n_chains as f64;
    if w <= 0.0 {
        return None;
    }
    let overall = means.iter().sum::<f64>() / n_chains as f64;
    let b = n_split as f64 * means.iter().map(|m| (m - overall).powi(2)).sum::<f64>()
        / (n_chains - 1) as f64;
    let var_plus = ((n_split - 1) as f64 * w + b) / n_split as f64;
    Some((var_plus / w).sqrt())
}

fn autocorrelation(trace: &[f64], max_lag: usize) -> Vec<f64> {
    let n = trace.len();
    let mean = trace.iter().sum::<f64>() / n as f64;
    let variance = trace.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    if variance == 0.0 {
        return vec![0.0; max_lag];
    }
    (1..=max_lag)
        .map(|lag| {
            if lag >= n {
                return 0.0;
            }
            let covariance: f64 = (0..n - lag)
                .map(|i| (trace[i] - mean) * (trace[i + lag] - mean))
                .sum::<f64>()
                / (n - lag) as f64;
            covariance / variance
        })
        .collect()
}

/// Integrated autocorrelation time τ = 1 + 2Σρ(k), truncated at the first non-positive ρ.
///
/// ρ is averaged over walkers; lags run up to min(n/2, 100). `None` below ten samples.
pub fn autocorr_time(series: &[Vec<f64>]) -> Option<f64> {
    let n_keep = series.iter().map(Vec::len).min()?;
    if n_keep < 10 {
        return None;
    }
    let max_lag = (n_keep / 2).min(MAX_LAG);
    let mut averaged = vec![0.0; max_lag];
    for trace in series {
        for (slot, rho) in averaged.iter_mut().zip(autocorrelation(&trace[..n_keep], max_lag)) {
            *slot += rho / series.len() as f64;
        }
    }
    let sum: f64 = averaged.iter().take_while(|rho| **rho > 0.0).sum();
    Some(1.0 + 2.0 * sum)
}

/// N_total / τ.
pub fn effective_sample_size(series: &[Vec<f64>]) -> Option<f64> {
    let tau = autocorr_time(series)?;
    let total: usize = series.iter().map(Vec::len).sum();
    Some(total as f64 / tau)
}

/// Marginal summary of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSummary {
    /// Parameter name.
    pub name: String,
    /// Posterior mean.
    pub mean: f64,
    /// Posterior standard deviation.
    pub std: f64,
    /// 16th percentile.
    pub q16: f64,
    /// Median.
    pub q50: f64,
    /// 84th percentile.
    pub q84: f64,
    /// Split R̂, when enough samples exist.
    pub r_hat: Option<f64>,
    /// Integrated autocorrelation time.
    pub tau: Option<f64>,
    /// Effective sample size.
    pub ess: Option<f64>,
}

/// Posterior summary of a whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSummary {
    /// Recorded samples per walker.
    pub samples: usize,
    /// Walkers per sample.
    pub walkers: usize,
    /// Per-parameter summaries in chain order.
    pub params: Vec<ParamSummary>,
}

/// Summarises every parameter of `chain`.
pub fn summarize(chain: &Chain) -> Result<PosteriorSummary, McgtError> {
    if chain.is_empty() {
        return Err(McgtError::Stats(ErrorInfo::new(
            "empty-chain",
            "cannot summarise a chain without samples",
        )));
    }
    let params = chain
        .param_names()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let mut values = chain.param_column(index);
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = if values.len() > 1 {
                (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            } else {
                0.0
            };
            values.sort_by(f64::total_cmp);
            let series = chain.walker_series(index);
            ParamSummary {
                name: name.clone(),
                mean,
                std,
                q16: percentile(&values, 0.16),
                q50: percentile(&values, 0.5),
                q84: percentile(&values, 0.84),
                r_hat: split_r_hat(&series),
                tau: autocorr_time(&series),
                ess: effective_sample_size(&series),
            }
        })
        .collect();
    Ok(PosteriorSummary {
        samples: chain.len(),
        walkers: chain.n_walkers(),
        params,
    })
}
