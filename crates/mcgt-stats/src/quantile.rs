use std::f64::consts::PI;
use std::str::FromStr;

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

/// Quantile summary for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantiles {
    /// 5th percentile estimate.
    pub q05: f64,
    /// Median (50th percentile) estimate.
    pub q50: f64,
    /// 95th percentile estimate.
    pub q95: f64,
}

impl Quantiles {
    /// Summarises `values`; every field is NaN when `values` is empty.
    pub fn from_values(values: &[f64]) -> Self {
        let sorted = sorted_copy(values);
        Self {
            q05: percentile(&sorted, 0.05),
            q50: percentile(&sorted, 0.5),
            q95: percentile(&sorted, 0.95),
        }
    }
}

pub(crate) fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linearly interpolated quantile `q` in `[0, 1]` of already sorted `values`.
pub fn percentile(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let position = quantile.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let weight = position - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    }
}

/// 95th percentile of unsorted `values`.
pub fn p95(values: &[f64]) -> f64 {
    percentile(&sorted_copy(values), 0.95)
}

/// 95th percentile of |values|.
pub fn p95_abs(values: &[f64]) -> f64 {
    let magnitudes: Vec<f64> = values.iter().map(|v| v.abs()).collect();
    p95(&magnitudes)
}

/// Wraps an angle into (−π, π].
pub fn wrap_phase(x: f64) -> f64 {
    let wrapped = (x + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Scalar summary a bootstrap interval is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Arithmetic mean.
    Mean,
    /// Median.
    Median,
    /// 95th percentile.
    P95,
    /// 95th percentile of absolute values.
    P95Abs,
}

impl Statistic {
    /// Stable lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::P95 => "p95",
            Statistic::P95Abs => "p95_abs",
        }
    }

    /// Evaluates the statistic; empty input is an error.
    pub fn apply(&self, values: &[f64]) -> Result<f64, McgtError> {
        if values.is_empty() {
            return Err(McgtError::Stats(
                ErrorInfo::new("empty-sample", "statistic of an empty sample")
                    .with_context("statistic", self.as_str()),
            ));
        }
        Ok(match self {
            Statistic::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Statistic::Median => percentile(&sorted_copy(values), 0.5),
            Statistic::P95 => p95(values),
            Statistic::P95Abs => p95_abs(values),
        })
    }
}

impl FromStr for Statistic {
    type Err = McgtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            "p95" => Ok(Statistic::P95),
            "p95_abs" | "p95abs" => Ok(Statistic::P95Abs),
            other => Err(McgtError::Config(
                ErrorInfo::new("unknown-statistic", "unsupported statistic")
                    .with_context("statistic", other)
                    .with_hint("use mean, median, p95 or p95_abs"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.5), 3.0);
        assert!((percentile(&values, 0.95) - 4.8).abs() < 1e-12);
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn phase_wraps_into_half_open_interval() {
        assert!((wrap_phase(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_phase(-PI) - PI).abs() < 1e-12);
        assert!((wrap_phase(0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_phase(-0.5 - 4.0 * PI) + 0.5).abs() < 1e-12);
    }
}
