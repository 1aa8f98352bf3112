use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::rng::RngHandle;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::groups::Group;
use crate::quantile::{percentile, sorted_copy, Statistic};

/// Percentile bootstrap interval around a point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound at `(1 − confidence)/2`.
    pub lower: f64,
    /// Upper bound at `(1 + confidence)/2`.
    pub upper: f64,
    /// Statistic of the original sample.
    pub estimate: f64,
}

impl Interval {
    /// Width `upper − lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Closed-interval membership.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

fn check_settings(n_boot: usize, confidence: f64) -> Result<(), McgtError> {
    if n_boot == 0 {
        return Err(McgtError::Stats(
            ErrorInfo::new("bootstrap-replicates", "n_boot must be at least 1")
                .with_hint("raise --n-boot"),
        ));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(McgtError::Stats(
            ErrorInfo::new("bootstrap-confidence", "confidence must lie in (0, 1)")
                .with_context("confidence", confidence.to_string()),
        ));
    }
    Ok(())
}

/// Resamples `values` with replacement `n_boot` times and returns the percentile interval.
pub fn bootstrap_interval(
    values: &[f64],
    statistic: Statistic,
    n_boot: usize,
    confidence: f64,
    rng: &mut RngHandle,
) -> Result<Interval, McgtError> {
    check_settings(n_boot, confidence)?;
    let estimate = statistic.apply(values)?;
    let n = values.len();
    let mut resample = vec![0.0; n];
    let mut replicates = Vec::with_capacity(n_boot);
    for _ in 0..n_boot {
        for slot in resample.iter_mut() {
            *slot = values[rng.gen_range(0..n)];
        }
        replicates.push(statistic.apply(&resample)?);
    }
    let replicates = sorted_copy(&replicates);
    let alpha = 1.0 - confidence;
    Ok(Interval {
        lower: percentile(&replicates, 0.5 * alpha),
        upper: percentile(&replicates, 1.0 - 0.5 * alpha),
        estimate,
    })
}

/// Bootstrap settings shared by every group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageOptions {
    /// Statistic bracketed by each interval.
    pub statistic: Statistic,
    /// Replicates per group.
    pub n_boot: usize,
    /// Nominal confidence level.
    pub confidence: f64,
}

impl Default for CoverageOptions {
    fn default() -> Self {
        Self {
            statistic: Statistic::P95,
            n_boot: 1000,
            confidence: 0.95,
        }
    }
}

/// Interval of one group and whether it brackets the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInterval {
    /// Group label.
    pub group: String,
    /// Sample count.
    pub n: usize,
    /// Bootstrap interval.
    #[serde(flatten)]
    pub interval: Interval,
    /// Reference inside the interval.
    pub covered: bool,
}

/// Empirical coverage of bootstrap intervals across groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Statistic bracketed by each interval.
    pub statistic: Statistic,
    /// Number of groups.
    pub n_groups: usize,
    /// Replicates per group.
    pub n_boot: usize,
    /// Nominal confidence level.
    pub confidence: f64,
    /// Value the intervals are tested against.
    pub reference: f64,
    /// Groups whose interval contains the reference.
    pub hits: usize,
    /// `hits / n_groups`.
    pub coverage: f64,
    /// Binomial standard error of `coverage`.
    pub coverage_stderr: f64,
    /// Mean interval width.
    pub mean_width: f64,
    /// Median interval width.
    pub median_width: f64,
    /// Per-group intervals in input order.
    pub intervals: Vec<GroupInterval>,
}

/// Fraction of groups whose bootstrap interval contains `reference`.
///
/// Without a reference the statistic of the pooled data is used. Group `i`
/// draws from sub-stream `i` of `seed`, so the report does not depend on the
/// number of worker threads.
pub fn coverage(
    groups: &[Group],
    reference: Option<f64>,
    opts: &CoverageOptions,
    seed: u64,
) -> Result<CoverageReport, McgtError> {
    check_settings(opts.n_boot, opts.confidence)?;
    if groups.is_empty() {
        return Err(McgtError::Stats(ErrorInfo::new(
            "coverage-no-groups",
            "coverage needs at least one group",
        )));
    }
    let reference = match reference {
        Some(value) if value.is_finite() => value,
        Some(value) => {
            return Err(McgtError::Stats(
                ErrorInfo::new("coverage-reference", "reference must be finite")
                    .with_context("reference", value.to_string()),
            ))
        }
        None => {
            let pooled: Vec<f64> = groups.iter().flat_map(|g| g.values.iter().copied()).collect();
            opts.statistic.apply(&pooled)?
        }
    };
    info!(
        groups = groups.len(),
        n_boot = opts.n_boot,
        statistic = opts.statistic.as_str(),
        reference,
        "bootstrap coverage"
    );

    let intervals = groups
        .par_iter()
        .enumerate()
        .map(|(index, group)| {
            let mut rng = RngHandle::substream(seed, index as u64);
            let interval = bootstrap_interval(
                &group.values,
                opts.statistic,
                opts.n_boot,
                opts.confidence,
                &mut rng,
            )
            .map_err(|err| err.with_context("group", &group.label))?;
            debug!(group = %group.label, lower = interval.lower, upper = interval.upper, "interval");
            Ok(GroupInterval {
                group: group.label.clone(),
                n: group.values.len(),
                covered: interval.contains(reference),
                interval,
            })
        })
        .collect::<Result<Vec<_>, McgtError>>()?;

    let n_groups = intervals.len();
    let hits = intervals.iter().filter(|g| g.covered).count();
    let coverage = hits as f64 / n_groups as f64;
    let widths: Vec<f64> = intervals.iter().map(|g| g.interval.width()).collect();
    Ok(CoverageReport {
        statistic: opts.statistic,
        n_groups,
        n_boot: opts.n_boot,
        confidence: opts.confidence,
        reference,
        hits,
        coverage,
        coverage_stderr: (coverage * (1.0 - coverage) / n_groups as f64).sqrt(),
        mean_width: widths.iter().sum::<f64>() / n_groups as f64,
        median_width: percentile(&sorted_copy(&widths), 0.5),
        intervals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_brackets_estimate_for_symmetric_sample() {
        let values: Vec<f64> = (0..200).map(|i| i as f64 / 10.0).collect();
        let mut rng = RngHandle::from_seed(11);
        let interval = bootstrap_interval(&values, Statistic::Mean, 400, 0.9, &mut rng).unwrap();
        assert!(interval.lower < interval.estimate);
        assert!(interval.estimate < interval.upper);
    }

    #[test]
    fn settings_are_validated() {
        let mut rng = RngHandle::from_seed(1);
        let err = bootstrap_interval(&[1.0], Statistic::Mean, 0, 0.9, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "bootstrap-replicates");
        let err = bootstrap_interval(&[1.0], Statistic::Mean, 10, 1.0, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "bootstrap-confidence");
        let err = bootstrap_interval(&[], Statistic::Mean, 10, 0.5, &mut rng).unwrap_err();
        assert_eq!(err.info().code, "empty-sample");
    }
}
