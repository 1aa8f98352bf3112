#![deny(missing_docs)]
#![doc = "Percentile summaries and bootstrap coverage for MCGT Monte Carlo diagnostics."]

/// Bootstrap intervals and their empirical coverage.
pub mod bootstrap;
/// Grouped CSV samples.
pub mod groups;
/// Percentiles, p95 summaries and phase wrapping.
pub mod quantile;

pub use bootstrap::{
    bootstrap_interval, coverage, CoverageOptions, CoverageReport, GroupInterval, Interval,
};
pub use groups::{load_groups, Group};
pub use quantile::{p95, p95_abs, percentile, wrap_phase, Quantiles, Statistic};
