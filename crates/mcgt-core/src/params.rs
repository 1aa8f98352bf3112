//! Free-parameter descriptors shared by likelihoods and samplers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, McgtError};

/// Prior attached to a single free parameter on top of its hard bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Prior {
    /// Uniform density between `min` and `max`.
    #[default]
    Flat,
    /// Gaussian density truncated to the parameter bounds.
    Gaussian {
        /// Prior mean.
        mean: f64,
        /// Prior standard deviation.
        sigma: f64,
    },
}

/// Description of one sampled parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name understood by the target density.
    pub name: String,
    /// Lower hard bound.
    pub min: f64,
    /// Upper hard bound.
    pub max: f64,
    /// Starting value used to seed chains.
    pub start: f64,
    /// Characteristic proposal width.
    pub step: f64,
    /// Optional prior beyond the hard bounds.
    #[serde(default)]
    pub prior: Prior,
}

impl ParamSpec {
    /// Creates a flat-prior parameter.
    pub fn flat(name: impl Into<String>, min: f64, max: f64, start: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            start,
            step,
            prior: Prior::Flat,
        }
    }

    fn validate(&self) -> Result<(), McgtError> {
        let invalid = |message: &str| {
            McgtError::Config(
                ErrorInfo::new("param-invalid", message).with_context("param", self.name.clone()),
            )
        };
        if self.name.trim().is_empty() {
            return Err(invalid("parameter name must not be empty"));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(invalid("bounds must be finite with min < max"));
        }
        if !self.start.is_finite() || self.start < self.min || self.start > self.max {
            return Err(invalid("start value lies outside the bounds"));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(invalid("step must be positive"));
        }
        if let Prior::Gaussian { mean, sigma } = self.prior {
            if !mean.is_finite() || !(sigma.is_finite() && sigma > 0.0) {
                return Err(invalid("gaussian prior requires finite mean and sigma > 0"));
            }
        }
        Ok(())
    }

    fn log_prior(&self, value: f64) -> f64 {
        if !(value >= self.min && value <= self.max) {
            return f64::NEG_INFINITY;
        }
        match self.prior {
            Prior::Flat => 0.0,
            Prior::Gaussian { mean, sigma } => {
                let pull = (value - mean) / sigma;
                -0.5 * pull * pull
            }
        }
    }
}

/// Ordered, validated collection of [`ParamSpec`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParamSpec>", into = "Vec<ParamSpec>")]
pub struct ParamSet {
    specs: Vec<ParamSpec>,
}

impl ParamSet {
    /// Validates and wraps the parameter list.
    pub fn new(specs: Vec<ParamSpec>) -> Result<Self, McgtError> {
        if specs.is_empty() {
            return Err(McgtError::Config(ErrorInfo::new(
                "param-empty",
                "at least one free parameter is required",
            )));
        }
        let mut seen = BTreeSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(McgtError::Config(
                    ErrorInfo::new("param-duplicate", "parameter listed twice")
                        .with_context("param", spec.name.clone()),
                ));
            }
        }
        Ok(Self { specs })
    }

    /// Number of free parameters.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Always false for a validated set; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Borrow the underlying specs.
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    /// Parameter names in sampling order.
    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|spec| spec.name.clone()).collect()
    }

    /// Starting point in sampling order.
    pub fn starts(&self) -> Vec<f64> {
        self.specs.iter().map(|spec| spec.start).collect()
    }

    /// Proposal widths in sampling order.
    pub fn steps(&self) -> Vec<f64> {
        self.specs.iter().map(|spec| spec.step).collect()
    }

    /// Whether `theta` lies inside every hard bound.
    pub fn contains(&self, theta: &[f64]) -> bool {
        theta.len() == self.specs.len()
            && self
                .specs
                .iter()
                .zip(theta)
                .all(|(spec, &value)| value >= spec.min && value <= spec.max)
    }

    /// Clamps `theta` into the hard bounds in place.
    pub fn clamp(&self, theta: &mut [f64]) {
        for (spec, value) in self.specs.iter().zip(theta.iter_mut()) {
            *value = value.clamp(spec.min, spec.max);
        }
    }

    /// Log prior density up to a constant; `-inf` outside the bounds.
    pub fn log_prior(&self, theta: &[f64]) -> Result<f64, McgtError> {
        self.check_dim(theta)?;
        let mut total = 0.0;
        for (spec, &value) in self.specs.iter().zip(theta) {
            total += spec.log_prior(value);
            if total == f64::NEG_INFINITY {
                break;
            }
        }
        Ok(total)
    }

    /// Returns an error unless `theta` has one entry per parameter.
    pub fn check_dim(&self, theta: &[f64]) -> Result<(), McgtError> {
        if theta.len() != self.specs.len() {
            return Err(McgtError::Config(
                ErrorInfo::new("param-dimension", "parameter vector has the wrong length")
                    .with_context("expected", self.specs.len().to_string())
                    .with_context("actual", theta.len().to_string()),
            ));
        }
        Ok(())
    }
}

impl TryFrom<Vec<ParamSpec>> for ParamSet {
    type Error = McgtError;

    fn try_from(specs: Vec<ParamSpec>) -> Result<Self, Self::Error> {
        ParamSet::new(specs)
    }
}

impl From<ParamSet> for Vec<ParamSpec> {
    fn from(set: ParamSet) -> Self {
        set.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_prior_peaks_at_mean() {
        let mut spec = ParamSpec::flat("w0", -2.0, 0.0, -1.0, 0.1);
        spec.prior = Prior::Gaussian {
            mean: -1.0,
            sigma: 0.2,
        };
        let set = ParamSet::new(vec![spec]).unwrap();
        assert_eq!(set.log_prior(&[-1.0]).unwrap(), 0.0);
        assert!((set.log_prior(&[-0.8]).unwrap() + 0.5).abs() < 1e-12);
        assert_eq!(set.log_prior(&[0.5]).unwrap(), f64::NEG_INFINITY);
    }
}
