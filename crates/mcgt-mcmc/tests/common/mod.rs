#![allow(dead_code)]

use mcgt_core::{LogDensity, McgtError, ParamSet, ParamSpec};
use mcgt_mcmc::{RunConfig, SamplerConfig};

/// Independent Gaussian with the given means and widths.
pub struct Gaussian {
    pub mean: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl Gaussian {
    pub fn standard_pair() -> Self {
        Self {
            mean: vec![1.0, -2.0],
            sigma: vec![0.5, 2.0],
        }
    }
}

impl LogDensity for Gaussian {
    fn dim(&self) -> usize {
        self.mean.len()
    }

    fn param_names(&self) -> Vec<String> {
        (0..self.mean.len()).map(|i| format!("x{i}")).collect()
    }

    fn log_density(&self, theta: &[f64]) -> Result<f64, McgtError> {
        Ok(theta
            .iter()
            .zip(self.mean.iter().zip(&self.sigma))
            .map(|(x, (m, s))| -0.5 * ((x - m) / s).powi(2))
            .sum())
    }
}

pub fn pair_params() -> ParamSet {
    ParamSet::new(vec![
        ParamSpec::flat("x0", -20.0, 20.0, 0.0, 0.5),
        ParamSpec::flat("x1", -20.0, 20.0, 0.0, 2.0),
    ])
    .unwrap()
}

pub fn metropolis_config(steps: usize) -> RunConfig {
    let mut config = RunConfig::new(pair_params(), steps);
    config.burn_in = steps / 10;
    config
}

pub fn ensemble_config(steps: usize, walkers: usize) -> RunConfig {
    let mut config = RunConfig::new(pair_params(), steps);
    config.sampler = SamplerConfig::Ensemble {
        walkers,
        stretch: 2.0,
        init_spread: 1.0,
    };
    config.burn_in = steps / 5;
    config
}
