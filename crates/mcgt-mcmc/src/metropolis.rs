use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::{LogDensity, ParamSet, RngHandle};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AdaptationConfig;
use crate::determinism;

const MIN_SCALE: f64 = 1e-3;
const MAX_SCALE: f64 = 1e3;

/// Resumable state of a single Metropolis chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetropolisState {
    /// Current point.
    pub position: Vec<f64>,
    /// Log density at `position`.
    pub log_prob: f64,
    /// Current global proposal scale.
    pub scale: f64,
    /// Accepted proposals since the start of the run.
    pub accepted: usize,
    /// Proposals since the start of the run.
    pub proposed: usize,
    window_accepted: usize,
    window_proposed: usize,
}

impl MetropolisState {
    /// Starts at the parameter starting values.
    pub fn initialize<T: LogDensity + ?Sized>(
        params: &ParamSet,
        target: &T,
        scale: f64,
    ) -> Result<Self, McgtError> {
        let position = params.starts();
        let log_prob = target.log_density(&position)?;
        if !log_prob.is_finite() {
            return Err(McgtError::Sampler(
                ErrorInfo::new("initial-density", "log density at the starting point is not finite")
                    .with_context("position", format!("{position:?}"))
                    .with_hint("move the parameter start values into the supported region"),
            ));
        }
        Ok(Self {
            position,
            log_prob,
            scale,
            accepted: 0,
            proposed: 0,
            window_accepted: 0,
            window_proposed: 0,
        })
    }
}

/// Gaussian random-walk kernel with burn-in scale adaptation.
pub struct MetropolisKernel<'a> {
    params: &'a ParamSet,
    steps: Vec<f64>,
    adaptation: &'a AdaptationConfig,
    burn_in: usize,
}

impl<'a> MetropolisKernel<'a> {
    /// Kernel over `params` adapting during the first `burn_in` steps.
    pub fn new(params: &'a ParamSet, adaptation: &'a AdaptationConfig, burn_in: usize) -> Self {
        Self {
            params,
            steps: params.steps(),
            adaptation,
            burn_in,
        }
    }

    /// Advances `state` by one proposal; returns whether it was accepted.
    pub fn step<T: LogDensity + ?Sized>(
        &self,
        state: &mut MetropolisState,
        target: &T,
        master_seed: u64,
        step: usize,
    ) -> Result<bool, McgtError> {
        let mut rng = RngHandle::from_seed(determinism::move_seed(master_seed, 0, step, 0));
        let proposal: Vec<f64> = state
            .position
            .iter()
            .zip(&self.steps)
            .map(|(x, width)| {
                let z: f64 = rng.sample(StandardNormal);
                x + state.scale * width * z
            })
            .collect();
        let draw = rng.next_unit();

        let log_prob = if self.params.contains(&proposal) {
            target.log_density(&proposal)?
        } else {
            f64::NEG_INFINITY
        };
        let accepted = log_prob.is_finite() && draw.ln() < log_prob - state.log_prob;
        if accepted {
            state.position = proposal;
            state.log_prob = log_prob;
            state.accepted += 1;
            state.window_accepted += 1;
        }
        state.proposed += 1;
        state.window_proposed += 1;

        let interval = self.adaptation.interval;
        if step < self.burn_in && interval > 0 && (step + 1) % interval == 0 {
            self.adapt(state, step);
        }
        Ok(accepted)
    }

    fn adapt(&self, state: &mut MetropolisState, step: usize) {
        let rate = state.window_accepted as f64 / state.window_proposed.max(1) as f64;
        let scale = state.scale * (rate - self.adaptation.target_acceptance).exp();
        state.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        state.window_accepted = 0;
        state.window_proposed = 0;
        debug!(step, rate, scale = state.scale, "adapted proposal scale");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcgt_core::ParamSpec;

    struct Flat;

    impl LogDensity for Flat {
        fn dim(&self) -> usize {
            1
        }

        fn param_names(&self) -> Vec<String> {
            vec!["x".into()]
        }

        fn log_density(&self, _theta: &[f64]) -> Result<f64, McgtError> {
            Ok(0.0)
        }
    }

    #[test]
    fn full_acceptance_grows_scale_during_burn_in() {
        let params = ParamSet::new(vec![ParamSpec::flat("x", -1e9, 1e9, 0.0, 1.0)]).unwrap();
        let adaptation = AdaptationConfig {
            interval: 10,
            target_acceptance: 0.25,
        };
        let kernel = MetropolisKernel::new(&params, &adaptation, 20);
        let mut state = MetropolisState::initialize(&params, &Flat, 1.0).unwrap();
        for step in 0..40 {
            assert!(kernel.step(&mut state, &Flat, 3, step).unwrap());
        }
        let expected = (0.75f64).exp().powi(2);
        assert!((state.scale - expected).abs() < 1e-12);
        assert_eq!(state.accepted, 40);
    }
}
