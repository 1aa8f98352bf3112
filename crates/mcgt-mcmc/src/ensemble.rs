use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::{LogDensity, ParamSet, RngHandle};
use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::determinism;

const MAX_INIT_ATTEMPTS: usize = 100;

/// Resumable state of a stretch-move ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleState {
    /// Walker positions.
    pub walkers: Vec<Vec<f64>>,
    /// Log density of each walker.
    pub log_probs: Vec<f64>,
    /// Accepted stretch moves since the start of the run.
    pub accepted: usize,
    /// Stretch moves since the start of the run.
    pub proposed: usize,
}

/// Goodman-Weare stretch move over two alternating halves of the ensemble.
pub struct StretchKernel<'a> {
    params: &'a ParamSet,
    stretch: f64,
}

impl<'a> StretchKernel<'a> {
    /// Kernel with scale `stretch` (commonly 2).
    pub fn new(params: &'a ParamSet, stretch: f64) -> Self {
        Self { params, stretch }
    }

    /// Draws `walkers` points in a Gaussian ball around the starting values.
    ///
    /// Points are clamped into the bounds and redrawn while their density is
    /// not finite.
    pub fn initialize<T: LogDensity + ?Sized>(
        &self,
        target: &T,
        walkers: usize,
        spread: f64,
        master_seed: u64,
    ) -> Result<EnsembleState, McgtError> {
        let starts = self.params.starts();
        let widths = self.params.steps();
        let drawn = (0..walkers)
            .into_par_iter()
            .map(|walker| {
                let mut rng = RngHandle::from_seed(determinism::init_seed(master_seed, walker));
                for _ in 0..MAX_INIT_ATTEMPTS {
                    let mut point: Vec<f64> = starts
                        .iter()
                        .zip(&widths)
                        .map(|(start, width)| {
                            let z: f64 = rng.sample(StandardNormal);
                            start + spread * width * z
                        })
                        .collect();
                    self.params.clamp(&mut point);
                    let log_prob = target.log_density(&point)?;
                    if log_prob.is_finite() {
                        return Ok((point, log_prob));
                    }
                }
                Err(McgtError::Sampler(
                    ErrorInfo::new("walker-init", "no finite starting point found")
                        .with_context("walker", walker.to_string())
                        .with_context("attempts", MAX_INIT_ATTEMPTS.to_string())
                        .with_hint("reduce init_spread or move the start values"),
                ))
            })
            .collect::<Result<Vec<_>, McgtError>>()?;
        let (walkers, log_probs) = drawn.into_iter().unzip();
        Ok(EnsembleState {
            walkers,
            log_probs,
            accepted: 0,
            proposed: 0,
        })
    }

    /// Updates the first half against the second, then the second against the updated first.
    pub fn step<T: LogDensity + ?Sized>(
        &self,
        state: &mut EnsembleState,
        target: &T,
        master_seed: u64,
        step: usize,
    ) -> Result<(), McgtError> {
        let n = state.walkers.len();
        let half = n / 2;
        for (active, others) in [(0..half, half..n), (half..n, 0..half)] {
            // Proposals read only the snapshot and draw from per-walker seeds,
            // so the thread schedule cannot change the outcome.
            let snapshot: &EnsembleState = state;
            let moves = active
                .into_par_iter()
                .map(|k| self.propose(snapshot, target, master_seed, step, k, others.clone()))
                .collect::<Result<Vec<_>, McgtError>>()?;
            for (k, update) in moves {
                state.proposed += 1;
                if let Some((point, log_prob)) = update {
                    state.walkers[k] = point;
                    state.log_probs[k] = log_prob;
                    state.accepted += 1;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn propose<T: LogDensity + ?Sized>(
        &self,
        state: &EnsembleState,
        target: &T,
        master_seed: u64,
        step: usize,
        k: usize,
        others: std::ops::Range<usize>,
    ) -> Result<(usize, Option<(Vec<f64>, f64)>), McgtError> {
        let mut rng = RngHandle::from_seed(determinism::move_seed(master_seed, k, step, 0));
        let j = rng.gen_range(others);
        let u = rng.next_unit();
        let draw = rng.next_unit();
        let a = self.stretch;
        let z = ((a - 1.0) * u + 1.0).powi(2) / a;

        let current = &state.walkers[k];
        let partner = &state.walkers[j];
        let proposal: Vec<f64> = current
            .iter()
            .zip(partner)
            .map(|(x_k, x_j)| x_j + z * (x_k - x_j))
            .collect();
        let log_prob = if self.params.contains(&proposal) {
            target.log_density(&proposal)?
        } else {
            f64::NEG_INFINITY
        };
        if !log_prob.is_finite() {
            return Ok((k, None));
        }
        let dim = current.len() as f64;
        let log_ratio = (dim - 1.0) * z.ln() + log_prob - state.log_probs[k];
        if draw.ln() < log_ratio {
            Ok((k, Some((proposal, log_prob))))
        } else {
            Ok((k, None))
        }
    }
}
