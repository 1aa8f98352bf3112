//! Fixed-step RK4 and adaptive Dormand–Prince integrators.

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

/// First-order system dy/dt = f(t, y).
pub trait OdeSystem {
    /// Number of state components.
    fn dim(&self) -> usize;

    /// Writes f(t, y) into `dydt`.
    fn rhs(&self, t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), McgtError>;
}

fn check_state<S: OdeSystem + ?Sized>(system: &S, y0: &[f64]) -> Result<(), McgtError> {
    if y0.len() != system.dim() {
        return Err(McgtError::Integration(
            ErrorInfo::new("ode-dimension", "initial state has the wrong length")
                .with_context("expected", system.dim().to_string())
                .with_context("actual", y0.len().to_string()),
        ));
    }
    Ok(())
}

fn non_finite(t: f64) -> McgtError {
    McgtError::Integration(
        ErrorInfo::new("ode-non-finite", "state became non-finite").with_context("t", t.to_string()),
    )
}

/// Classical fourth-order Runge–Kutta with `steps` equal steps from `t0` to `t1`.
pub fn integrate_rk4<S: OdeSystem + ?Sized>(
    system: &S,
    t0: f64,
    y0: &[f64],
    t1: f64,
    steps: usize,
) -> Result<Vec<f64>, McgtError> {
    check_state(system, y0)?;
    if steps == 0 {
        return Err(McgtError::Integration(ErrorInfo::new(
            "ode-steps",
            "rk4 needs at least one step",
        )));
    }
    let n = y0.len();
    let h = (t1 - t0) / steps as f64;
    let mut y = y0.to_vec();
    let mut k1 = vec![0.0; n];
    let mut k2 = vec![0.0; n];
    let mut k3 = vec![0.0; n];
    let mut k4 = vec![0.0; n];
    let mut tmp = vec![0.0; n];
    for i in 0..steps {
        let t = t0 + i as f64 * h;
        system.rhs(t, &y, &mut k1)?;
        for j in 0..n {
            tmp[j] = y[j] + 0.5 * h * k1[j];
        }
        system.rhs(t + 0.5 * h, &tmp, &mut k2)?;
        for j in 0..n {
            tmp[j] = y[j] + 0.5 * h * k2[j];
        }
        system.rhs(t + 0.5 * h, &tmp, &mut k3)?;
        for j in 0..n {
            tmp[j] = y[j] + h * k3[j];
        }
        system.rhs(t + h, &tmp, &mut k4)?;
        for j in 0..n {
            y[j] += h / 6.0 * (k1[j] + 2.0 * k2[j] + 2.0 * k3[j] + k4[j]);
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(non_finite(t + h));
        }
    }
    Ok(y)
}

// Dormand–Prince 5(4) tableau.
const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
const B: [f64; 7] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Adaptive Dormand–Prince 5(4) integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dopri5 {
    /// Relative tolerance per component.
    pub rtol: f64,
    /// Absolute tolerance per component.
    pub atol: f64,
    /// Magnitude of the first trial step.
    pub h_init: f64,
    /// Maximum number of attempted steps across the whole solve.
    pub max_steps: usize,
}

impl Default for Dopri5 {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            h_init: 1e-2,
            max_steps: 100_000,
        }
    }
}

impl Dopri5 {
    /// Integrates from `(t0, y0)` and returns the state at every time in `t_eval`.
    ///
    /// Steps are shortened so each output time is hit exactly rather than
    /// interpolated. `t_eval` must be strictly monotone in the direction of
    /// integration; its first entry may equal `t0`.
    pub fn solve<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64],
        t_eval: &[f64],
    ) -> Result<Vec<Vec<f64>>, McgtError> {
        check_state(system, y0)?;
        if !(self.rtol > 0.0 && self.atol > 0.0 && self.h_init > 0.0) {
            return Err(McgtError::Config(
                ErrorInfo::new("ode-settings", "tolerances and initial step must be positive")
                    .with_context("rtol", self.rtol.to_string())
                    .with_context("atol", self.atol.to_string())
                    .with_context("h_init", self.h_init.to_string()),
            ));
        }
        let Some(&last) = t_eval.last() else {
            return Ok(Vec::new());
        };
        let direction = if last >= t0 { 1.0 } else { -1.0 };
        let mut previous = t0;
        for (idx, &t) in t_eval.iter().enumerate() {
            let ahead = (t - previous) * direction;
            if !t.is_finite() || ahead < 0.0 || (idx > 0 && ahead == 0.0) {
                return Err(McgtError::Integration(
                    ErrorInfo::new("ode-t-eval", "output times must be strictly monotone")
                        .with_context("index", idx.to_string())
                        .with_context("t", t.to_string()),
                ));
            }
            previous = t;
        }

        let n = y0.len();
        let mut stages = vec![vec![0.0; n]; 7];
        let mut scratch = vec![0.0; n];
        let mut y = y0.to_vec();
        let mut y_new = vec![0.0; n];
        let mut t = t0;
        let mut h = self.h_init * direction;
        let mut attempts = 0usize;
        let mut out = Vec::with_capacity(t_eval.len());

        for &target in t_eval {
            while (target - t) * direction > 0.0 {
                if attempts >= self.max_steps {
                    return Err(McgtError::Integration(
                        ErrorInfo::new("ode-max-steps", "step budget exhausted")
                            .with_context("max_steps", self.max_steps.to_string())
                            .with_context("t", t.to_string()),
                    ));
                }
                attempts += 1;
                let lands = (t + h - target) * direction >= 0.0;
                let step = if lands { target - t } else { h };

                let err = self.attempt(system, t, &y, step, &mut stages, &mut scratch, &mut y_new)?;
                let accepted = err <= 1.0;
                if accepted {
                    t = if lands { target } else { t + step };
                    std::mem::swap(&mut y, &mut y_new);
                    if y.iter().any(|v| !v.is_finite()) {
                        return Err(non_finite(t));
                    }
                }
                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // A landing step is clipped to the output time, so it says
                // nothing about the step the solution can actually take.
                h = if lands && accepted {
                    h.abs().max((step * factor).abs()) * direction
                } else {
                    step * factor
                };
                if !accepted && h.abs() <= 1e-14 * t.abs().max(1.0) {
                    return Err(McgtError::Integration(
                        ErrorInfo::new("ode-step-underflow", "step size collapsed")
                            .with_context("t", t.to_string())
                            .with_context("h", h.to_string()),
                    ));
                }
            }
            out.push(y.clone());
        }
        Ok(out)
    }

    /// One trial step; returns the scaled error norm and fills `y_new`.
    #[allow(clippy::too_many_arguments)]
    fn attempt<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t: f64,
        y: &[f64],
        h: f64,
        stages: &mut [Vec<f64>],
        scratch: &mut [f64],
        y_new: &mut [f64],
    ) -> Result<f64, McgtError> {
        let n = y.len();
        for s in 0..7 {
            for j in 0..n {
                let mut acc = y[j];
                for (r, stage) in stages.iter().enumerate().take(s) {
                    acc += h * A[s][r] * stage[j];
                }
                scratch[j] = acc;
            }
            system.rhs(t + C[s] * h, scratch, &mut stages[s])?;
        }
        let mut sum = 0.0;
        for j in 0..n {
            let mut high = y[j];
            let mut err = 0.0;
            for s in 0..7 {
                high += h * B[s] * stages[s][j];
                err += h * E[s] * stages[s][j];
            }
            y_new[j] = high;
            let scale = self.atol + self.rtol * y[j].abs().max(high.abs());
            sum += (err / scale).powi(2);
        }
        let norm = (sum / n.max(1) as f64).sqrt();
        if !norm.is_finite() {
            return Ok(f64::INFINITY);
        }
        Ok(norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;

    impl OdeSystem for Decay {
        fn dim(&self) -> usize {
            1
        }

        fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), McgtError> {
            dydt[0] = -y[0];
            Ok(())
        }
    }

    #[test]
    fn rk4_tracks_exponential_decay() {
        let y = integrate_rk4(&Decay, 0.0, &[1.0], 1.0, 100).unwrap();
        assert!((y[0] - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn unordered_outputs_are_rejected() {
        let err = Dopri5::default()
            .solve(&Decay, 0.0, &[1.0], &[0.5, 0.2])
            .unwrap_err();
        assert_eq!(err.info().code, "ode-t-eval");
    }

    #[test]
    fn output_times_a_few_ulps_apart_keep_the_step_size() {
        let close = f64::from_bits(0.5f64.to_bits() + 2);
        let out = Dopri5::default()
            .solve(&Decay, 0.0, &[1.0], &[0.5, close, 2.0])
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!((out[2][0] - (-2.0f64).exp()).abs() < 1e-8);
    }
}
