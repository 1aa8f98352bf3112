//! Linear growth D(a) and growth rate f(a) under a modified-gravity coupling.

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::background::Background;
use crate::ode::{Dopri5, OdeSystem};
use crate::params::CosmoModel;

/// Growth equation in x = ln a with state (D, dD/d ln a).
struct GrowthOde<'a> {
    background: &'a Background,
    mu0: f64,
}

impl GrowthOde<'_> {
    fn mu(&self, a: f64) -> Result<f64, McgtError> {
        let today = self.background.omega_de();
        if self.mu0 == 0.0 || today.abs() < 1e-12 {
            return Ok(1.0);
        }
        Ok(1.0 + self.mu0 * self.background.omega_de_at(a)? / today)
    }
}

impl OdeSystem for GrowthOde<'_> {
    fn dim(&self) -> usize {
        2
    }

    fn rhs(&self, x: f64, y: &[f64], dydt: &mut [f64]) -> Result<(), McgtError> {
        let a = x.exp();
        let friction = 2.0 + self.background.dlnh_dlna(a)?;
        let source = 1.5 * self.mu(a)? * self.background.omega_m_at(a)?;
        dydt[0] = y[1];
        dydt[1] = -friction * y[1] + source * y[0];
        Ok(())
    }
}

/// Growth factor and rate at the requested scale factors, normalised to D(1) = 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthTable {
    /// Scale factors in request order.
    pub a: Vec<f64>,
    /// Matching redshifts.
    pub z: Vec<f64>,
    /// Normalised growth factor D(a).
    pub d: Vec<f64>,
    /// Growth rate f = d ln D / d ln a.
    pub f: Vec<f64>,
}

impl GrowthTable {
    /// fσ8(a) = f(a) σ8 D(a).
    pub fn fsigma8(&self, sigma8: f64) -> Vec<f64> {
        self.f
            .iter()
            .zip(&self.d)
            .map(|(f, d)| f * sigma8 * d)
            .collect()
    }
}

/// Linear growth solver for a fixed model.
#[derive(Debug, Clone)]
pub struct GrowthSolver {
    background: Background,
    mu0: f64,
    sigma8: f64,
    a_init: f64,
    integrator: Dopri5,
}

impl GrowthSolver {
    /// Validates `model` and prepares the integrator from its numerics section.
    pub fn new(model: &CosmoModel) -> Result<Self, McgtError> {
        model.validate()?;
        Ok(Self {
            background: Background::new(&model.params)?,
            mu0: model.gravity.mu0,
            sigma8: model.params.sigma8,
            a_init: model.numerics.growth_a_init,
            integrator: Dopri5 {
                rtol: model.numerics.rtol,
                atol: model.numerics.atol,
                ..Dopri5::default()
            },
        })
    }

    /// Borrow the background used by the solver.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Earliest scale factor the solver can report.
    pub fn a_init(&self) -> f64 {
        self.a_init
    }

    /// Integrates the growth equation and samples it at `scale_factors`.
    pub fn solve(&self, scale_factors: &[f64]) -> Result<GrowthTable, McgtError> {
        for &a in scale_factors {
            if !(a >= self.a_init && a <= 1.0) {
                return Err(McgtError::Cosmology(
                    ErrorInfo::new("scale-factor-out-of-range", "requested scale factor outside the growth range")
                        .with_context("a", a.to_string())
                        .with_context("a_init", self.a_init.to_string()),
                ));
            }
        }
        let mut grid: Vec<f64> = scale_factors.to_vec();
        grid.push(1.0);
        grid.sort_by(f64::total_cmp);
        grid.dedup();
        let x_eval: Vec<f64> = grid.iter().map(|a| a.ln()).collect();

        let ode = GrowthOde {
            background: &self.background,
            mu0: self.mu0,
        };
        let states = self.integrator.solve(
            &ode,
            self.a_init.ln(),
            &[self.a_init, self.a_init],
            &x_eval,
        )?;
        let d_today = states
            .last()
            .map(|state| state[0])
            .filter(|value| value.is_finite() && *value > 0.0)
            .ok_or_else(|| {
                McgtError::Integration(ErrorInfo::new(
                    "growth-normalisation",
                    "growth factor today is not positive",
                ))
            })?;
        debug!(d_today, points = grid.len(), "growth solve finished");

        let mut table = GrowthTable {
            a: Vec::with_capacity(scale_factors.len()),
            z: Vec::with_capacity(scale_factors.len()),
            d: Vec::with_capacity(scale_factors.len()),
            f: Vec::with_capacity(scale_factors.len()),
        };
        for &a in scale_factors {
            let idx = grid
                .binary_search_by(|node| node.total_cmp(&a))
                .map_err(|_| {
                    McgtError::Integration(
                        ErrorInfo::new("growth-lookup", "scale factor missing from the solve grid")
                            .with_context("a", a.to_string()),
                    )
                })?;
            let state = &states[idx];
            table.a.push(a);
            table.z.push(1.0 / a - 1.0);
            table.d.push(state[0] / d_today);
            table.f.push(state[1] / state[0]);
        }
        Ok(table)
    }

    /// Growth table at redshifts rather than scale factors.
    pub fn solve_redshifts(&self, redshifts: &[f64]) -> Result<GrowthTable, McgtError> {
        let scale_factors: Vec<f64> = redshifts.iter().map(|z| 1.0 / (1.0 + z)).collect();
        self.solve(&scale_factors)
    }

    /// fσ8 at each redshift.
    pub fn fsigma8(&self, redshifts: &[f64]) -> Result<Vec<f64>, McgtError> {
        Ok(self.solve_redshifts(redshifts)?.fsigma8(self.sigma8))
    }

    /// Growth index γ(a) = ln f / ln Ωm(a).
    pub fn growth_index(&self, a: f64) -> Result<f64, McgtError> {
        let table = self.solve(&[a])?;
        let omega_m = self.background.omega_m_at(a)?;
        if (omega_m - 1.0).abs() < 1e-12 {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("growth-index-undefined", "growth index is undefined when Ωm(a) = 1")
                    .with_context("a", a.to_string()),
            ));
        }
        Ok(table.f[0].ln() / omega_m.ln())
    }
}
