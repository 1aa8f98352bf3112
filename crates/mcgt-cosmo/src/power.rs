//! Linear matter power spectrum normalised to sigma8.

use std::f64::consts::{E, PI};

use mcgt_core::errors::{ErrorInfo, McgtError};

use crate::growth::GrowthSolver;
use crate::integrate::simpson;
use crate::params::CosmoParams;

const LN_K_MIN: f64 = -11.512_925_464_970_229; // ln 1e-5
const LN_K_MAX: f64 = 4.605_170_185_988_092; // ln 1e2
const SIGMA_STEPS: usize = 2048;

/// Fourier transform of a spherical top hat.
fn top_hat(x: f64) -> f64 {
    if x < 1e-3 {
        return 1.0 - x * x / 10.0;
    }
    3.0 * (x.sin() - x * x.cos()) / (x * x * x)
}

/// Linear matter power spectrum with the Eisenstein–Hu no-wiggle transfer function.
///
/// Wavenumbers are in Mpc⁻¹ and powers in Mpc³. The amplitude is fixed so the
/// z = 0 spectrum reproduces `sigma8`.
#[derive(Debug, Clone)]
pub struct PowerSpectrum {
    h: f64,
    n_s: f64,
    omega_m: f64,
    theta2: f64,
    sound_horizon: f64,
    alpha_gamma: f64,
    amplitude: f64,
}

impl PowerSpectrum {
    /// Builds and normalises the spectrum for `params`.
    pub fn new(params: &CosmoParams) -> Result<Self, McgtError> {
        params.validate()?;
        let ommh2 = params.ommh2();
        let fb = params.ombh2 / ommh2;
        let t_cmb = if params.t_cmb > 0.0 { params.t_cmb } else { 2.7255 };
        let theta = t_cmb / 2.7;
        let mut spectrum = Self {
            h: params.h(),
            n_s: params.n_s,
            omega_m: params.omega_m(),
            theta2: theta * theta,
            sound_horizon: 44.5 * (9.83 / ommh2).ln()
                / (1.0 + 10.0 * params.ombh2.powf(0.75)).sqrt(),
            alpha_gamma: 1.0 - 0.328 * (431.0 * ommh2).ln() * fb
                + 0.38 * (22.3 * ommh2).ln() * fb * fb,
            amplitude: 1.0,
        };
        let sigma = spectrum.sigma_r(8.0 / spectrum.h)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("power-normalisation", "unnormalised sigma8 is not positive")
                    .with_context("sigma", sigma.to_string()),
            ));
        }
        spectrum.amplitude = (params.sigma8 / sigma).powi(2);
        Ok(spectrum)
    }

    /// No-wiggle transfer function T(k), k in Mpc⁻¹.
    pub fn transfer(&self, k: f64) -> f64 {
        let ks = 0.43 * k * self.sound_horizon;
        let gamma_eff = self.omega_m
            * self.h
            * (self.alpha_gamma + (1.0 - self.alpha_gamma) / (1.0 + ks.powi(4)));
        let q = k * self.theta2 / (gamma_eff * self.h);
        let l0 = (2.0 * E + 1.8 * q).ln();
        let c0 = 14.2 + 731.0 / (1.0 + 62.5 * q);
        l0 / (l0 + c0 * q * q)
    }

    /// Linear power today at wavenumber `k`.
    pub fn linear_z0(&self, k: f64) -> f64 {
        let t = self.transfer(k);
        self.amplitude * k.powf(self.n_s) * t * t
    }

    /// RMS linear fluctuation today in spheres of radius `r` Mpc.
    pub fn sigma_r(&self, r: f64) -> Result<f64, McgtError> {
        let variance = simpson(
            |ln_k| {
                let k = ln_k.exp();
                let w = top_hat(k * r);
                Ok(k * k * k * self.linear_z0(k) * w * w)
            },
            LN_K_MIN,
            LN_K_MAX,
            SIGMA_STEPS,
        )? / (2.0 * PI * PI);
        Ok(variance.sqrt())
    }

    /// P(k, z) = P(k, 0) D(z)² for every wavenumber in `ks`.
    pub fn at_redshift(
        &self,
        ks: &[f64],
        z: f64,
        growth: &GrowthSolver,
    ) -> Result<Vec<f64>, McgtError> {
        let table = growth.solve_redshifts(&[z])?;
        let d = table.d[0];
        Ok(ks.iter().map(|&k| self.linear_z0(k) * d * d).collect())
    }
}
