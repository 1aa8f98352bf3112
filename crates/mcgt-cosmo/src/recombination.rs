//! Recombination and drag epochs, sound horizons and CMB shift parameters.

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

use crate::background::Background;
use crate::distance::Distances;
use crate::integrate::simpson;
use crate::params::{CosmoModel, CosmoParams};

/// Photon decoupling redshift z*(ωb, ωm), Hu & Sugiyama (1996).
pub fn z_star(ombh2: f64, ommh2: f64) -> f64 {
    let g1 = 0.0783 * ombh2.powf(-0.238) / (1.0 + 39.5 * ombh2.powf(0.763));
    let g2 = 0.560 / (1.0 + 21.1 * ombh2.powf(1.81));
    1048.0 * (1.0 + 0.00124 * ombh2.powf(-0.738)) * (1.0 + g1 * ommh2.powf(g2))
}

/// Baryon drag redshift z_d(ωb, ωm), Eisenstein & Hu (1998).
pub fn z_drag(ombh2: f64, ommh2: f64) -> f64 {
    let b1 = 0.313 * ommh2.powf(-0.419) * (1.0 + 0.607 * ommh2.powf(0.674));
    let b2 = 0.238 * ommh2.powf(0.223);
    1291.0 * ommh2.powf(0.251) / (1.0 + 0.659 * ommh2.powf(0.828)) * (1.0 + b1 * ombh2.powf(b2))
}

/// Comoving sound horizon at redshift `z` in Mpc.
///
/// Integrates c_s / (a² H) over the scale factor from 0, where a² E(a) stays
/// finite thanks to the radiation term.
pub fn sound_horizon(
    background: &Background,
    params: &CosmoParams,
    z: f64,
    steps: usize,
) -> Result<f64, McgtError> {
    let omega_gamma_h2 = params.omega_gamma_h2();
    if !(omega_gamma_h2 > 0.0) {
        return Err(McgtError::Cosmology(
            ErrorInfo::new("no-radiation", "sound horizon needs a positive photon density")
                .with_context("t_cmb", params.t_cmb.to_string()),
        ));
    }
    if !(z >= 0.0 && z.is_finite()) {
        return Err(McgtError::Cosmology(
            ErrorInfo::new("redshift-out-of-range", "sound horizon needs z >= 0")
                .with_context("z", z.to_string()),
        ));
    }
    let baryon_ratio = 3.0 * params.ombh2 / (4.0 * omega_gamma_h2);
    let a_end = 1.0 / (1.0 + z);
    let steps = steps.max(2);
    let integral = simpson(
        |a| {
            let r = baryon_ratio * a;
            Ok(1.0 / ((3.0 * (1.0 + r)).sqrt() * background.a2e(a)?))
        },
        0.0,
        a_end,
        steps + steps % 2,
    )?;
    Ok(background.hubble_distance() * integral)
}

/// Characteristic redshifts and sound horizons of recombination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecombinationSummary {
    /// Photon decoupling redshift.
    pub z_star: f64,
    /// Baryon drag redshift.
    pub z_drag: f64,
    /// Sound horizon at decoupling in Mpc.
    pub r_s_star: f64,
    /// Sound horizon at the drag epoch in Mpc.
    pub r_drag: f64,
}

impl RecombinationSummary {
    /// Evaluates the summary for `model`.
    pub fn compute(model: &CosmoModel) -> Result<Self, McgtError> {
        let background = Background::new(&model.params)?;
        Self::with_background(model, &background)
    }

    /// Evaluates the summary reusing an already validated background.
    pub fn with_background(
        model: &CosmoModel,
        background: &Background,
    ) -> Result<Self, McgtError> {
        let params = &model.params;
        let steps = model.numerics.sound_horizon_steps;
        let z_star = z_star(params.ombh2, params.ommh2());
        let z_drag = z_drag(params.ombh2, params.ommh2());
        Ok(Self {
            z_star,
            z_drag,
            r_s_star: sound_horizon(background, params, z_star, steps)?,
            r_drag: sound_horizon(background, params, z_drag, steps)?,
        })
    }
}

/// Compressed CMB likelihood observables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmbShift {
    /// Decoupling redshift the shift parameters are evaluated at.
    pub z_star: f64,
    /// Shift parameter R = √Ωm D_M(z*) H0 / c.
    pub r_shift: f64,
    /// Acoustic scale l_A = π D_M(z*) / r_s(z*).
    pub l_a: f64,
    /// Physical baryon density, passed through for the prior vector.
    pub omega_b_h2: f64,
}

impl CmbShift {
    /// Evaluates the shift parameters for `model`.
    pub fn compute(model: &CosmoModel) -> Result<Self, McgtError> {
        let distances = Distances::new(
            Background::new(&model.params)?,
            model.numerics.distance_steps,
        );
        Self::with_distances(model, &distances)
    }

    /// Evaluates the shift parameters reusing an existing distance calculator.
    pub fn with_distances(model: &CosmoModel, distances: &Distances) -> Result<Self, McgtError> {
        let background = distances.background();
        let params = &model.params;
        let z_star = z_star(params.ombh2, params.ommh2());
        let d_m = distances.transverse_comoving_distance(z_star)?;
        let r_s = sound_horizon(
            background,
            params,
            z_star,
            model.numerics.sound_horizon_steps,
        )?;
        Ok(Self {
            z_star,
            r_shift: background.omega_m().sqrt() * d_m / background.hubble_distance(),
            l_a: std::f64::consts::PI * d_m / r_s,
            omega_b_h2: params.ombh2,
        })
    }
}
