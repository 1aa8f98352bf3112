//! Comoving, angular-diameter and luminosity distances, distance moduli and D_V.

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

use crate::background::Background;
use crate::integrate::{cumulative_trapezoid, simpson};

fn negative_redshift(z: f64) -> McgtError {
    McgtError::Cosmology(
        ErrorInfo::new("redshift-out-of-range", "distances need a non-negative redshift")
            .with_context("z", z.to_string()),
    )
}

/// Maps a line-of-sight comoving distance to the transverse one for curvature Ωk.
fn transverse(dc: f64, dh: f64, omega_k: f64) -> f64 {
    if omega_k.abs() < 1e-12 {
        return dc;
    }
    let sqrt_k = omega_k.abs().sqrt();
    let x = sqrt_k * dc / dh;
    if omega_k > 0.0 {
        dh / sqrt_k * x.sinh()
    } else {
        dh / sqrt_k * x.sin()
    }
}

/// Distance calculator over a background, integrating 1/E(z) on demand.
#[derive(Debug, Clone)]
pub struct Distances {
    background: Background,
    steps: usize,
}

impl Distances {
    /// Wraps `background`, using `steps` Simpson intervals (rounded up to even).
    pub fn new(background: Background, steps: usize) -> Self {
        let steps = steps.max(2);
        Self {
            background,
            steps: steps + steps % 2,
        }
    }

    /// Borrow the underlying background.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Line-of-sight comoving distance in Mpc.
    pub fn comoving_distance(&self, z: f64) -> Result<f64, McgtError> {
        if !(z >= 0.0) || !z.is_finite() {
            return Err(negative_redshift(z));
        }
        if z == 0.0 {
            return Ok(0.0);
        }
        // Integrate in ln(1+z), where the integrand (1+z)/E is smooth.
        let integral = simpson(
            |x| {
                let one_plus_z = x.exp();
                Ok(one_plus_z / self.background.e(one_plus_z - 1.0)?)
            },
            0.0,
            z.ln_1p(),
            self.steps,
        )?;
        Ok(self.background.hubble_distance() * integral)
    }

    /// Transverse comoving distance D_M in Mpc.
    pub fn transverse_comoving_distance(&self, z: f64) -> Result<f64, McgtError> {
        let dc = self.comoving_distance(z)?;
        Ok(transverse(
            dc,
            self.background.hubble_distance(),
            self.background.omega_k(),
        ))
    }

    /// Luminosity distance D_L = (1+z) D_M in Mpc.
    pub fn luminosity_distance(&self, z: f64) -> Result<f64, McgtError> {
        Ok((1.0 + z) * self.transverse_comoving_distance(z)?)
    }

    /// Angular diameter distance D_A = D_M / (1+z) in Mpc.
    pub fn angular_diameter_distance(&self, z: f64) -> Result<f64, McgtError> {
        Ok(self.transverse_comoving_distance(z)? / (1.0 + z))
    }

    /// Radial Hubble distance c / H(z) in Mpc.
    pub fn hubble_distance_at(&self, z: f64) -> Result<f64, McgtError> {
        Ok(self.background.hubble_distance() / self.background.e(z)?)
    }

    /// Volume-averaged distance D_V = [z D_M² D_H]^{1/3} in Mpc.
    pub fn volume_distance(&self, z: f64) -> Result<f64, McgtError> {
        let dm = self.transverse_comoving_distance(z)?;
        let dh = self.hubble_distance_at(z)?;
        Ok((z * dm * dm * dh).cbrt())
    }

    /// Distance modulus μ = 5 log10(D_L / Mpc) + 25.
    pub fn distance_modulus(&self, z: f64) -> Result<f64, McgtError> {
        if !(z > 0.0) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("redshift-out-of-range", "distance modulus needs z > 0")
                    .with_context("z", z.to_string()),
            ));
        }
        Ok(5.0 * self.luminosity_distance(z)?.log10() + 25.0)
    }
}

/// One exported row of a [`DistanceTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    /// Redshift.
    pub z: f64,
    /// Dimensionless expansion rate.
    #[serde(rename = "E")]
    pub e: f64,
    /// Hubble rate in km/s/Mpc.
    #[serde(rename = "H")]
    pub h: f64,
    /// Line-of-sight comoving distance.
    #[serde(rename = "D_C")]
    pub d_c: f64,
    /// Transverse comoving distance.
    #[serde(rename = "D_M")]
    pub d_m: f64,
    /// Luminosity distance.
    #[serde(rename = "D_L")]
    pub d_l: f64,
    /// Angular diameter distance.
    #[serde(rename = "D_A")]
    pub d_a: f64,
    /// Volume-averaged distance.
    #[serde(rename = "D_V")]
    pub d_v: f64,
    /// Distance modulus, absent at z = 0.
    pub mu: Option<f64>,
}

/// Tabulated comoving distances on a uniform redshift grid.
///
/// Built once per cosmology and reused for batch lookups, for example when a
/// supernova sample holds thousands of redshifts.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    background: Background,
    z: Vec<f64>,
    e: Vec<f64>,
    comoving: Vec<f64>,
}

impl DistanceTable {
    /// Tabulates `n` evenly spaced redshifts on `[0, z_max]`.
    pub fn build(background: &Background, z_max: f64, n: usize) -> Result<Self, McgtError> {
        if !(z_max > 0.0 && z_max.is_finite()) || n < 2 {
            return Err(McgtError::Config(
                ErrorInfo::new("distance-grid", "grid needs z_max > 0 and at least two points")
                    .with_context("z_max", z_max.to_string())
                    .with_context("n", n.to_string()),
            ));
        }
        let dz = z_max / (n - 1) as f64;
        let z: Vec<f64> = (0..n)
            .map(|i| if i == n - 1 { z_max } else { i as f64 * dz })
            .collect();
        let e = z
            .iter()
            .map(|&zi| background.e(zi))
            .collect::<Result<Vec<_>, _>>()?;
        let inv_e: Vec<f64> = e.iter().map(|value| 1.0 / value).collect();
        let dh = background.hubble_distance();
        let comoving = cumulative_trapezoid(&z, &inv_e)?
            .into_iter()
            .map(|value| value * dh)
            .collect();
        Ok(Self {
            background: background.clone(),
            z,
            e,
            comoving,
        })
    }

    /// Largest tabulated redshift.
    pub fn z_max(&self) -> f64 {
        self.z.last().copied().unwrap_or(0.0)
    }

    /// Tabulated redshifts.
    pub fn redshifts(&self) -> &[f64] {
        &self.z
    }

    /// Comoving distance at `z` by linear interpolation.
    pub fn comoving_distance(&self, z: f64) -> Result<f64, McgtError> {
        let z_max = self.z_max();
        if !(z >= 0.0 && z <= z_max) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("redshift-out-of-table", "redshift outside the tabulated range")
                    .with_context("z", z.to_string())
                    .with_context("z_max", z_max.to_string()),
            ));
        }
        let dz = self.z[1] - self.z[0];
        let idx = ((z / dz).floor() as usize).min(self.z.len() - 2);
        let t = (z - self.z[idx]) / dz;
        Ok(self.comoving[idx] * (1.0 - t) + self.comoving[idx + 1] * t)
    }

    /// Transverse comoving distance at `z`.
    pub fn transverse_comoving_distance(&self, z: f64) -> Result<f64, McgtError> {
        let dc = self.comoving_distance(z)?;
        Ok(transverse(
            dc,
            self.background.hubble_distance(),
            self.background.omega_k(),
        ))
    }

    /// Distance moduli for a batch of redshifts.
    pub fn distance_moduli(&self, zs: &[f64]) -> Result<Vec<f64>, McgtError> {
        zs.iter()
            .map(|&z| {
                if !(z > 0.0) {
                    return Err(negative_redshift(z));
                }
                let dl = (1.0 + z) * self.transverse_comoving_distance(z)?;
                Ok(5.0 * dl.log10() + 25.0)
            })
            .collect()
    }

    /// Rows for every tabulated redshift.
    pub fn rows(&self) -> Vec<DistanceRow> {
        let dh0 = self.background.hubble_distance();
        let h0 = self.background.h0();
        self.z
            .iter()
            .zip(&self.e)
            .zip(&self.comoving)
            .map(|((&z, &e), &d_c)| {
                let d_m = transverse(d_c, dh0, self.background.omega_k());
                let d_l = (1.0 + z) * d_m;
                let d_h = dh0 / e;
                DistanceRow {
                    z,
                    e,
                    h: h0 * e,
                    d_c,
                    d_m,
                    d_l,
                    d_a: d_m / (1.0 + z),
                    d_v: (z * d_m * d_m * d_h).cbrt(),
                    mu: (z > 0.0).then(|| 5.0 * d_l.log10() + 25.0),
                }
            })
            .collect()
    }
}
