//! CPL dark-energy background: E(z), H(z) and the density fractions.

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::SPEED_OF_LIGHT_KM_S;

use crate::params::CosmoParams;

/// Expansion history of a CPL cosmology, w(a) = w0 + wa (1 - a).
///
/// Density parameters are frozen at construction so repeated evaluations do
/// not recompute the closure relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    h0: f64,
    omega_m: f64,
    omega_r: f64,
    omega_k: f64,
    omega_de: f64,
    w0: f64,
    wa: f64,
}

impl Background {
    /// Validates `params` and freezes the derived density parameters.
    pub fn new(params: &CosmoParams) -> Result<Self, McgtError> {
        params.validate()?;
        Ok(Self {
            h0: params.h0,
            omega_m: params.omega_m(),
            omega_r: params.omega_r(),
            omega_k: params.omega_k,
            omega_de: params.omega_de(),
            w0: params.w0,
            wa: params.wa,
        })
    }

    /// Hubble constant in km/s/Mpc.
    pub fn h0(&self) -> f64 {
        self.h0
    }

    /// Matter density parameter today.
    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    /// Radiation density parameter today.
    pub fn omega_r(&self) -> f64 {
        self.omega_r
    }

    /// Curvature density parameter.
    pub fn omega_k(&self) -> f64 {
        self.omega_k
    }

    /// Dark-energy density parameter today.
    pub fn omega_de(&self) -> f64 {
        self.omega_de
    }

    /// Equation of state at scale factor `a`.
    pub fn w(&self, a: f64) -> f64 {
        self.w0 + self.wa * (1.0 - a)
    }

    /// Dark-energy density relative to today, ρde(a)/ρde(1).
    pub fn de_density(&self, a: f64) -> f64 {
        a.powf(-3.0 * (1.0 + self.w0 + self.wa)) * (-3.0 * self.wa * (1.0 - a)).exp()
    }

    fn e2_raw(&self, z: f64) -> f64 {
        let x = 1.0 + z;
        let a = 1.0 / x;
        let x2 = x * x;
        self.omega_r * x2 * x2
            + self.omega_m * x2 * x
            + self.omega_k * x2
            + self.omega_de * self.de_density(a)
    }

    /// Dimensionless squared expansion rate E²(z) = H²(z)/H0².
    pub fn e2(&self, z: f64) -> Result<f64, McgtError> {
        if !(z > -1.0) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("redshift-out-of-range", "redshift must exceed -1")
                    .with_context("z", z.to_string()),
            ));
        }
        let value = self.e2_raw(z);
        if !(value.is_finite() && value > 0.0) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("non-positive-e2", "expansion rate squared is not positive")
                    .with_context("z", z.to_string())
                    .with_context("e2", value.to_string()),
            ));
        }
        Ok(value)
    }

    /// Dimensionless expansion rate E(z).
    pub fn e(&self, z: f64) -> Result<f64, McgtError> {
        self.e2(z).map(f64::sqrt)
    }

    /// Hubble rate H(z) in km/s/Mpc.
    pub fn hubble(&self, z: f64) -> Result<f64, McgtError> {
        Ok(self.h0 * self.e(z)?)
    }

    /// Hubble distance c/H0 in Mpc.
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.h0
    }

    fn check_scale_factor(a: f64) -> Result<(), McgtError> {
        if !(a > 0.0 && a.is_finite()) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("scale-factor-out-of-range", "scale factor must be positive")
                    .with_context("a", a.to_string()),
            ));
        }
        Ok(())
    }

    fn e2_at(&self, a: f64) -> Result<f64, McgtError> {
        Self::check_scale_factor(a)?;
        self.e2(1.0 / a - 1.0)
    }

    /// Matter fraction Ωm(a) = Ωm a⁻³ / E²(a).
    pub fn omega_m_at(&self, a: f64) -> Result<f64, McgtError> {
        let e2 = self.e2_at(a)?;
        Ok(self.omega_m / (a * a * a) / e2)
    }

    /// Dark-energy fraction Ωde(a) = Ωde f(a) / E²(a).
    pub fn omega_de_at(&self, a: f64) -> Result<f64, McgtError> {
        let e2 = self.e2_at(a)?;
        Ok(self.omega_de * self.de_density(a) / e2)
    }

    /// Logarithmic derivative d ln H / d ln a.
    pub fn dlnh_dlna(&self, a: f64) -> Result<f64, McgtError> {
        let e2 = self.e2_at(a)?;
        let a2 = a * a;
        let numerator = -4.0 * self.omega_r / (a2 * a2)
            - 3.0 * self.omega_m / (a2 * a)
            - 2.0 * self.omega_k / a2
            - 3.0 * (1.0 + self.w(a)) * self.omega_de * self.de_density(a);
        Ok(numerator / (2.0 * e2))
    }

    /// a² E(a), finite as a → 0 whenever radiation is present.
    pub fn a2e(&self, a: f64) -> Result<f64, McgtError> {
        if !(a >= 0.0 && a.is_finite()) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("scale-factor-out-of-range", "scale factor must be non-negative")
                    .with_context("a", a.to_string()),
            ));
        }
        let a2 = a * a;
        let de = if a > 0.0 {
            self.omega_de * self.de_density(a) * a2 * a2
        } else {
            0.0
        };
        let value = self.omega_r + self.omega_m * a + self.omega_k * a2 + de;
        if !(value.is_finite() && value >= 0.0) {
            return Err(McgtError::Cosmology(
                ErrorInfo::new("non-positive-e2", "expansion rate squared is not positive")
                    .with_context("a", a.to_string()),
            ));
        }
        Ok(value.sqrt())
    }
}
