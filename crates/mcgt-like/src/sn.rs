//! Type Ia supernova distance moduli.

use std::path::Path;

use mcgt_core::errors::McgtError;
use mcgt_cosmo::{Background, DistanceTable};
use serde::{Deserialize, Serialize};

use crate::data::{check_point, empty, read_rows};

/// One supernova: redshift, observed distance modulus and its error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnPoint {
    /// CMB-frame redshift.
    #[serde(alias = "zcmb")]
    pub z: f64,
    /// Observed distance modulus.
    pub mu: f64,
    /// One-sigma uncertainty on `mu`.
    #[serde(alias = "dmu")]
    pub sigma_mu: f64,
}

/// Treatment of the degenerate absolute-magnitude offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnOffset {
    /// Analytically marginalise a constant offset in μ.
    #[default]
    #[serde(alias = "marginalise")]
    Marginalize,
    /// Compare moduli directly.
    Fixed,
}

/// Validated supernova table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupernovaSample {
    source: String,
    points: Vec<SnPoint>,
}

impl SupernovaSample {
    /// Loads `z,mu,sigma_mu` (or `zcmb,mu,dmu`) rows from a CSV file.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let points = read_rows(path)?;
        Self::from_points(path.display().to_string(), points)
    }

    /// Validates in-memory points; `source` labels error messages.
    pub fn from_points(source: impl Into<String>, points: Vec<SnPoint>) -> Result<Self, McgtError> {
        let source = source.into();
        if points.is_empty() {
            return Err(empty(Path::new(&source)));
        }
        for (index, point) in points.iter().enumerate() {
            check_point(
                &source,
                index + 1,
                point.z,
                ("mu", point.mu),
                ("sigma_mu", point.sigma_mu),
            )?;
        }
        Ok(Self { source, points })
    }

    /// Borrow the rows.
    pub fn points(&self) -> &[SnPoint] {
        &self.points
    }

    /// Number of supernovae.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a loaded sample.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Highest redshift in the sample.
    pub fn z_max(&self) -> f64 {
        self.points.iter().map(|p| p.z).fold(0.0, f64::max)
    }

    /// χ² against the distance moduli of `background`, tabulated on `grid_points` redshifts.
    pub fn chi_square(
        &self,
        background: &Background,
        grid_points: usize,
        offset: SnOffset,
    ) -> Result<f64, McgtError> {
        let table = DistanceTable::build(background, self.z_max(), grid_points.max(2))?;
        let redshifts: Vec<f64> = self.points.iter().map(|p| p.z).collect();
        let model = table.distance_moduli(&redshifts)?;
        let residuals: Vec<f64> = self
            .points
            .iter()
            .zip(&model)
            .map(|(point, mu)| point.mu - mu)
            .collect();
        let sigmas: Vec<f64> = self.points.iter().map(|p| p.sigma_mu).collect();
        Ok(chi_square(&residuals, &sigmas, offset))
    }
}

/// χ² of residuals Δ with errors σ.
///
/// With [`SnOffset::Marginalize`] this is A − B²/C where A = ΣΔ²/σ²,
/// B = ΣΔ/σ² and C = Σ1/σ², clamped at zero against round-off.
pub fn chi_square(residuals: &[f64], sigmas: &[f64], offset: SnOffset) -> f64 {
    let mut a = 0.0;
    let mut b = 0.0;
    let mut c = 0.0;
    for (delta, sigma) in residuals.iter().zip(sigmas) {
        let w = 1.0 / (sigma * sigma);
        a += delta * delta * w;
        b += delta * w;
        c += w;
    }
    match offset {
        SnOffset::Fixed => a,
        SnOffset::Marginalize => (a - b * b / c).max(0.0),
    }
}
