//! Compressed CMB prior on shift parameters.

use std::fs;
use std::path::Path;

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_cosmo::CmbShift;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Quantity constrained by the compressed CMB prior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CmbObservable {
    /// Shift parameter R.
    #[serde(rename = "R")]
    ShiftR,
    /// Acoustic scale l_A.
    #[serde(rename = "l_a")]
    AcousticScale,
    /// Physical baryon density ωb.
    #[serde(rename = "omega_b_h2")]
    OmegaBH2,
}

impl CmbObservable {
    fn pick(self, shift: &CmbShift) -> f64 {
        match self {
            CmbObservable::ShiftR => shift.r_shift,
            CmbObservable::AcousticScale => shift.l_a,
            CmbObservable::OmegaBH2 => shift.omega_b_h2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CmbPriorFile {
    observables: Vec<CmbObservable>,
    mean: Vec<f64>,
    covariance: Vec<Vec<f64>>,
}

/// Gaussian prior on a vector of shift parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CmbPrior {
    source: String,
    observables: Vec<CmbObservable>,
    mean: Vec<f64>,
    covariance: Vec<Vec<f64>>,
    #[serde(skip_serializing)]
    inverse: DMatrix<f64>,
}

fn cmb_error(source: &str, message: &str) -> McgtError {
    McgtError::Data(ErrorInfo::new("cmb-prior", message).with_context("path", source))
}

impl CmbPrior {
    /// Loads the JSON document `{observables, mean, covariance}` at `path`.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let bytes = fs::read(path).map_err(|err| McgtError::io("dataset-open", path, err))?;
        let file: CmbPriorFile = serde_json::from_slice(&bytes).map_err(|err| {
            McgtError::Data(
                ErrorInfo::new("cmb-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::new(
            path.display().to_string(),
            file.observables,
            file.mean,
            file.covariance,
        )
    }

    /// Validates the prior and factorises its covariance.
    pub fn new(
        source: impl Into<String>,
        observables: Vec<CmbObservable>,
        mean: Vec<f64>,
        covariance: Vec<Vec<f64>>,
    ) -> Result<Self, McgtError> {
        let source = source.into();
        let n = observables.len();
        if n == 0 {
            return Err(cmb_error(&source, "at least one observable is required"));
        }
        let mut sorted = observables.clone();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != n {
            return Err(cmb_error(&source, "observables must be unique"));
        }
        if mean.len() != n || mean.iter().any(|v| !v.is_finite()) {
            return Err(cmb_error(&source, "mean must hold one finite value per observable"));
        }
        if covariance.len() != n
            || covariance
                .iter()
                .any(|row| row.len() != n || row.iter().any(|v| !v.is_finite()))
        {
            return Err(cmb_error(&source, "covariance must be a finite square matrix"));
        }
        for i in 0..n {
            for j in 0..i {
                let (a, b) = (covariance[i][j], covariance[j][i]);
                if (a - b).abs() > 1e-12 * a.abs().max(b.abs()).max(f64::MIN_POSITIVE) {
                    return Err(cmb_error(&source, "covariance must be symmetric"));
                }
            }
        }
        let matrix = DMatrix::from_fn(n, n, |i, j| covariance[i][j]);
        let cholesky = matrix
            .cholesky()
            .ok_or_else(|| cmb_error(&source, "covariance is not positive definite"))?;
        Ok(Self {
            source,
            observables,
            mean,
            covariance,
            inverse: cholesky.inverse(),
        })
    }

    /// Constrained observables in vector order.
    pub fn observables(&self) -> &[CmbObservable] {
        &self.observables
    }

    /// Prior mean in vector order.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Δᵀ C⁻¹ Δ with Δ = model − mean.
    pub fn chi_square(&self, shift: &CmbShift) -> f64 {
        let delta = DVector::from_iterator(
            self.observables.len(),
            self.observables
                .iter()
                .zip(&self.mean)
                .map(|(obs, mean)| obs.pick(shift) - mean),
        );
        delta.dot(&(&self.inverse * &delta)).max(0.0)
    }
}
