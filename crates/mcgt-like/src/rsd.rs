//! Redshift-space distortion growth-rate measurements.

use std::path::Path;

use mcgt_core::errors::McgtError;
use mcgt_cosmo::GrowthSolver;
use serde::{Deserialize, Serialize};

use crate::data::{check_point, empty, read_rows};

/// One fσ8 measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsdPoint {
    /// Effective redshift.
    pub z: f64,
    /// Measured fσ8.
    pub fsigma8: f64,
    /// One-sigma uncertainty.
    pub sigma: f64,
}

/// Validated RSD table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsdSample {
    source: String,
    points: Vec<RsdPoint>,
}

impl RsdSample {
    /// Loads `z,fsigma8,sigma` rows from a CSV file.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let points = read_rows(path)?;
        Self::from_points(path.display().to_string(), points)
    }

    /// Validates in-memory points.
    pub fn from_points(source: impl Into<String>, points: Vec<RsdPoint>) -> Result<Self, McgtError> {
        let source = source.into();
        if points.is_empty() {
            return Err(empty(Path::new(&source)));
        }
        for (index, point) in points.iter().enumerate() {
            check_point(
                &source,
                index + 1,
                point.z,
                ("fsigma8", point.fsigma8),
                ("sigma", point.sigma),
            )?;
        }
        Ok(Self { source, points })
    }

    /// Borrow the rows.
    pub fn points(&self) -> &[RsdPoint] {
        &self.points
    }

    /// Σ((fσ8_model − obs)/σ)² from a single growth solve.
    pub fn chi_square(&self, growth: &GrowthSolver) -> Result<f64, McgtError> {
        let redshifts: Vec<f64> = self.points.iter().map(|p| p.z).collect();
        let model = growth.fsigma8(&redshifts)?;
        Ok(self
            .points
            .iter()
            .zip(&model)
            .map(|(point, fs8)| ((fs8 - point.fsigma8) / point.sigma).powi(2))
            .sum())
    }
}
