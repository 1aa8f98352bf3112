//! Baryon acoustic oscillation distance ratios.

use std::path::Path;

use mcgt_core::errors::McgtError;
use mcgt_cosmo::Distances;
use serde::{Deserialize, Serialize};

use crate::data::{check_point, empty, read_rows};

/// Distance ratio reported by a BAO measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaoObservable {
    /// D_V(z) / r_d.
    #[serde(rename = "DV_over_rd")]
    DvOverRd,
    /// D_M(z) / r_d.
    #[serde(rename = "DM_over_rd")]
    DmOverRd,
    /// D_H(z) / r_d.
    #[serde(rename = "DH_over_rd")]
    DhOverRd,
    /// r_d / D_V(z).
    #[serde(rename = "rd_over_DV")]
    RdOverDv,
}

impl BaoObservable {
    /// Model prediction at `z` given the drag-epoch sound horizon `r_drag`.
    pub fn predict(self, distances: &Distances, z: f64, r_drag: f64) -> Result<f64, McgtError> {
        Ok(match self {
            BaoObservable::DvOverRd => distances.volume_distance(z)? / r_drag,
            BaoObservable::DmOverRd => distances.transverse_comoving_distance(z)? / r_drag,
            BaoObservable::DhOverRd => distances.hubble_distance_at(z)? / r_drag,
            BaoObservable::RdOverDv => r_drag / distances.volume_distance(z)?,
        })
    }
}

/// One BAO constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaoPoint {
    /// Effective redshift.
    pub z: f64,
    /// Reported ratio.
    pub observable: BaoObservable,
    /// Measured value.
    pub value: f64,
    /// One-sigma uncertainty.
    pub sigma: f64,
}

/// Validated BAO table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaoSample {
    source: String,
    points: Vec<BaoPoint>,
}

impl BaoSample {
    /// Loads `z,observable,value,sigma` rows from a CSV file.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let points = read_rows(path)?;
        Self::from_points(path.display().to_string(), points)
    }

    /// Validates in-memory points.
    pub fn from_points(source: impl Into<String>, points: Vec<BaoPoint>) -> Result<Self, McgtError> {
        let source = source.into();
        if points.is_empty() {
            return Err(empty(Path::new(&source)));
        }
        for (index, point) in points.iter().enumerate() {
            check_point(
                &source,
                index + 1,
                point.z,
                ("value", point.value),
                ("sigma", point.sigma),
            )?;
        }
        Ok(Self { source, points })
    }

    /// Borrow the rows.
    pub fn points(&self) -> &[BaoPoint] {
        &self.points
    }

    /// Σ((model − obs)/σ)².
    pub fn chi_square(&self, distances: &Distances, r_drag: f64) -> Result<f64, McgtError> {
        let mut total = 0.0;
        for point in &self.points {
            let model = point.observable.predict(distances, point.z, r_drag)?;
            let pull = (model - point.value) / point.sigma;
            total += pull * pull;
        }
        Ok(total)
    }
}
