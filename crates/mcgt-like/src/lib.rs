#![deny(missing_docs)]
#![doc = "Observational likelihoods for the MCGT cosmology pipeline."]

/// BAO distance-ratio probe.
pub mod bao;
/// Compressed CMB shift-parameter prior.
pub mod cmb;
mod data;
/// RSD growth-rate probe.
pub mod rsd;
/// Supernova distance-modulus probe.
pub mod sn;
/// Composite posterior and its configuration.
pub mod tri_probe;

pub use bao::{BaoObservable, BaoPoint, BaoSample};
pub use cmb::{CmbObservable, CmbPrior};
pub use rsd::{RsdPoint, RsdSample};
pub use sn::{SnOffset, SnPoint, SupernovaSample};
pub use tri_probe::{ChiSquareBreakdown, LikelihoodConfig, TriProbeLikelihood};
