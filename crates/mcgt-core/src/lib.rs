#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the MCGT cosmology crates."]

pub mod errors;
pub mod params;
pub mod provenance;
pub mod rng;
mod canonical;

pub use errors::{ErrorInfo, McgtError};
pub use params::{ParamSet, ParamSpec, Prior};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use canonical::{from_json_slice, stable_hash_string, to_canonical_json_bytes};

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Unnormalised log probability density over a fixed-dimension parameter space.
///
/// Samplers only ever compare differences of `log_density`, so additive
/// constants may be dropped. A value of `f64::NEG_INFINITY` marks a point with
/// zero density; samplers reject such proposals. Errors are reserved for
/// structural problems (wrong dimension, unknown parameters) and abort a run.
pub trait LogDensity: Send + Sync {
    /// Number of parameters accepted by [`LogDensity::log_density`].
    fn dim(&self) -> usize;

    /// Parameter names in the order expected by [`LogDensity::log_density`].
    fn param_names(&self) -> Vec<String>;

    /// Evaluates the log density at `theta`.
    fn log_density(&self, theta: &[f64]) -> Result<f64, McgtError>;

    /// Stable hash of the data the density conditions on, recorded in run provenance.
    fn data_hash(&self) -> Result<Option<String>, McgtError> {
        Ok(None)
    }
}

impl<T: LogDensity + ?Sized> LogDensity for &T {
    fn dim(&self) -> usize {
        (**self).dim()
    }

    fn param_names(&self) -> Vec<String> {
        (**self).param_names()
    }

    fn log_density(&self, theta: &[f64]) -> Result<f64, McgtError> {
        (**self).log_density(theta)
    }

    fn data_hash(&self) -> Result<Option<String>, McgtError> {
        (**self).data_hash()
    }
}
