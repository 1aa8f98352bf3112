#![deny(missing_docs)]
#![doc = "Background cosmology, distances, linear growth and power spectra for the MCGT model."]

/// CPL background expansion history.
pub mod background;
/// Comoving, luminosity and angular distances.
pub mod distance;
/// Linear growth of structure with a modified Poisson equation.
pub mod growth;
/// Composite quadrature rules.
pub mod integrate;
/// Fixed-step and adaptive ODE integrators.
pub mod ode;
/// Cosmological parameters and the global configuration file.
pub mod params;
/// Linear matter power spectrum.
pub mod power;
/// Recombination redshifts, sound horizons and CMB shift parameters.
pub mod recombination;

pub use background::Background;
pub use distance::{DistanceRow, DistanceTable, Distances};
pub use growth::{GrowthSolver, GrowthTable};
pub use ode::{integrate_rk4, Dopri5, OdeSystem};
pub use params::{CosmoModel, CosmoParams, GlobalConfig, ModifiedGravity, Numerics};
pub use power::PowerSpectrum;
pub use recombination::{CmbShift, RecombinationSummary};
