//! Cosmological parameters, numerics settings and the global TOML config.

use std::fs;
use std::path::Path;

use mcgt_core::errors::{ErrorInfo, McgtError};
use serde::{Deserialize, Serialize};

/// Photon density today, Ωγh², for T_CMB = 2.7255 K.
const OMEGA_GAMMA_H2_FIDUCIAL: f64 = 2.469e-5;
const T_CMB_FIDUCIAL: f64 = 2.7255;
/// Energy density of one massless neutrino species relative to photons.
const NEUTRINO_PER_SPECIES: f64 = 0.2271;

/// Background cosmological parameters for the CPL dark-energy sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CosmoParams {
    /// Hubble constant in km/s/Mpc.
    #[serde(rename = "H0", alias = "h0", default = "default_h0")]
    pub h0: f64,
    /// Physical baryon density Ωb h².
    #[serde(default = "default_ombh2")]
    pub ombh2: f64,
    /// Physical cold dark matter density Ωc h².
    #[serde(default = "default_omch2")]
    pub omch2: f64,
    /// Curvature density parameter Ωk.
    #[serde(default)]
    pub omega_k: f64,
    /// CPL equation of state today.
    #[serde(default = "default_w0")]
    pub w0: f64,
    /// CPL equation of state slope.
    #[serde(default)]
    pub wa: f64,
    /// CMB temperature in K. Zero switches radiation off.
    #[serde(default = "default_t_cmb")]
    pub t_cmb: f64,
    /// Effective number of relativistic species.
    #[serde(default = "default_n_eff")]
    pub n_eff: f64,
    /// Scalar spectral index.
    #[serde(default = "default_n_s")]
    pub n_s: f64,
    /// Amplitude of matter fluctuations at 8 Mpc/h today.
    #[serde(default = "default_sigma8")]
    pub sigma8: f64,
}

fn default_h0() -> f64 {
    67.36
}

fn default_ombh2() -> f64 {
    0.02237
}

fn default_omch2() -> f64 {
    0.1200
}

fn default_w0() -> f64 {
    -1.0
}

fn default_t_cmb() -> f64 {
    T_CMB_FIDUCIAL
}

fn default_n_eff() -> f64 {
    3.046
}

fn default_n_s() -> f64 {
    0.9649
}

fn default_sigma8() -> f64 {
    0.8111
}

impl Default for CosmoParams {
    fn default() -> Self {
        Self {
            h0: default_h0(),
            ombh2: default_ombh2(),
            omch2: default_omch2(),
            omega_k: 0.0,
            w0: default_w0(),
            wa: 0.0,
            t_cmb: default_t_cmb(),
            n_eff: default_n_eff(),
            n_s: default_n_s(),
            sigma8: default_sigma8(),
        }
    }
}

impl CosmoParams {
    /// Dimensionless Hubble parameter h = H0 / 100.
    pub fn h(&self) -> f64 {
        self.h0 / 100.0
    }

    /// Baryon density parameter Ωb.
    pub fn omega_b(&self) -> f64 {
        self.ombh2 / (self.h() * self.h())
    }

    /// Cold dark matter density parameter Ωc.
    pub fn omega_c(&self) -> f64 {
        self.omch2 / (self.h() * self.h())
    }

    /// Total matter density parameter Ωm = Ωb + Ωc.
    pub fn omega_m(&self) -> f64 {
        self.omega_b() + self.omega_c()
    }

    /// Physical matter density ωm = Ωm h².
    pub fn ommh2(&self) -> f64 {
        self.ombh2 + self.omch2
    }

    /// Physical photon density Ωγ h².
    pub fn omega_gamma_h2(&self) -> f64 {
        OMEGA_GAMMA_H2_FIDUCIAL * (self.t_cmb / T_CMB_FIDUCIAL).powi(4)
    }

    /// Radiation density parameter including massless neutrinos.
    pub fn omega_r(&self) -> f64 {
        self.omega_gamma_h2() * (1.0 + NEUTRINO_PER_SPECIES * self.n_eff) / (self.h() * self.h())
    }

    /// Dark-energy density parameter from the closure relation, so E(0) = 1.
    pub fn omega_de(&self) -> f64 {
        1.0 - self.omega_m() - self.omega_r() - self.omega_k
    }

    /// Rejects parameter combinations no background can be built from.
    pub fn validate(&self) -> Result<(), McgtError> {
        let checks = [
            ("H0", self.h0, self.h0 > 0.0),
            ("ombh2", self.ombh2, self.ombh2 > 0.0),
            ("omch2", self.omch2, self.omch2 >= 0.0),
            ("omega_k", self.omega_k, true),
            ("w0", self.w0, true),
            ("wa", self.wa, true),
            ("t_cmb", self.t_cmb, self.t_cmb >= 0.0),
            ("n_eff", self.n_eff, self.n_eff >= 0.0),
            ("n_s", self.n_s, true),
            ("sigma8", self.sigma8, self.sigma8 > 0.0),
        ];
        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(McgtError::Cosmology(
                    ErrorInfo::new("param-out-of-range", "unphysical cosmological parameter")
                        .with_context("param", name)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// Scalar-tensor modification of the Poisson equation, μ(a) = 1 + μ0 Ωde(a)/Ωde(1).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifiedGravity {
    /// Present-day deviation of the effective gravitational coupling.
    #[serde(default)]
    pub mu0: f64,
}

/// Resolution knobs for quadratures and the growth integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Numerics {
    /// Simpson intervals used for comoving distance integrals.
    #[serde(default = "default_distance_steps")]
    pub distance_steps: usize,
    /// Simpson intervals used for sound horizon integrals.
    #[serde(default = "default_sound_horizon_steps")]
    pub sound_horizon_steps: usize,
    /// Scale factor where the growth ODE starts in matter domination.
    #[serde(default = "default_growth_a_init")]
    pub growth_a_init: f64,
    /// Relative tolerance of the adaptive integrator.
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    /// Absolute tolerance of the adaptive integrator.
    #[serde(default = "default_atol")]
    pub atol: f64,
}

fn default_distance_steps() -> usize {
    1024
}

fn default_sound_horizon_steps() -> usize {
    4096
}

fn default_growth_a_init() -> f64 {
    1e-3
}

fn default_rtol() -> f64 {
    1e-8
}

fn default_atol() -> f64 {
    1e-10
}

impl Default for Numerics {
    fn default() -> Self {
        Self {
            distance_steps: default_distance_steps(),
            sound_horizon_steps: default_sound_horizon_steps(),
            growth_a_init: default_growth_a_init(),
            rtol: default_rtol(),
            atol: default_atol(),
        }
    }
}

impl Numerics {
    fn validate(&self) -> Result<(), McgtError> {
        let bad = |name: &str, value: String| {
            McgtError::Config(
                ErrorInfo::new("numerics-invalid", "invalid numerics setting")
                    .with_context("key", name)
                    .with_context("value", value),
            )
        };
        if self.distance_steps < 2 {
            return Err(bad("distance_steps", self.distance_steps.to_string()));
        }
        if self.sound_horizon_steps < 2 {
            return Err(bad(
                "sound_horizon_steps",
                self.sound_horizon_steps.to_string(),
            ));
        }
        if !(self.growth_a_init > 0.0 && self.growth_a_init < 1.0) {
            return Err(bad("growth_a_init", self.growth_a_init.to_string()));
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return Err(bad("rtol/atol", format!("{}/{}", self.rtol, self.atol)));
        }
        Ok(())
    }
}

/// Complete model description: background parameters, gravity sector and numerics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CosmoModel {
    /// Background parameters.
    pub params: CosmoParams,
    /// Modified-gravity sector.
    pub gravity: ModifiedGravity,
    /// Integration settings.
    pub numerics: Numerics,
}

/// Names accepted by [`CosmoModel::set_parameter`].
pub const PARAMETER_NAMES: &[&str] = &[
    "H0", "ombh2", "omch2", "omega_k", "w0", "wa", "t_cmb", "n_eff", "n_s", "sigma8", "mu0",
];

impl CosmoModel {
    /// Validates every section of the model.
    pub fn validate(&self) -> Result<(), McgtError> {
        self.params.validate()?;
        if !self.gravity.mu0.is_finite() {
            return Err(McgtError::Cosmology(ErrorInfo::new(
                "param-out-of-range",
                "mu0 must be finite",
            )));
        }
        self.numerics.validate()
    }

    /// Overrides one named parameter.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), McgtError> {
        let slot = match name {
            "H0" | "h0" => &mut self.params.h0,
            "ombh2" => &mut self.params.ombh2,
            "omch2" => &mut self.params.omch2,
            "omega_k" => &mut self.params.omega_k,
            "w0" => &mut self.params.w0,
            "wa" => &mut self.params.wa,
            "t_cmb" => &mut self.params.t_cmb,
            "n_eff" => &mut self.params.n_eff,
            "n_s" => &mut self.params.n_s,
            "sigma8" => &mut self.params.sigma8,
            "mu0" => &mut self.gravity.mu0,
            other => {
                return Err(McgtError::Config(
                    ErrorInfo::new("unknown-parameter", "parameter is not part of the model")
                        .with_context("param", other)
                        .with_hint(format!("expected one of {}", PARAMETER_NAMES.join(", "))),
                ))
            }
        };
        *slot = value;
        Ok(())
    }

    /// Returns a copy with `names[i] = values[i]` applied in order.
    pub fn with_parameters(&self, names: &[String], values: &[f64]) -> Result<Self, McgtError> {
        if names.len() != values.len() {
            return Err(McgtError::Config(
                ErrorInfo::new("param-dimension", "names and values differ in length")
                    .with_context("names", names.len().to_string())
                    .with_context("values", values.len().to_string()),
            ));
        }
        let mut model = self.clone();
        for (name, &value) in names.iter().zip(values) {
            model.set_parameter(name, value)?;
        }
        Ok(model)
    }
}

/// Parsed `mcgt-global-config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// `[cosmology]` section.
    #[serde(default)]
    pub cosmology: CosmoParams,
    /// `[modified_gravity]` section.
    #[serde(default)]
    pub modified_gravity: ModifiedGravity,
    /// `[numerics]` section.
    #[serde(default)]
    pub numerics: Numerics,
}

impl GlobalConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, McgtError> {
        let config: GlobalConfig = toml::from_str(text).map_err(|err| {
            McgtError::Config(
                ErrorInfo::new("global-config-parse", err.to_string())
                    .with_hint("see mcgt-global-config.toml for the expected sections"),
            )
        })?;
        config.model().validate()?;
        Ok(config)
    }

    /// Reads and validates the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, McgtError> {
        let text =
            fs::read_to_string(path).map_err(|err| McgtError::io("global-config-read", path, err))?;
        Self::from_toml_str(&text).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Builds the model described by this configuration.
    pub fn model(&self) -> CosmoModel {
        CosmoModel {
            params: self.cosmology.clone(),
            gravity: self.modified_gravity.clone(),
            numerics: self.numerics.clone(),
        }
    }
}
