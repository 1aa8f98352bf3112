//! Composite posterior over the supernova, BAO, CMB and RSD probes.

use std::path::{Path, PathBuf};

use mcgt_core::errors::{ErrorInfo, McgtError};
use mcgt_core::{stable_hash_string, LogDensity, ParamSet};
use mcgt_cosmo::recombination::{sound_horizon, z_drag};
use mcgt_cosmo::{Background, CmbShift, CosmoModel, Distances, GrowthSolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bao::BaoSample;
use crate::cmb::CmbPrior;
use crate::rsd::RsdSample;
use crate::sn::{SnOffset, SupernovaSample};

/// `likelihood` section of a job file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LikelihoodConfig {
    /// Supernova CSV.
    #[serde(default)]
    pub supernovae: Option<PathBuf>,
    /// BAO CSV.
    #[serde(default)]
    pub bao: Option<PathBuf>,
    /// Compressed CMB prior JSON.
    #[serde(default)]
    pub cmb: Option<PathBuf>,
    /// RSD CSV.
    #[serde(default)]
    pub rsd: Option<PathBuf>,
    /// Treatment of the supernova magnitude offset.
    #[serde(default)]
    pub sn_offset: SnOffset,
}

impl LikelihoodConfig {
    /// Returns a copy whose relative paths are anchored at `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Self {
        let anchor = |path: &Option<PathBuf>| {
            path.as_ref().map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    base_dir.join(p)
                }
            })
        };
        Self {
            supernovae: anchor(&self.supernovae),
            bao: anchor(&self.bao),
            cmb: anchor(&self.cmb),
            rsd: anchor(&self.rsd),
            sn_offset: self.sn_offset,
        }
    }
}

/// Per-probe χ² at one parameter point; absent probes are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareBreakdown {
    /// Supernova contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sn: Option<f64>,
    /// BAO contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bao: Option<f64>,
    /// CMB contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmb: Option<f64>,
    /// RSD contribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsd: Option<f64>,
    /// Sum of the present contributions.
    pub total: f64,
}

/// Posterior of the free parameters given any subset of the four probes.
#[derive(Debug, Clone)]
pub struct TriProbeLikelihood {
    base: CosmoModel,
    params: ParamSet,
    names: Vec<String>,
    sn: Option<(SupernovaSample, SnOffset)>,
    bao: Option<BaoSample>,
    cmb: Option<CmbPrior>,
    rsd: Option<RsdSample>,
}

impl TriProbeLikelihood {
    /// Creates a likelihood without probes; every free parameter must name a model parameter.
    pub fn new(base: CosmoModel, params: ParamSet) -> Result<Self, McgtError> {
        let mut probe = base.clone();
        for spec in params.specs() {
            probe.set_parameter(&spec.name, spec.start)?;
        }
        let names = params.names();
        Ok(Self {
            base,
            params,
            names,
            sn: None,
            bao: None,
            cmb: None,
            rsd: None,
        })
    }

    /// Loads every dataset named in `config`; relative paths resolve against `base_dir`.
    pub fn from_config(
        config: &LikelihoodConfig,
        base_dir: &Path,
        base: CosmoModel,
        params: ParamSet,
    ) -> Result<Self, McgtError> {
        let config = config.resolve(base_dir);
        let mut likelihood = Self::new(base, params)?;
        if let Some(path) = &config.supernovae {
            likelihood = likelihood.with_supernovae(SupernovaSample::load(path)?, config.sn_offset);
        }
        if let Some(path) = &config.bao {
            likelihood = likelihood.with_bao(BaoSample::load(path)?);
        }
        if let Some(path) = &config.cmb {
            likelihood = likelihood.with_cmb(CmbPrior::load(path)?);
        }
        if let Some(path) = &config.rsd {
            likelihood = likelihood.with_rsd(RsdSample::load(path)?);
        }
        likelihood.ensure_probes()?;
        info!(
            probes = ?likelihood.probe_names(),
            params = ?likelihood.names,
            "likelihood ready"
        );
        Ok(likelihood)
    }

    /// Adds the supernova probe.
    pub fn with_supernovae(mut self, sample: SupernovaSample, offset: SnOffset) -> Self {
        self.sn = Some((sample, offset));
        self
    }

    /// Adds the BAO probe.
    pub fn with_bao(mut self, sample: BaoSample) -> Self {
        self.bao = Some(sample);
        self
    }

    /// Adds the compressed CMB prior.
    pub fn with_cmb(mut self, prior: CmbPrior) -> Self {
        self.cmb = Some(prior);
        self
    }

    /// Adds the RSD probe.
    pub fn with_rsd(mut self, sample: RsdSample) -> Self {
        self.rsd = Some(sample);
        self
    }

    /// Names of the configured probes.
    pub fn probe_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.sn.is_some() {
            names.push("sn");
        }
        if self.bao.is_some() {
            names.push("bao");
        }
        if self.cmb.is_some() {
            names.push("cmb");
        }
        if self.rsd.is_some() {
            names.push("rsd");
        }
        names
    }

    fn ensure_probes(&self) -> Result<(), McgtError> {
        if self.probe_names().is_empty() {
            return Err(McgtError::Likelihood(
                ErrorInfo::new("no-probes", "at least one probe must be configured")
                    .with_hint("set supernovae, bao, cmb or rsd in the likelihood section"),
            ));
        }
        Ok(())
    }

    /// Free parameters of the posterior.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Fiducial model the free parameters are applied to.
    pub fn base_model(&self) -> &CosmoModel {
        &self.base
    }

    /// SHA-256 of the canonical JSON of every loaded dataset.
    pub fn data_hash(&self) -> Result<String, McgtError> {
        #[derive(Serialize)]
        struct Datasets<'a> {
            sn: Option<&'a SupernovaSample>,
            sn_offset: Option<SnOffset>,
            bao: Option<&'a BaoSample>,
            cmb: Option<&'a CmbPrior>,
            rsd: Option<&'a RsdSample>,
        }
        stable_hash_string(&Datasets {
            sn: self.sn.as_ref().map(|(sample, _)| sample),
            sn_offset: self.sn.as_ref().map(|(_, offset)| *offset),
            bao: self.bao.as_ref(),
            cmb: self.cmb.as_ref(),
            rsd: self.rsd.as_ref(),
        })
    }

    /// Model obtained by applying `theta` to the fiducial model.
    pub fn model_at(&self, theta: &[f64]) -> Result<CosmoModel, McgtError> {
        self.params.check_dim(theta)?;
        self.base.with_parameters(&self.names, theta)
    }

    /// Per-probe χ² at `theta`.
    pub fn breakdown(&self, theta: &[f64]) -> Result<ChiSquareBreakdown, McgtError> {
        self.ensure_probes()?;
        let model = self.model_at(theta)?;
        model.validate()?;
        let background = Background::new(&model.params)?;
        let distances = Distances::new(background.clone(), model.numerics.distance_steps);
        let mut out = ChiSquareBreakdown::default();

        if let Some((sample, offset)) = &self.sn {
            out.sn = Some(sample.chi_square(
                &background,
                model.numerics.distance_steps + 1,
                *offset,
            )?);
        }
        if let Some(sample) = &self.bao {
            let zd = z_drag(model.params.ombh2, model.params.ommh2());
            let r_drag = sound_horizon(
                &background,
                &model.params,
                zd,
                model.numerics.sound_horizon_steps,
            )?;
            out.bao = Some(sample.chi_square(&distances, r_drag)?);
        }
        if let Some(prior) = &self.cmb {
            let shift = CmbShift::with_distances(&model, &distances)?;
            out.cmb = Some(prior.chi_square(&shift));
        }
        if let Some(sample) = &self.rsd {
            let growth = GrowthSolver::new(&model)?;
            out.rsd = Some(sample.chi_square(&growth)?);
        }
        out.total = [out.sn, out.bao, out.cmb, out.rsd]
            .iter()
            .flatten()
            .sum();
        if !out.total.is_finite() {
            return Err(McgtError::Likelihood(
                ErrorInfo::new("non-finite-chi2", "chi-squared is not finite")
                    .with_context("theta", format!("{theta:?}")),
            ));
        }
        Ok(out)
    }
}

/// Errors that describe a bad point in parameter space rather than a broken setup.
fn is_unphysical(err: &McgtError) -> bool {
    match err {
        McgtError::Cosmology(_) | McgtError::Integration(_) => true,
        McgtError::Likelihood(info) => info.code == "non-finite-chi2",
        _ => false,
    }
}

impl LogDensity for TriProbeLikelihood {
    fn dim(&self) -> usize {
        self.params.len()
    }

    fn param_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn log_density(&self, theta: &[f64]) -> Result<f64, McgtError> {
        let log_prior = self.params.log_prior(theta)?;
        if log_prior == f64::NEG_INFINITY {
            return Ok(f64::NEG_INFINITY);
        }
        match self.breakdown(theta) {
            Ok(chi2) => Ok(log_prior - 0.5 * chi2.total),
            Err(err) if is_unphysical(&err) => {
                debug!(code = %err.info().code, "rejecting unphysical point");
                Ok(f64::NEG_INFINITY)
            }
            Err(err) => Err(err),
        }
    }

    fn data_hash(&self) -> Result<Option<String>, McgtError> {
        TriProbeLikelihood::data_hash(self).map(Some)
    }
}
