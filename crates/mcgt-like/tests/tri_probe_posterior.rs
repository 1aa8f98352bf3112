use mcgt_core::{LogDensity, ParamSet, ParamSpec};
use mcgt_cosmo::recombination::{sound_horizon, z_drag};
use mcgt_cosmo::{Background, CmbShift, CosmoModel, DistanceTable, Distances, GrowthSolver};
use mcgt_like::{
    BaoObservable, BaoPoint, BaoSample, CmbObservable, CmbPrior, RsdPoint, RsdSample, SnOffset,
    SnPoint, SupernovaSample, TriProbeLikelihood,
};

fn free_params() -> ParamSet {
    ParamSet::new(vec![
        ParamSpec::flat("H0", 55.0, 85.0, 67.36, 0.5),
        ParamSpec::flat("omch2", 0.08, 0.16, 0.12, 0.002),
    ])
    .unwrap()
}

/// Synthetic data generated exactly at the fiducial model.
fn truth_likelihood() -> TriProbeLikelihood {
    let model = CosmoModel::default();
    let background = Background::new(&model.params).unwrap();
    let distances = Distances::new(background.clone(), model.numerics.distance_steps);

    let sn_z = [0.05, 0.2, 0.45, 0.7, 1.0];
    let table = DistanceTable::build(&background, 1.0, model.numerics.distance_steps + 1).unwrap();
    let sn_mu = table.distance_moduli(&sn_z).unwrap();
    let sn = SupernovaSample::from_points(
        "synthetic-sn",
        sn_z.iter()
            .zip(&sn_mu)
            .map(|(&z, &mu)| SnPoint {
                z,
                mu: mu + 0.3,
                sigma_mu: 0.1,
            })
            .collect(),
    )
    .unwrap();

    let r_drag = sound_horizon(
        &background,
        &model.params,
        z_drag(model.params.ombh2, model.params.ommh2()),
        model.numerics.sound_horizon_steps,
    )
    .unwrap();
    let bao_points = [
        (0.38, BaoObservable::DmOverRd),
        (0.51, BaoObservable::DhOverRd),
        (0.15, BaoObservable::DvOverRd),
        (0.106, BaoObservable::RdOverDv),
    ]
    .iter()
    .map(|&(z, observable)| {
        let value = observable.predict(&distances, z, r_drag).unwrap();
        BaoPoint {
            z,
            observable,
            value,
            sigma: 0.02 * value,
        }
    })
    .collect();
    let bao = BaoSample::from_points("synthetic-bao", bao_points).unwrap();

    let shift = CmbShift::with_distances(&model, &distances).unwrap();
    let cmb = CmbPrior::new(
        "synthetic-cmb",
        vec![
            CmbObservable::ShiftR,
            CmbObservable::AcousticScale,
            CmbObservable::OmegaBH2,
        ],
        vec![shift.r_shift, shift.l_a, shift.omega_b_h2],
        vec![
            vec![0.005f64.powi(2), 0.0, 0.0],
            vec![0.0, 0.1f64.powi(2), 0.0],
            vec![0.0, 0.0, 1.5e-4f64.powi(2)],
        ],
    )
    .unwrap();

    let rsd_z = [0.15, 0.38, 0.61];
    let fs8 = GrowthSolver::new(&model).unwrap().fsigma8(&rsd_z).unwrap();
    let rsd = RsdSample::from_points(
        "synthetic-rsd",
        rsd_z
            .iter()
            .zip(&fs8)
            .map(|(&z, &fsigma8)| RsdPoint {
                z,
                fsigma8,
                sigma: 0.04,
            })
            .collect(),
    )
    .unwrap();

    TriProbeLikelihood::new(model, free_params())
        .unwrap()
        .with_supernovae(sn, SnOffset::Marginalize)
        .with_bao(bao)
        .with_cmb(cmb)
        .with_rsd(rsd)
}

#[test]
fn chi_square_vanishes_at_the_generating_model() {
    let likelihood = truth_likelihood();
    let breakdown = likelihood.breakdown(&[67.36, 0.12]).unwrap();
    assert!(breakdown.sn.unwrap() < 1e-6, "{breakdown:?}");
    assert_eq!(breakdown.bao, Some(0.0));
    assert_eq!(breakdown.cmb, Some(0.0));
    assert_eq!(breakdown.rsd, Some(0.0));
    assert!(breakdown.total < 1e-6);
    let lp = likelihood.log_density(&[67.36, 0.12]).unwrap();
    assert!(lp <= 0.0 && lp > -1e-6);
}

#[test]
fn moving_away_raises_every_probe() {
    let likelihood = truth_likelihood();
    let far = likelihood.breakdown(&[72.0, 0.13]).unwrap();
    for value in [far.bao, far.cmb, far.rsd].into_iter().flatten() {
        assert!(value > 0.0);
    }
    assert!(far.sn.unwrap() >= 0.0);
    assert!(far.total > 10.0);
    let lp_far = likelihood.log_density(&[72.0, 0.13]).unwrap();
    let lp_truth = likelihood.log_density(&[67.36, 0.12]).unwrap();
    assert!(lp_far < lp_truth);
}

#[test]
fn prior_and_dimension_are_enforced() {
    let likelihood = truth_likelihood();
    assert_eq!(
        likelihood.log_density(&[90.0, 0.12]).unwrap(),
        f64::NEG_INFINITY
    );
    let err = likelihood.log_density(&[67.0]).unwrap_err();
    assert_eq!(err.info().code, "param-dimension");
    assert_eq!(likelihood.dim(), 2);
    assert_eq!(likelihood.param_names(), vec!["H0", "omch2"]);
}

#[test]
fn unphysical_points_have_zero_density() {
    let params = ParamSet::new(vec![ParamSpec::flat("omega_k", -5.0, 5.0, 0.0, 0.01)]).unwrap();
    let sn = SupernovaSample::from_points(
        "toy",
        vec![SnPoint {
            z: 1.0,
            mu: 44.0,
            sigma_mu: 0.1,
        }],
    )
    .unwrap();
    let likelihood = TriProbeLikelihood::new(CosmoModel::default(), params)
        .unwrap()
        .with_supernovae(sn, SnOffset::Fixed);
    assert_eq!(likelihood.log_density(&[-3.0]).unwrap(), f64::NEG_INFINITY);
    assert!(likelihood.breakdown(&[-3.0]).is_err());
    assert!(likelihood.log_density(&[0.0]).unwrap().is_finite());
}

#[test]
fn configuration_mistakes_propagate() {
    let params = ParamSet::new(vec![ParamSpec::flat("omega_lambda", 0.0, 1.0, 0.7, 0.01)]).unwrap();
    let err = TriProbeLikelihood::new(CosmoModel::default(), params).unwrap_err();
    assert_eq!(err.info().code, "unknown-parameter");

    let bare = TriProbeLikelihood::new(CosmoModel::default(), free_params()).unwrap();
    let err = bare.log_density(&[67.36, 0.12]).unwrap_err();
    assert_eq!(err.info().code, "no-probes");
}
