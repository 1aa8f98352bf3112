use mcgt_cosmo::CmbShift;
use mcgt_like::{CmbObservable, CmbPrior};

fn shift() -> CmbShift {
    CmbShift {
        z_star: 1090.0,
        r_shift: 1.75,
        l_a: 301.5,
        omega_b_h2: 0.0224,
    }
}

#[test]
fn diagonal_prior_sums_pulls() {
    let prior = CmbPrior::new(
        "inline",
        vec![CmbObservable::ShiftR, CmbObservable::AcousticScale],
        vec![1.74, 301.0],
        vec![vec![0.01 * 0.01, 0.0], vec![0.0, 0.25]],
    )
    .unwrap();
    let chi2 = prior.chi_square(&shift());
    assert!((chi2 - (1.0 + 1.0)).abs() < 1e-9);
}

#[test]
fn correlated_prior_matches_closed_form() {
    let rho: f64 = 0.5;
    let prior = CmbPrior::new(
        "inline",
        vec![CmbObservable::ShiftR, CmbObservable::OmegaBH2],
        vec![1.75, 0.0224],
        vec![vec![1.0, rho], vec![rho, 1.0]],
    )
    .unwrap();
    let mut moved = shift();
    moved.r_shift += 1.0;
    moved.omega_b_h2 += 1.0;
    let expected = 2.0 / (1.0 + rho);
    assert!((prior.chi_square(&moved) - expected).abs() < 1e-9);
    assert_eq!(prior.chi_square(&shift()), 0.0);
}

#[test]
fn bad_covariances_are_rejected() {
    let obs = vec![CmbObservable::ShiftR, CmbObservable::AcousticScale];
    let err = CmbPrior::new(
        "inline",
        obs.clone(),
        vec![1.0, 300.0],
        vec![vec![1.0, 2.0], vec![2.0, 1.0]],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "cmb-prior");

    let err = CmbPrior::new(
        "inline",
        obs.clone(),
        vec![1.0, 300.0],
        vec![vec![1.0, 0.1], vec![0.2, 1.0]],
    )
    .unwrap_err();
    assert_eq!(err.info().code, "cmb-prior");

    let err = CmbPrior::new("inline", obs, vec![1.0], vec![vec![1.0]]).unwrap_err();
    assert_eq!(err.info().code, "cmb-prior");
}

#[test]
fn loads_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cmb.json");
    std::fs::write(
        &path,
        r#"{"observables": ["R", "l_a", "omega_b_h2"],
            "mean": [1.7502, 301.471, 0.02236],
            "covariance": [[2.1e-5, 0.0, 0.0], [0.0, 8.0e-3, 0.0], [0.0, 0.0, 2.3e-8]]}"#,
    )
    .unwrap();
    let prior = CmbPrior::load(&path).unwrap();
    assert_eq!(prior.observables().len(), 3);
    assert_eq!(prior.mean()[1], 301.471);

    std::fs::write(&path, r#"{"observables": ["theta"], "mean": [1.0], "covariance": [[1.0]]}"#)
        .unwrap();
    let err = CmbPrior::load(&path).unwrap_err();
    assert_eq!(err.info().code, "cmb-parse");
}
