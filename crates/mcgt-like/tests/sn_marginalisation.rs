use std::fs;

use mcgt_like::sn::chi_square;
use mcgt_like::{SnOffset, SnPoint, SupernovaSample};
use proptest::prelude::*;

proptest! {
    #[test]
    fn marginalised_chi2_ignores_constant_shifts(
        residuals in prop::collection::vec(-1.0f64..1.0, 2..20),
        shift in -5.0f64..5.0,
    ) {
        let sigmas: Vec<f64> = (0..residuals.len()).map(|i| 0.1 + 0.01 * i as f64).collect();
        let shifted: Vec<f64> = residuals.iter().map(|r| r + shift).collect();
        let base = chi_square(&residuals, &sigmas, SnOffset::Marginalize);
        let moved = chi_square(&shifted, &sigmas, SnOffset::Marginalize);
        prop_assert!(base >= 0.0);
        prop_assert!((base - moved).abs() < 1e-6 * base.max(1.0));
        prop_assert!(chi_square(&residuals, &sigmas, SnOffset::Fixed) >= base - 1e-9);
    }
}

#[test]
fn constant_residuals_marginalise_to_zero() {
    let residuals = [0.3; 5];
    let sigmas = [0.1, 0.2, 0.15, 0.1, 0.3];
    assert!(chi_square(&residuals, &sigmas, SnOffset::Marginalize) < 1e-12);
    assert!(chi_square(&residuals, &sigmas, SnOffset::Fixed) > 1.0);
}

#[test]
fn loads_aliased_columns_and_skips_comments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sn.csv");
    fs::write(
        &path,
        "# toy sample\nname,zcmb,mu,dmu\nsn1,0.1,38.3,0.15\nsn2,0.5,42.3,0.2\n",
    )
    .unwrap();
    let sample = SupernovaSample::load(&path).unwrap();
    assert_eq!(sample.len(), 2);
    assert_eq!(
        sample.points()[1],
        SnPoint {
            z: 0.5,
            mu: 42.3,
            sigma_mu: 0.2
        }
    );
    assert_eq!(sample.z_max(), 0.5);
}

#[test]
fn invalid_rows_name_the_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sn.csv");
    fs::write(&path, "z,mu,sigma_mu\n0.1,38.3,0.15\n0.2,39.9,0.0\n").unwrap();
    let err = SupernovaSample::load(&path).unwrap_err();
    assert_eq!(err.info().code, "dataset-value");
    assert_eq!(err.info().context["row"], "2");
    assert_eq!(err.info().context["column"], "sigma_mu");
}

#[test]
fn empty_tables_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sn.csv");
    fs::write(&path, "z,mu,sigma_mu\n").unwrap();
    let err = SupernovaSample::load(&path).unwrap_err();
    assert_eq!(err.info().code, "dataset-empty");
}

#[test]
fn missing_columns_are_row_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sn.csv");
    fs::write(&path, "z,mu\n0.1,38.3\n").unwrap();
    let err = SupernovaSample::load(&path).unwrap_err();
    assert_eq!(err.info().code, "dataset-row");
}
