use mcgt_cosmo::{CosmoModel, CosmoParams, GrowthSolver, ModifiedGravity};

fn einstein_de_sitter() -> CosmoModel {
    CosmoModel {
        params: CosmoParams {
            h0: 70.0,
            ombh2: 0.02,
            omch2: 0.47,
            t_cmb: 0.0,
            ..CosmoParams::default()
        },
        ..CosmoModel::default()
    }
}

#[test]
fn growth_factor_is_one_today() {
    let solver = GrowthSolver::new(&CosmoModel::default()).unwrap();
    let table = solver.solve(&[0.25, 1.0, 0.5]).unwrap();
    assert_eq!(table.a, vec![0.25, 1.0, 0.5]);
    assert!((table.d[1] - 1.0).abs() < 1e-12);
    assert!(table.d[0] < table.d[2] && table.d[2] < table.d[1]);
    assert!((table.z[0] - 3.0).abs() < 1e-12);
}

#[test]
fn matter_domination_grows_linearly() {
    let solver = GrowthSolver::new(&einstein_de_sitter()).unwrap();
    let table = solver.solve(&[0.01, 0.1, 0.5, 1.0]).unwrap();
    for (a, (d, f)) in table.a.iter().zip(table.d.iter().zip(&table.f)) {
        assert!((d - a).abs() < 1e-6 * a.max(1e-2), "a={a} d={d}");
        assert!((f - 1.0).abs() < 1e-6, "a={a} f={f}");
    }
}

#[test]
fn lambda_cdm_growth_index_is_near_055() {
    let solver = GrowthSolver::new(&CosmoModel::default()).unwrap();
    let gamma = solver.growth_index(1.0).unwrap();
    assert!(gamma > 0.52 && gamma < 0.58, "gamma={gamma}");
}

#[test]
fn stronger_gravity_speeds_up_late_growth() {
    let gr = GrowthSolver::new(&CosmoModel::default()).unwrap();
    let boosted = GrowthSolver::new(&CosmoModel {
        gravity: ModifiedGravity { mu0: 0.3 },
        ..CosmoModel::default()
    })
    .unwrap();
    let f_gr = gr.solve(&[1.0]).unwrap().f[0];
    let f_mg = boosted.solve(&[1.0]).unwrap().f[0];
    assert!(f_mg > f_gr);
    let d_gr = gr.solve(&[0.5]).unwrap().d[0];
    let d_mg = boosted.solve(&[0.5]).unwrap().d[0];
    assert!(d_mg < d_gr);
}

#[test]
fn fsigma8_combines_rate_amplitude_and_growth() {
    let model = CosmoModel::default();
    let solver = GrowthSolver::new(&model).unwrap();
    let table = solver.solve_redshifts(&[0.5]).unwrap();
    let fs8 = solver.fsigma8(&[0.5]).unwrap();
    let expected = table.f[0] * model.params.sigma8 * table.d[0];
    assert!((fs8[0] - expected).abs() < 1e-12);
    assert!(fs8[0] > 0.3 && fs8[0] < 0.6);
}

#[test]
fn scale_factors_outside_the_range_are_rejected() {
    let solver = GrowthSolver::new(&CosmoModel::default()).unwrap();
    assert!(solver.solve(&[1e-4]).is_err());
    assert!(solver.solve(&[1.2]).is_err());
}

#[test]
fn nearly_coincident_scale_factors_still_solve() {
    let solver = GrowthSolver::new(&CosmoModel::default()).unwrap();
    let next = f64::from_bits(0.5f64.to_bits() + 2);
    let table = solver.solve(&[0.5, next, 1.0]).unwrap();
    assert_eq!(table.d.len(), 3);
    assert!((table.d[0] - table.d[1]).abs() < 1e-12);
    assert!((table.d[2] - 1.0).abs() < 1e-12);
}
