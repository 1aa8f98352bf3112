use mcgt_cosmo::recombination::{z_drag, z_star};
use mcgt_cosmo::{CmbShift, CosmoModel, CosmoParams, RecombinationSummary};

#[test]
fn fitting_formulas_land_near_planck_values() {
    let params = CosmoParams::default();
    let zs = z_star(params.ombh2, params.ommh2());
    let zd = z_drag(params.ombh2, params.ommh2());
    assert!(zs > 1085.0 && zs < 1095.0, "z*={zs}");
    assert!(zd > 1000.0 && zd < 1080.0, "z_d={zd}");
}

#[test]
fn sound_horizons_are_in_the_expected_range() {
    let summary = RecombinationSummary::compute(&CosmoModel::default()).unwrap();
    assert!(summary.r_drag > 140.0 && summary.r_drag < 160.0, "{summary:?}");
    assert!(summary.r_s_star > 135.0 && summary.r_s_star < 155.0, "{summary:?}");
    assert!(summary.r_drag > summary.r_s_star);
}

#[test]
fn shift_parameters_match_planck_like_cosmology() {
    let shift = CmbShift::compute(&CosmoModel::default()).unwrap();
    assert!(shift.l_a > 295.0 && shift.l_a < 308.0, "{shift:?}");
    assert!(shift.r_shift > 1.70 && shift.r_shift < 1.80, "{shift:?}");
    assert_eq!(shift.omega_b_h2, CosmoParams::default().ombh2);
}

#[test]
fn sound_horizon_needs_photons() {
    let mut model = CosmoModel::default();
    model.params.t_cmb = 0.0;
    let err = RecombinationSummary::compute(&model).unwrap_err();
    assert_eq!(err.info().code, "no-radiation");
}
