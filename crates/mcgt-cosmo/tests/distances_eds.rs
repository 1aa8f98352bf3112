use mcgt_cosmo::{Background, CosmoParams, DistanceTable, Distances};

fn einstein_de_sitter() -> Background {
    let params = CosmoParams {
        h0: 70.0,
        ombh2: 0.02,
        omch2: 0.47,
        t_cmb: 0.0,
        ..CosmoParams::default()
    };
    Background::new(&params).unwrap()
}

fn analytic_comoving(background: &Background, z: f64) -> f64 {
    2.0 * background.hubble_distance() * (1.0 - 1.0 / (1.0 + z).sqrt())
}

#[test]
fn comoving_distance_matches_matter_domination() {
    let background = einstein_de_sitter();
    let distances = Distances::new(background.clone(), 1024);
    for z in [0.1, 0.5, 1.0, 3.0, 1100.0] {
        let expected = analytic_comoving(&background, z);
        let got = distances.comoving_distance(z).unwrap();
        assert!(
            ((got - expected) / expected).abs() < 1e-8,
            "z={z} got={got} expected={expected}"
        );
    }
    assert_eq!(distances.comoving_distance(0.0).unwrap(), 0.0);
}

#[test]
fn derived_distances_follow_their_definitions() {
    let distances = Distances::new(Background::new(&CosmoParams::default()).unwrap(), 512);
    let z = 0.8;
    let dm = distances.transverse_comoving_distance(z).unwrap();
    let dl = distances.luminosity_distance(z).unwrap();
    let da = distances.angular_diameter_distance(z).unwrap();
    let dh = distances.hubble_distance_at(z).unwrap();
    assert!((dl - dm * 1.8).abs() < 1e-9);
    assert!((da - dm / 1.8).abs() < 1e-9);
    let dv = distances.volume_distance(z).unwrap();
    assert!((dv.powi(3) - z * dm * dm * dh).abs() / dv.powi(3) < 1e-12);
    let mu = distances.distance_modulus(z).unwrap();
    assert!((mu - (5.0 * dl.log10() + 25.0)).abs() < 1e-12);
}

#[test]
fn open_and_closed_geometries_bracket_flat() {
    let flat = Distances::new(Background::new(&CosmoParams::default()).unwrap(), 512);
    let open = Distances::new(
        Background::new(&CosmoParams {
            omega_k: 0.05,
            ..CosmoParams::default()
        })
        .unwrap(),
        512,
    );
    let z = 2.0;
    let open_dc = open.comoving_distance(z).unwrap();
    let open_dm = open.transverse_comoving_distance(z).unwrap();
    assert!(open_dm > open_dc);
    let closed = Distances::new(
        Background::new(&CosmoParams {
            omega_k: -0.05,
            ..CosmoParams::default()
        })
        .unwrap(),
        512,
    );
    let closed_dc = closed.comoving_distance(z).unwrap();
    assert!(closed.transverse_comoving_distance(z).unwrap() < closed_dc);
    let flat_dc = flat.comoving_distance(z).unwrap();
    assert_eq!(flat.transverse_comoving_distance(z).unwrap(), flat_dc);
}

#[test]
fn bad_redshifts_are_rejected() {
    let distances = Distances::new(einstein_de_sitter(), 64);
    assert!(distances.comoving_distance(-0.1).is_err());
    assert!(distances.distance_modulus(0.0).is_err());
}

#[test]
fn table_interpolates_close_to_direct_integration() {
    let background = Background::new(&CosmoParams::default()).unwrap();
    let table = DistanceTable::build(&background, 2.5, 2001).unwrap();
    let direct = Distances::new(background, 1024);
    for z in [0.01, 0.37, 1.2, 2.5] {
        let expected = direct.comoving_distance(z).unwrap();
        let got = table.comoving_distance(z).unwrap();
        assert!(((got - expected) / expected).abs() < 1e-5, "z={z}");
    }
    let moduli = table.distance_moduli(&[0.1, 1.0]).unwrap();
    assert!(moduli[0] < moduli[1]);
    assert!(table.comoving_distance(2.6).is_err());

    let rows = table.rows();
    assert_eq!(rows.len(), 2001);
    assert_eq!(rows[0].mu, None);
    assert_eq!(rows[0].d_c, 0.0);
    assert!(rows[2000].mu.is_some());
}
