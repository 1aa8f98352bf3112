use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mcgt_cosmo::{GlobalConfig, PowerSpectrum};
use serde_json::Value;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn mcgt(args: &[&str]) -> Output {
    let config = fixtures().join("global.toml");
    Command::new(env!("CARGO_BIN_EXE_mcgt"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .output()
        .expect("spawn mcgt")
}

fn ok_stdout(output: Output) -> String {
    assert!(
        output.status.success(),
        "mcgt failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

fn write_job(dir: &Path, steps: usize) -> PathBuf {
    let fx = fixtures();
    let job = format!(
        r#"
sampler:
  type: metropolis
steps: {steps}
burn_in: 10
parameters:
  - {{ name: H0, min: 55, max: 85, start: 67.4, step: 0.5 }}
  - {{ name: omch2, min: 0.08, max: 0.16, start: 0.12, step: 0.002 }}
checkpoint:
  interval: 10
seed_policy:
  master_seed: 2024
output:
  run_directory: run
likelihood:
  supernovae: {sn}
  bao: {bao}
  cmb: {cmb}
  rsd: {rsd}
"#,
        sn = fx.join("sn.csv").display(),
        bao = fx.join("bao.csv").display(),
        cmb = fx.join("cmb.json").display(),
        rsd = fx.join("rsd.csv").display(),
    );
    let path = dir.join("job.yaml");
    fs::write(&path, job).unwrap();
    path
}

#[test]
fn background_table_starts_at_unit_expansion_rate() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("bg.csv");
    ok_stdout(mcgt(&[
        "background",
        "--z-max",
        "2",
        "--points",
        "21",
        "--out",
        out.to_str().unwrap(),
    ]));
    let text = fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("z,E,H,D_C,D_M,D_L,D_A,D_V,mu"));
    let first: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(first[0].parse::<f64>().unwrap(), 0.0);
    assert!((first[1].parse::<f64>().unwrap() - 1.0).abs() < 1e-12);
    assert_eq!(first[8], "");
    assert_eq!(text.lines().count(), 22);
}

#[test]
fn growth_is_normalised_today() {
    let stdout = ok_stdout(mcgt(&["growth", "--points", "50"]));
    let last = stdout.lines().last().unwrap();
    let cols: Vec<f64> = last.split(',').map(|v| v.parse().unwrap()).collect();
    assert!((cols[0] - 1.0).abs() < 1e-12);
    assert!((cols[2] - 1.0).abs() < 1e-9);
    assert!(cols[3] > 0.4 && cols[3] < 0.6, "f(z=0) = {}", cols[3]);
}

#[test]
fn power_spectrum_is_positive_on_a_log_grid() {
    let stdout = ok_stdout(mcgt(&["power", "--points", "20", "--z", "0.5"]));
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("k,P"));
    let rows: Vec<(f64, f64)> = lines
        .map(|l| {
            let (k, p) = l.split_once(',').unwrap();
            (k.parse().unwrap(), p.parse().unwrap())
        })
        .collect();
    assert_eq!(rows.len(), 20);
    assert!((rows[0].0 - 1e-4).abs() < 1e-16);
    assert!(rows.iter().all(|(_, p)| *p > 0.0));
}

#[test]
fn power_wavenumbers_are_in_inverse_mpc() {
    let stdout = ok_stdout(mcgt(&["power", "--points", "5", "--z", "0"]));
    let model = GlobalConfig::load(&fixtures().join("global.toml"))
        .unwrap()
        .model();
    let spectrum = PowerSpectrum::new(&model.params).unwrap();
    for line in stdout.lines().skip(1) {
        let (k, p) = line.split_once(',').unwrap();
        let (k, p): (f64, f64) = (k.parse().unwrap(), p.parse().unwrap());
        let expected = spectrum.linear_z0(k);
        assert!(((p - expected) / expected).abs() < 1e-9, "k={k} P={p} expected {expected}");
    }
}

#[test]
fn recombination_reports_planck_like_values() {
    let stdout = ok_stdout(mcgt(&["--defaults", "recombination"]));
    let report: Value = serde_json::from_str(&stdout).unwrap();
    let z_star = report["z_star"].as_f64().unwrap();
    let r_drag = report["r_drag"].as_f64().unwrap();
    assert!(z_star > 1085.0 && z_star < 1095.0, "z_star {z_star}");
    assert!(r_drag > 140.0 && r_drag < 160.0, "r_drag {r_drag}");
    assert!(report["R"].as_f64().unwrap() > 1.7);
}

#[test]
fn missing_global_config_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_mcgt"))
        .args(["--config", "/nonexistent/mcgt.toml", "recombination"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--defaults"), "stderr: {stderr}");
}

#[test]
fn coverage_reports_every_group() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("coverage.json");
    ok_stdout(mcgt(&[
        "coverage",
        "--input",
        fixtures().join("phases.csv").to_str().unwrap(),
        "--value-column",
        "residual",
        "--group-column",
        "group",
        "--statistic",
        "mean",
        "--n-boot",
        "200",
        "--reference",
        "0",
        "--out",
        out.to_str().unwrap(),
    ]));
    let report: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(report["n_groups"], 12);
    assert_eq!(report["intervals"][0]["group"], "g0");
    let coverage = report["coverage"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&coverage));
}

#[test]
fn mcmc_resume_and_summarize_agree() {
    let tmp = TempDir::new().unwrap();
    let job = write_job(tmp.path(), 30);
    let job_arg = job.to_str().unwrap();

    let first: Value = serde_json::from_str(&ok_stdout(mcgt(&["mcmc", "--job", job_arg]))).unwrap();
    let run_dir = tmp.path().join("run");
    assert!(run_dir.join("chain.csv").exists());
    assert!(run_dir.join("manifest.json").exists());
    let bestfit: Value =
        serde_json::from_slice(&fs::read(run_dir.join("bestfit.json")).unwrap()).unwrap();
    assert!(bestfit["chi2"]["total"].as_f64().unwrap().is_finite());
    assert!(bestfit["params"]["H0"].is_number());

    let checkpoint = run_dir.join("checkpoints").join("ckpt_00010.json");
    let resumed: Value = serde_json::from_str(&ok_stdout(mcgt(&[
        "resume",
        "--job",
        job_arg,
        "--checkpoint",
        checkpoint.to_str().unwrap(),
    ])))
    .unwrap();
    assert_eq!(first["final_state_hash"], resumed["final_state_hash"]);

    let summary: Value = serde_json::from_str(&ok_stdout(mcgt(&[
        "summarize",
        "--chain",
        run_dir.join("chain.csv").to_str().unwrap(),
    ])))
    .unwrap();
    assert_eq!(summary["params"][0]["name"], "H0");
    assert_eq!(summary["samples"], 20);
}
