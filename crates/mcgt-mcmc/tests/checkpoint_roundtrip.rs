mod common;

use std::path::Path;

use common::{ensemble_config, metropolis_config, Gaussian};
use mcgt_mcmc::{resume, run, Chain, CheckpointPayload, RunConfig, RunManifest};
use tempfile::tempdir;

fn with_checkpoints(mut config: RunConfig, root: &Path, keep: usize) -> RunConfig {
    config.output.run_directory = Some(root.join("run"));
    config.checkpoint.interval = 10;
    config.checkpoint.max_to_keep = keep;
    config
}

#[test]
fn resumed_metropolis_run_matches_uninterrupted_run() {
    let dir = tempdir().unwrap();
    let target = Gaussian::standard_pair();
    let config = with_checkpoints(metropolis_config(60), dir.path(), 10);

    let full = run(&config, &target, 888).unwrap();
    assert_eq!(full.summary.checkpoints.len(), 6);
    let middle = full.summary.checkpoints[2].clone();
    assert!(middle.ends_with("ckpt_00030.json"));
    let payload = CheckpointPayload::load(&middle).unwrap();
    assert_eq!(payload.next_step, 30);

    let resumed = resume(&middle, &target).unwrap();
    assert_eq!(full.summary.final_state_hash, resumed.summary.final_state_hash);
    assert_eq!(full.chain, resumed.chain);
    assert_eq!(full.summary.best, resumed.summary.best);
}

#[test]
fn resumed_ensemble_run_matches_uninterrupted_run() {
    let dir = tempdir().unwrap();
    let target = Gaussian::standard_pair();
    let config = with_checkpoints(ensemble_config(40, 6), dir.path(), 10);

    let full = run(&config, &target, 5).unwrap();
    let resumed = resume(&full.summary.checkpoints[0], &target).unwrap();
    assert_eq!(full.summary.final_state_hash, resumed.summary.final_state_hash);
    assert_eq!(full.chain, resumed.chain);
}

#[test]
fn retention_keeps_newest_checkpoints_and_artefacts_are_written() {
    let dir = tempdir().unwrap();
    let target = Gaussian::standard_pair();
    let config = with_checkpoints(metropolis_config(50), dir.path(), 2);

    let out = run(&config, &target, 3).unwrap();
    assert_eq!(out.summary.checkpoints.len(), 2);
    assert!(out.summary.checkpoints[1].ends_with("ckpt_00050.json"));
    let on_disk = std::fs::read_dir(dir.path().join("run/checkpoints"))
        .unwrap()
        .count();
    assert_eq!(on_disk, 2);

    let chain = Chain::read_csv(out.summary.chain_path.as_ref().unwrap()).unwrap();
    assert_eq!(chain, out.chain);

    let manifest = RunManifest::load(out.summary.manifest_path.as_ref().unwrap()).unwrap();
    assert_eq!(manifest.param_names, vec!["x0", "x1"]);
    assert_eq!(manifest.final_state_hash, out.summary.final_state_hash);
    assert_eq!(manifest.master_seed, 3);
    assert_eq!(manifest.checkpoints.len(), 2);
    assert!(!manifest.provenance.config_hash.is_empty());
}

#[test]
fn checkpoints_from_a_newer_major_schema_are_rejected() {
    let dir = tempdir().unwrap();
    let target = Gaussian::standard_pair();
    let config = with_checkpoints(metropolis_config(20), dir.path(), 4);
    let out = run(&config, &target, 5).unwrap();
    let path = out.summary.checkpoints[0].clone();

    let mut payload = CheckpointPayload::load(&path).unwrap();
    payload.schema.major += 1;
    payload.store(&path).unwrap();
    let err = CheckpointPayload::load(&path).unwrap_err();
    assert_eq!(err.info().code, "checkpoint-schema");
}

#[test]
fn retention_after_resume_counts_earlier_checkpoints() {
    let dir = tempdir().unwrap();
    let target = Gaussian::standard_pair();
    let config = with_checkpoints(metropolis_config(30), dir.path(), 2);
    let first = run(&config, &target, 21).unwrap();
    let last = first.summary.checkpoints[1].clone();
    assert!(last.ends_with("ckpt_00030.json"));

    let mut payload = CheckpointPayload::load(&last).unwrap();
    payload.config.steps = 60;
    payload.store(&last).unwrap();
    let resumed = resume(&last, &target).unwrap();

    let names = |paths: Vec<std::path::PathBuf>| -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    };
    assert_eq!(
        names(resumed.summary.checkpoints.clone()),
        vec!["ckpt_00050.json", "ckpt_00060.json"]
    );
    let on_disk = std::fs::read_dir(dir.path().join("run/checkpoints"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(names(on_disk), vec!["ckpt_00050.json", "ckpt_00060.json"]);
}
