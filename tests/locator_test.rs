//! Run discovery integration tests

use std::fs;
use std::path::Path;
use trueno_curves::experiment::{locate_runs, RunMetadata};

fn write_run(dir: &Path, config: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("progress.txt"), "Epoch\tAverageEpRet\n0\t1.0\n").unwrap();
    fs::write(dir.join("config.json"), config).unwrap();
}

#[test]
fn test_finds_nested_runs() {
    let tmp = tempfile::tempdir().unwrap();
    write_run(&tmp.path().join("ppo/cartpole/s0"), r#"{"exp_name": "ppo"}"#);
    write_run(&tmp.path().join("ppo/cartpole/s1"), r#"{"exp_name": "ppo"}"#);
    write_run(&tmp.path().join("sac/s0"), r#"{"exp_name": "sac"}"#);
    fs::create_dir_all(tmp.path().join("empty/deeper")).unwrap();

    let runs = locate_runs(tmp.path());
    assert_eq!(runs.len(), 3);
    assert!(runs[0].root().ends_with("ppo/cartpole/s0"));
    assert!(runs[1].root().ends_with("ppo/cartpole/s1"));
    assert_eq!(runs[2].exp_name(), Some("sac"));
    assert_eq!(runs[2].results_path(), tmp.path().join("sac/s0/progress.txt"));
}

#[test]
fn test_root_itself_can_be_a_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_run(tmp.path(), r#"{"exp_name": "solo"}"#);

    let runs = locate_runs(tmp.path());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].root(), tmp.path());
}

#[test]
fn test_runs_without_metadata_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    write_run(&tmp.path().join("good"), r#"{"exp_name": "ppo"}"#);
    write_run(&tmp.path().join("array"), "[1, 2, 3]");
    let missing = tmp.path().join("missing");
    fs::create_dir_all(&missing).unwrap();
    fs::write(missing.join("progress.txt"), "Epoch\n0\n").unwrap();

    let runs = locate_runs(tmp.path());
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].exp_name(), Some("ppo"));
}

#[test]
fn test_non_string_exp_name() {
    let metadata = RunMetadata::from_json_str(r#"{"exp_name": 42, "seed": 3}"#).unwrap();
    assert_eq!(metadata.exp_name(), Some("42".to_string()));

    let metadata = RunMetadata::from_json_str(r#"{"exp_name": null}"#).unwrap();
    assert_eq!(metadata.exp_name(), None);
}
