use std::fs;
use std::process::Command;

use tempfile::tempdir;

const YAML: &str = r#"
run_id: "cli_check"
deals:
  seed: 1
  count: 2
outputs:
  jsonl: "out/{run_id}/requests.jsonl"
  summary_md: "out/{run_id}/summary.md"
"#;

#[test]
fn validate_only_skips_the_run() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("bench.yaml");
    fs::write(&config, YAML).expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_ofc-bench"))
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--validate-only")
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Loaded configuration 'cli_check'"));
    assert!(stdout.contains("Validation-only mode"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn invalid_config_fails() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("bench.yaml");
    fs::write(&config, YAML.replace("cli_check", "cli check")).expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_ofc-bench"))
        .arg("--config")
        .arg(&config)
        .arg("--validate-only")
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("run_id"));
}
