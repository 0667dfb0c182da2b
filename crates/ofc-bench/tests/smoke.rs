use std::fs;

use ofc_bench::config::BenchmarkConfig;
use ofc_bench::runner::{BenchRunner, RequestRow};
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path, threads: usize) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
deals:
  seed: 4242
  count: 4
  players: 2
tree:
  max_depth: 2
mcts:
  num_simulations: 120
  batch_size: 20
  timeout_ms: 60000
  convergence_threshold: 1000
  seed: 9
threads: {threads}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("requests.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

/// Rows with the wall-clock fields zeroed.
fn stable_rows(path: &std::path::Path) -> Vec<RequestRow> {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    jsonl
        .lines()
        .map(|line| {
            let mut row: RequestRow = serde_json::from_str(line).expect("row decodes");
            row.tree_ms = 0;
            row.analysis_ms = 0;
            row
        })
        .collect()
}

#[test]
fn smoke_run_writes_rows_and_summary() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path(), 2);
    let outputs = config.resolved_outputs();

    let runner = BenchRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("run completes");

    assert_eq!(summary.requests, 4);
    assert_eq!(summary.rows_written, 4);

    let rows = stable_rows(&summary.jsonl_path);
    assert_eq!(rows.len(), 4);
    for (index, row) in rows.iter().enumerate() {
        assert_eq!(row.request_id, format!("R{index:05}"));
        assert_eq!(row.simulations, 120);
        assert!(row.best_move.is_some());
        assert!(row.tree_nodes > 1);
        assert!((0.0..=1.0).contains(&row.confidence));
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("# Analysis Summary: test_smoke"));
    assert!(markdown.contains("| Avg confidence |"));
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let single = tempdir().expect("temp dir");
    let config = load_config(single.path(), 1);
    let outputs = config.resolved_outputs();
    let one = BenchRunner::new(config, outputs)
        .expect("runner")
        .run()
        .expect("run");

    let multi = tempdir().expect("temp dir");
    let config = load_config(multi.path(), 4);
    let outputs = config.resolved_outputs();
    let four = BenchRunner::new(config, outputs)
        .expect("runner")
        .run()
        .expect("run");

    assert_eq!(stable_rows(&one.jsonl_path), stable_rows(&four.jsonl_path));
}
