use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_forecast-eval"))
}

fn tmp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("forecast_eval_cli_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn read_json(path: &Path) -> serde_json::Value {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
    serde_json::from_slice(&bytes).unwrap()
}

/// 2 points x 7 days, two samples.
fn write_source(path: &Path, offset: f64) {
    let n = 2 * 7;
    let truth: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let pred: Vec<f64> = (0..n).map(|i| i as f64 + offset * (1.0 + (i % 2) as f64)).collect();
    let rows = json!([
        { "y_rol": truth, "y_rol_pred": pred, "dia_mes_ano": "2024-01-10" },
        { "y_rol": truth, "y_rol_pred": truth, "dia_mes_ano": "2024-01-11" },
    ]);
    std::fs::write(path, serde_json::to_vec(&rows).unwrap()).unwrap();
}

fn write_config(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    write_source(&dir.join("fcnn.json"), 0.5);
    write_source(&dir.join("gnn.json"), 1.0);
    let yaml = "\
grid:
  grid_points: 2
  horizon_days: 7
report_dir: reports
tasks:
  - task_id: fcnn
    model_type: FCNN
    model_file: fcnn.json
    output_directory: out/fcnn
  - task_id: lstm
    model_type: LSTM
    model_file: missing.json
    output_directory: out/lstm
  - task_id: gnn
    model_type: GNN
    model_file: gnn.json
    output_directory: out/gnn
    visualization_pos: 3
";
    let cfg = dir.join("batch.yaml");
    std::fs::write(&cfg, yaml).unwrap();
    cfg
}

#[test]
fn run_writes_report_and_isolates_failed_task() {
    let dir = tmp_path("run");
    let cfg = write_config(&dir);

    let out = run(&["run", "--config", cfg.to_str().unwrap()]);
    assert!(
        out.status.success(),
        "run should exit 0 even with a failed task, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("succeeded: 2"), "stdout={stdout}");

    let reports = dir.join("reports");
    let summary = read_json(&reports.join("batch_summary.json"));
    assert_eq!(summary["schema_version"], "forecast_eval_batch_summary_v0");
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["succeeded"], 2);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["skipped"], 0);
    assert_eq!(summary["failures"][0]["task_id"], "lstm");
    assert_eq!(summary["source"]["sha256"].as_str().unwrap().len(), 64);

    let report = read_json(&reports.join("batch_report.json"));
    let keys: Vec<&String> = report.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(report["fcnn"]["model_type"], "FCNN");
    assert_eq!(report["gnn"]["metrics"]["rmse"].as_array().unwrap().len(), 7);

    assert!(reports.join("cumulative_rmse.json").is_file());
    assert!(reports.join("summary_table.csv").is_file());
    assert!(dir.join("out/fcnn/sample.json").is_file());
    let sample = read_json(&dir.join("out/gnn/sample.json"));
    assert_eq!(sample["highlight_day"], 3);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_report_dir_flag_overrides_config() {
    let dir = tmp_path("override");
    let cfg = write_config(&dir);
    let custom = dir.join("custom");

    let out = run(&["run", "-c", cfg.to_str().unwrap(), "--report-dir", custom.to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    assert!(custom.join("batch_report.json").is_file());
    assert!(!dir.join("reports").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn eval_single_file() {
    let dir = tmp_path("eval");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("lstm.json");
    write_source(&src, 0.25);
    let out_dir = dir.join("out");

    let out = run(&[
        "eval",
        "--model",
        "lstm",
        "--file",
        src.to_str().unwrap(),
        "--output",
        out_dir.to_str().unwrap(),
        "--grid-points",
        "2",
        "--pos",
        "6",
    ]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));

    let summary = read_json(&out_dir.join("batch_summary.json"));
    assert_eq!(summary["succeeded"], 1);
    assert_eq!(summary["source"]["kind"], "file");
    let daily = read_json(&out_dir.join("daily_metrics.json"));
    assert_eq!(daily["model_type"], "LSTM");
    assert_eq!(daily["days"].as_array().unwrap().len(), 7);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn eval_rejects_out_of_range_day() {
    let dir = tmp_path("eval_pos");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("fcnn.json");
    write_source(&src, 0.25);

    let out = run(&[
        "eval",
        "-m",
        "FCNN",
        "-f",
        src.to_str().unwrap(),
        "-o",
        dir.join("out").to_str().unwrap(),
        "--grid-points",
        "2",
        "--pos",
        "7",
    ]);
    assert!(!out.status.success());
    assert!(!dir.join("out").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn validate_reports_invalid_entries() {
    let dir = tmp_path("validate");
    let cfg = write_config(&dir);

    let out = run(&["validate", "--config", cfg.to_str().unwrap()]);
    assert!(out.status.success(), "stderr={}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["tasks"].as_array().unwrap().len(), 3);
    assert!(v["tasks"].as_array().unwrap().iter().all(|t| t["valid"] == true));

    let bad = dir.join("bad.json");
    std::fs::write(
        &bad,
        serde_json::to_vec(&json!({ "tasks": [{ "task_id": "x", "model_type": "RNN" }] })).unwrap(),
    )
    .unwrap();
    let out = run(&["validate", "--config", bad.to_str().unwrap()]);
    assert!(!out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["tasks"][0]["valid"], false);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unreadable_config_fails() {
    let missing = tmp_path("nope.yaml");
    let out = run(&["run", "--config", missing.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(!String::from_utf8_lossy(&out.stderr).is_empty());
}

#[test]
fn version_prints_tool_name() {
    let out = run(&["version"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("forecast-eval "));
}

#[test]
fn summary_is_printed_even_when_report_cannot_be_written() {
    let dir = tmp_path("unwritable");
    let cfg = write_config(&dir);
    // A regular file where the report directory should go.
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let report_dir = blocker.join("reports");

    let out = run(&["run", "-c", cfg.to_str().unwrap(), "--report-dir", report_dir.to_str().unwrap()]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("succeeded: 2"), "stdout={stdout}");
    assert!(stdout.contains("failed: 1"), "stdout={stdout}");
    assert!(String::from_utf8_lossy(&out.stderr).contains("writing report"));

    std::fs::remove_dir_all(&dir).ok();
}
