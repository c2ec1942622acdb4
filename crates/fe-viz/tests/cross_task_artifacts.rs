use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use approx::assert_relative_eq;
use fe_core::{BatchReport, MetricKind, ModelType, TaskMetricSummary};
use fe_viz::cross_task_report;

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("forecast_eval_viz_{}_{}_{}", std::process::id(), nanos, name));
    p
}

fn summary(scale: f64, days: usize) -> TaskMetricSummary {
    let rmse: Vec<f64> = (1..=days).map(|d| scale * d as f64).collect();
    let mse = rmse.iter().map(|x| x * x).collect();
    TaskMetricSummary::new(rmse, vec![0.8; days], mse).unwrap()
}

fn three_model_report() -> BatchReport {
    let mut r = BatchReport::new();
    r.insert("lstm_a", ModelType::Lstm, summary(0.1, 7)).unwrap();
    r.insert("fcnn_a", ModelType::Fcnn, summary(0.2, 7)).unwrap();
    r.insert("gnn_a", ModelType::Gnn, summary(0.3, 5)).unwrap();
    r
}

#[test]
fn cumulative_series_follow_batch_order() {
    let report = cross_task_report(&three_model_report(), 7).unwrap().expect("non-empty");
    let kinds: Vec<MetricKind> = report.cumulative.iter().map(|a| a.metric).collect();
    assert_eq!(kinds, MetricKind::ALL.to_vec());

    let rmse = &report.cumulative[0];
    let ids: Vec<&str> = rmse.series.iter().map(|s| s.task_id.as_str()).collect();
    assert_eq!(ids, vec!["lstm_a", "fcnn_a"]);
    assert_eq!(rmse.incomplete, vec!["gnn_a".to_string()]);
    // 0.1 * (1 + 2 + ... + 7)
    assert_relative_eq!(rmse.series[0].cumulative[6], 2.8, epsilon = 1e-12);

    assert_eq!(report.table.columns, vec!["lstm_a", "fcnn_a", "gnn_a"]);
    assert_eq!(report.table.cell("RMSE Day 7", "gnn_a"), Some("N/A"));
    assert_eq!(report.table.cell("RMSE Day 1", "fcnn_a"), Some("0.2000"));
    assert_eq!(report.daily.len(), 3);
    assert_eq!(report.daily[2].days, vec![1, 2, 3, 4, 5]);
}

#[test]
fn artifacts_are_written_to_disk() {
    let dir = tmp_dir("report");
    let report = cross_task_report(&three_model_report(), 7).unwrap().unwrap();
    let written = report.write_to_dir(&dir).unwrap();

    for name in [
        "cumulative_rmse.json",
        "cumulative_r2.json",
        "cumulative_mse.json",
        "summary_table.json",
        "summary_table.csv",
        "daily/lstm_a.json",
    ] {
        assert!(dir.join(name).is_file(), "missing {name}");
    }
    assert_eq!(written.len(), 3 + 2 + 3);

    let v: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("cumulative_r2.json")).unwrap()).unwrap();
    assert_eq!(v["schema_version"], "forecast_eval_cumulative_v0");
    assert_eq!(v["meta"]["tool"], "forecast-eval");
    assert_eq!(v["metric"], "r2");

    let csv = std::fs::read_to_string(dir.join("summary_table.csv")).unwrap();
    assert!(csv.starts_with("Metric,lstm_a,fcnn_a,gnn_a\n"));
    assert!(csv.contains("R² Mean,0.8000,0.8000,N/A"));

    // Writing again over an existing directory is fine.
    report.write_to_dir(&dir).unwrap();
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sanitized_id_collisions_keep_every_daily_file() {
    let dir = tmp_dir("collide");
    let mut r = BatchReport::new();
    r.insert("lstm/a", ModelType::Lstm, summary(0.1, 7)).unwrap();
    r.insert("lstm_a", ModelType::Lstm, summary(0.2, 7)).unwrap();
    let report = cross_task_report(&r, 7).unwrap().unwrap();
    let written = report.write_to_dir(&dir).unwrap();

    let daily: Vec<&PathBuf> = written.iter().filter(|p| p.parent() == Some(dir.join("daily").as_path())).collect();
    assert_eq!(daily.len(), 2);
    assert_ne!(daily[0], daily[1]);

    let first: serde_json::Value = serde_json::from_slice(&std::fs::read(daily[0]).unwrap()).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&std::fs::read(daily[1]).unwrap()).unwrap();
    assert_eq!(first["task_id"], "lstm/a");
    assert_eq!(second["task_id"], "lstm_a");
    std::fs::remove_dir_all(&dir).ok();
}
