//! Pivoted summary table: one column per task, one row per metric and day.

use fe_core::{BatchReport, MetricKind, Result};
use serde::Serialize;

use crate::meta::ArtifactMeta;

/// Cell text for a task whose summary is shorter than the horizon.
pub const NOT_AVAILABLE: &str = "N/A";

/// Label of the first row.
pub const MODEL_TYPE_ROW: &str = "Model Type";

#[derive(Debug, Clone, Serialize)]
pub struct SummaryTableArtifact {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    /// Task ids in batch order.
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    /// One cell per entry of `columns`.
    pub cells: Vec<String>,
}

/// Four-decimal rendering; NaN renders as `NaN`.
pub fn format_value(x: f64) -> String {
    if x.is_nan() { "NaN".to_string() } else { format!("{:.4}", x) }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Build the pivoted table.
///
/// Rows: `Model Type`, then per metric (RMSE, R², MSE) one `<label> Day k`
/// row per day followed by `<label> Mean`.
pub fn summary_table_artifact(report: &BatchReport, horizon_days: usize) -> Result<SummaryTableArtifact> {
    let columns: Vec<String> = report.iter().map(|t| t.task_id.clone()).collect();
    let mut rows = Vec::with_capacity(1 + MetricKind::ALL.len() * (horizon_days + 1));

    rows.push(TableRow {
        label: MODEL_TYPE_ROW.to_string(),
        cells: report.iter().map(|t| t.model_type.to_string()).collect(),
    });

    for kind in MetricKind::ALL {
        let per_task: Vec<Option<&[f64]>> =
            report.iter().map(|t| t.metrics.full_series(kind, horizon_days)).collect();

        for day in 0..horizon_days {
            rows.push(TableRow {
                label: format!("{} Day {}", kind.label(), day + 1),
                cells: per_task
                    .iter()
                    .map(|s| s.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_value(v[day])))
                    .collect(),
            });
        }
        rows.push(TableRow {
            label: format!("{} Mean", kind.label()),
            cells: per_task
                .iter()
                .map(|s| s.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format_value(mean(v))))
                .collect(),
        });
    }

    Ok(SummaryTableArtifact {
        schema_version: "forecast_eval_summary_table_v0".to_string(),
        meta: ArtifactMeta::now()?,
        columns,
        rows,
    })
}

impl SummaryTableArtifact {
    /// Cell at `(row label, task id)`.
    pub fn cell(&self, label: &str, task_id: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == task_id)?;
        let row = self.rows.iter().find(|r| r.label == label)?;
        row.cells.get(col).map(String::as_str)
    }

    /// Render as CSV with a `Metric` header column.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let header = std::iter::once("Metric").chain(self.columns.iter().map(String::as_str));
        push_csv_line(&mut out, header);
        for row in &self.rows {
            push_csv_line(
                &mut out,
                std::iter::once(row.label.as_str()).chain(row.cells.iter().map(String::as_str)),
            );
        }
        out
    }
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, f) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if f.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&f.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(f);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use fe_core::{ModelType, TaskMetricSummary};

    fn report() -> BatchReport {
        let mut r = BatchReport::new();
        r.insert(
            "fcnn_run",
            ModelType::Fcnn,
            TaskMetricSummary::new(vec![1.0, 2.0], vec![f64::NAN, 0.5], vec![1.0, 4.0]).unwrap(),
        )
        .unwrap();
        r.insert(
            "gnn, short",
            ModelType::Gnn,
            TaskMetricSummary::new(vec![1.0], vec![0.5], vec![1.0]).unwrap(),
        )
        .unwrap();
        r
    }

    #[test]
    fn layout_and_formatting() {
        let t = summary_table_artifact(&report(), 2).unwrap();
        assert_eq!(t.columns, vec!["fcnn_run", "gnn, short"]);
        let labels: Vec<&str> = t.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Model Type",
                "RMSE Day 1",
                "RMSE Day 2",
                "RMSE Mean",
                "R² Day 1",
                "R² Day 2",
                "R² Mean",
                "MSE Day 1",
                "MSE Day 2",
                "MSE Mean",
            ]
        );
        assert_eq!(t.cell("Model Type", "gnn, short"), Some("GNN"));
        assert_eq!(t.cell("RMSE Day 2", "fcnn_run"), Some("2.0000"));
        assert_eq!(t.cell("RMSE Mean", "fcnn_run"), Some("1.5000"));
        assert_eq!(t.cell("R² Day 1", "fcnn_run"), Some("NaN"));
        assert_eq!(t.cell("R² Mean", "fcnn_run"), Some("NaN"));
        assert_eq!(t.cell("MSE Day 1", "gnn, short"), Some(NOT_AVAILABLE));
        assert_eq!(t.cell("MSE Mean", "gnn, short"), Some(NOT_AVAILABLE));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        let csv = summary_table_artifact(&report(), 2).unwrap().to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Metric,fcnn_run,\"gnn, short\""));
        assert_eq!(lines.next(), Some("Model Type,FCNN,GNN"));
        assert_eq!(csv.lines().count(), 11);
    }
}
