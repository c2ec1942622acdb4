//! `forecast-eval run` / `eval` / `validate`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fe_batch::{
    BatchOutcome, BatchRunner, BatchSummary, EvaluationTask, FsLoader, JsonExportSink, PlannedTask,
    read_batch_config,
};
use fe_core::{GridShape, ModelType};
use fe_data::SourceSchema;
use fe_viz::{ArtifactMeta, cross_task_report, write_json};
use serde::Serialize;

/// Where the report artifacts of a run come from.
#[derive(Debug, Clone, Serialize)]
struct RunSource {
    kind: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchSummaryArtifact<'a> {
    schema_version: &'static str,
    meta: ArtifactMeta,
    source: RunSource,
    grid: GridShape,
    #[serde(flatten)]
    summary: &'a BatchSummary,
}

pub fn cmd_run(config: &Path, report_dir: Option<&Path>) -> Result<()> {
    let loaded = read_batch_config(config)?;
    let plan = loaded.config.plan(&loaded.base_dir);
    let grid = loaded.config.grid;

    let runner = BatchRunner::new(FsLoader, JsonExportSink)
        .with_schema(loaded.config.schema.clone())
        .with_shape(grid);
    let outcome = runner.run(&plan);

    let report_dir: PathBuf = report_dir
        .map(Path::to_path_buf)
        .or_else(|| loaded.config.report_dir(&loaded.base_dir))
        .unwrap_or_else(|| loaded.base_dir.join("reports"));
    let source = RunSource {
        kind: "config",
        path: config.display().to_string(),
        sha256: Some(loaded.sha256.clone()),
    };
    print_summary(&outcome, &report_dir);
    write_outputs(&report_dir, &outcome, &grid, source)
        .with_context(|| format!("writing report to {}", report_dir.display()))
}

pub fn cmd_eval(
    model: ModelType,
    file: &Path,
    output: &Path,
    pos: usize,
    grid_points: Option<usize>,
    horizon_days: Option<usize>,
) -> Result<()> {
    let defaults = GridShape::default();
    let grid = GridShape::new(
        grid_points.unwrap_or(defaults.grid_points),
        horizon_days.unwrap_or(defaults.horizon_days),
    )?;
    grid.check_day(pos)?;

    let task = EvaluationTask {
        task_id: model.as_str().to_string(),
        model_type: model,
        data_source: file.to_path_buf(),
        output_target: output.to_path_buf(),
        enabled: true,
        highlight_day: pos,
    };
    let runner = BatchRunner::new(FsLoader, JsonExportSink)
        .with_schema(SourceSchema::default())
        .with_shape(grid);
    let outcome = runner.run(&[PlannedTask::Ready(task)]);

    let source = RunSource { kind: "file", path: file.display().to_string(), sha256: None };
    print_summary(&outcome, output);
    write_outputs(output, &outcome, &grid, source)
        .with_context(|| format!("writing report to {}", output.display()))
}

pub fn cmd_validate(config: &Path) -> Result<()> {
    let loaded = read_batch_config(config)?;
    let plan = loaded.config.plan(&loaded.base_dir);

    let mut invalid = 0usize;
    let mut tasks = Vec::with_capacity(plan.len());
    for p in &plan {
        let (valid, error) = match p {
            PlannedTask::Ready(_) => (true, None),
            PlannedTask::Invalid { error, .. } => {
                invalid += 1;
                (false, Some(error.to_string()))
            }
        };
        tasks.push(serde_json::json!({
            "task_id": p.task_id(),
            "enabled": p.enabled(),
            "valid": valid,
            "error": error,
        }));
    }

    let out = serde_json::json!({
        "config": config.display().to_string(),
        "sha256": loaded.sha256,
        "grid": loaded.config.grid,
        "tasks": tasks,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    if invalid > 0 {
        anyhow::bail!("{invalid} of {} task entries are invalid", plan.len());
    }
    Ok(())
}

/// `batch_report.json`, `batch_summary.json` and the cross-task artifacts.
fn write_outputs(dir: &Path, outcome: &BatchOutcome, grid: &GridShape, source: RunSource) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_json(&dir.join("batch_report.json"), &outcome.report)?;

    let summary = BatchSummaryArtifact {
        schema_version: "forecast_eval_batch_summary_v0",
        meta: ArtifactMeta::now()?,
        source,
        grid: *grid,
        summary: &outcome.summary,
    };
    write_json(&dir.join("batch_summary.json"), &summary)?;

    if let Some(report) = cross_task_report(&outcome.report, grid.horizon_days)? {
        let written = report.write_to_dir(dir)?;
        tracing::info!(dir = %dir.display(), files = written.len(), "cross-task report written");
    }
    Ok(())
}

fn print_summary(outcome: &BatchOutcome, report_dir: &Path) {
    let s = &outcome.summary;
    println!(
        "tasks: {}  succeeded: {}  failed: {}  skipped: {}",
        s.total, s.succeeded, s.failed, s.skipped
    );
    for f in &s.failures {
        println!("  failed {} [{}]: {}", f.task_id, f.kind, f.message);
    }
    println!("report: {}", report_dir.display());
}
