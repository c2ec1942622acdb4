//! Cross-task report: every comparison artifact for one batch.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use fe_core::{BatchReport, MetricKind, Result};
use serde::Serialize;

use crate::cumulative::{CumulativeArtifact, cumulative_artifact};
use crate::daily::{DailySeriesArtifact, daily_series_artifacts};
use crate::table::{SummaryTableArtifact, summary_table_artifact};

/// All cross-task artifacts of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct CrossTaskReport {
    /// One artifact per metric kind, in `MetricKind::ALL` order.
    pub cumulative: Vec<CumulativeArtifact>,
    /// Pivoted summary table.
    pub table: SummaryTableArtifact,
    /// Per-task daily series.
    pub daily: Vec<DailySeriesArtifact>,
}

/// Build the cross-task report.
///
/// Returns `Ok(None)` when the batch report is empty.
pub fn cross_task_report(report: &BatchReport, horizon_days: usize) -> Result<Option<CrossTaskReport>> {
    if report.is_empty() {
        tracing::warn!("batch report is empty; no cross-task report produced");
        return Ok(None);
    }

    let cumulative = MetricKind::ALL
        .iter()
        .map(|&kind| cumulative_artifact(report, kind, horizon_days))
        .collect::<Result<Vec<_>>>()?;
    let table = summary_table_artifact(report, horizon_days)?;
    let daily = daily_series_artifacts(report)?;

    tracing::info!(tasks = report.len(), horizon_days, "cross-task report assembled");
    Ok(Some(CrossTaskReport { cumulative, table, daily }))
}

impl CrossTaskReport {
    /// Write every artifact under `dir` (created if needed).
    ///
    /// Layout: `cumulative_<metric>.json`, `summary_table.json`,
    /// `summary_table.csv`, `daily/<task_id>.json`. Returns the written paths.
    /// Task ids that sanitize to the same file name get a numeric suffix.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for a in &self.cumulative {
            let path = dir.join(format!("cumulative_{}.json", a.metric.key()));
            write_json(&path, a)?;
            written.push(path);
        }

        let path = dir.join("summary_table.json");
        write_json(&path, &self.table)?;
        written.push(path);

        let path = dir.join("summary_table.csv");
        std::fs::write(&path, self.table.to_csv())?;
        written.push(path);

        let daily_dir = dir.join("daily");
        std::fs::create_dir_all(&daily_dir)?;
        let stems = unique_file_stems(self.daily.iter().map(|a| a.task_id.as_str()));
        for (a, stem) in self.daily.iter().zip(stems) {
            let path = daily_dir.join(format!("{stem}.json"));
            write_json(&path, a)?;
            written.push(path);
        }

        tracing::debug!(dir = %dir.display(), files = written.len(), "cross-task artifacts written");
        Ok(written)
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    std::fs::write(path, bytes)?;
    Ok(())
}

/// File-name-safe form of a task id.
pub fn file_stem(task_id: &str) -> String {
    task_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

/// [`file_stem`] of every id, suffixed `_2`, `_3`, ... where two ids would
/// share a file name. Compared case-insensitively.
pub fn unique_file_stems<'a>(task_ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    task_ids
        .into_iter()
        .map(|id| {
            let base = file_stem(id);
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.to_ascii_lowercase()) {
                stem = format!("{base}_{n}");
                n += 1;
            }
            if stem != base {
                tracing::warn!(task_id = %id, file = %stem, "task id collides with an earlier file name");
            }
            stem
        })
        .collect()
}
