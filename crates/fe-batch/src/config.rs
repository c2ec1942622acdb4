//! Batch configuration (YAML or JSON).
//!
//! ```yaml
//! report_dir: reports
//! grid: { grid_points: 127440, horizon_days: 7 }
//! tasks:
//!   - task_id: lstm_baseline
//!     model_type: LSTM
//!     model_file: results/lstm.json
//!     output_directory: out/lstm
//!     visualization_pos: 0
//! ```
//!
//! Task entries are kept as raw values and decoded one at a time, so a broken
//! or mistyped entry fails only its own task.

use std::path::{Path, PathBuf};

use fe_core::{Error, GridShape, ModelType, Result};
use fe_data::SourceSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::task::{EvaluationTask, PlannedTask};

/// Whole batch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Raw task entries in batch order, decoded by [`BatchConfig::plan`].
    #[serde(default)]
    pub tasks: Vec<Value>,
    /// Where cross-task artifacts go.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
    /// Evaluation grid (defaults to the full domain).
    #[serde(default)]
    pub grid: GridShape,
    /// Source column names.
    #[serde(default)]
    pub schema: SourceSchema,
}

/// One task entry as written in the file. Every field is optional here;
/// [`TaskEntry::plan`] enforces what is required.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub model_file: Option<PathBuf>,
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
    #[serde(default)]
    pub visualization_pos: Option<i64>,
}

fn default_enabled() -> bool {
    true
}

/// A parsed configuration file plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Parsed configuration.
    pub config: BatchConfig,
    /// Directory relative paths resolve against.
    pub base_dir: PathBuf,
    /// SHA-256 of the file bytes.
    pub sha256: String,
}

/// Read a batch configuration; `.json` is JSON, anything else YAML.
pub fn read_batch_config(path: &Path) -> Result<LoadedConfig> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Config(format!("cannot read config {}: {e}", path.display())))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let config: BatchConfig = if ext == "json" {
        serde_json::from_slice(&bytes)?
    } else {
        // Default: YAML (serde_yaml_ng).
        serde_yaml_ng::from_slice(&bytes)?
    };
    config.grid.validate()?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    tracing::debug!(path = %path.display(), tasks = config.tasks.len(), "batch config read");
    Ok(LoadedConfig { config, base_dir, sha256: sha256_hex(&bytes) })
}

/// Lower-case hex SHA-256.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut s = String::with_capacity(64);
    for b in out {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

fn resolve(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() || base_dir.as_os_str().is_empty() { p.to_path_buf() } else { base_dir.join(p) }
}

impl BatchConfig {
    /// Validate every entry, in order.
    pub fn plan(&self, base_dir: &Path) -> Vec<PlannedTask> {
        let mut planned: Vec<PlannedTask> = Vec::with_capacity(self.tasks.len());
        for (index, raw) in self.tasks.iter().enumerate() {
            let mut p = match TaskEntry::from_value(index, raw) {
                Ok(entry) => entry.plan(index, &self.grid, base_dir),
                Err(error) => PlannedTask::Invalid {
                    task_id: raw_label(raw, index),
                    // An unreadable `enabled` counts as enabled so the entry is reported.
                    enabled: raw.get("enabled").and_then(Value::as_bool).unwrap_or(true),
                    error,
                },
            };
            if let PlannedTask::Ready(task) = &p
                && planned.iter().any(|q| q.task_id() == task.task_id)
            {
                p = PlannedTask::Invalid {
                    task_id: task.task_id.clone(),
                    enabled: task.enabled,
                    error: Error::Config(format!("duplicate task_id '{}'", task.task_id)),
                };
            }
            planned.push(p);
        }
        planned
    }

    /// Directory for cross-task artifacts, resolved against `base_dir`.
    pub fn report_dir(&self, base_dir: &Path) -> Option<PathBuf> {
        self.report_dir.as_deref().map(|p| resolve(base_dir, p))
    }
}

/// `task_id` of a raw entry when it is a non-empty string, `task[<index>]` otherwise.
fn raw_label(raw: &Value, index: usize) -> String {
    match raw.get("task_id").and_then(Value::as_str).map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("task[{index}]"),
    }
}

impl TaskEntry {
    /// Decode one raw entry; a wrong type or a non-mapping entry is a config error.
    pub fn from_value(index: usize, raw: &Value) -> Result<Self> {
        TaskEntry::deserialize(raw).map_err(|e| Error::Config(format!("{}: {e}", raw_label(raw, index))))
    }

    /// Identifier used in logs: `task_id`, or `task[<index>]` when absent.
    pub fn label(&self, index: usize) -> String {
        match self.task_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("task[{index}]"),
        }
    }

    /// Validate into an [`EvaluationTask`].
    pub fn to_task(&self, index: usize, grid: &GridShape, base_dir: &Path) -> Result<EvaluationTask> {
        let missing = |field: &str| Error::Config(format!("{}: missing required field '{field}'", self.label(index)));

        let task_id = self
            .task_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("task_id"))?
            .to_string();
        let model_type: ModelType = self.model_type.as_deref().ok_or_else(|| missing("model_type"))?.parse()?;
        let data_source = self.model_file.as_deref().ok_or_else(|| missing("model_file"))?;
        let output_target = self.output_directory.as_deref().ok_or_else(|| missing("output_directory"))?;

        let pos = self.visualization_pos.unwrap_or(0);
        let highlight_day = usize::try_from(pos)
            .ok()
            .filter(|d| grid.check_day(*d).is_ok())
            .ok_or_else(|| {
                Error::Config(format!(
                    "{task_id}: visualization_pos {pos} out of range (0 <= pos < {})",
                    grid.horizon_days
                ))
            })?;

        Ok(EvaluationTask {
            task_id,
            model_type,
            data_source: resolve(base_dir, data_source),
            output_target: resolve(base_dir, output_target),
            enabled: self.enabled,
            highlight_day,
        })
    }

    /// Validate, turning failures into [`PlannedTask::Invalid`].
    pub fn plan(&self, index: usize, grid: &GridShape, base_dir: &Path) -> PlannedTask {
        match self.to_task(index, grid, base_dir) {
            Ok(task) => PlannedTask::Ready(task),
            Err(error) => PlannedTask::Invalid { task_id: self.label(index), enabled: self.enabled, error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
report_dir: reports
grid:
  grid_points: 4
tasks:
  - task_id: a
    model_type: fcnn
    model_file: data/a.json
    output_directory: out/a
  - task_id: b
    enabled: false
    model_type: LSTM
    model_file: /abs/b.json
    output_directory: out/b
    visualization_pos: 6
  - model_type: GNN
    model_file: c.json
  - task_id: d
    model_type: GNN
    model_file: d.json
    output_directory: out/d
    visualization_pos: 7
"#;

    fn config() -> BatchConfig {
        serde_yaml_ng::from_str(YAML).unwrap()
    }

    #[test]
    fn grid_overrides_keep_defaults() {
        let c = config();
        assert_eq!(c.grid.grid_points, 4);
        assert_eq!(c.grid.horizon_days, fe_core::HORIZON_DAYS);
        assert_eq!(c.schema, SourceSchema::default());
    }

    #[test]
    fn entries_validate_individually() {
        let plan = config().plan(Path::new("/cfg"));
        assert_eq!(plan.len(), 4);

        let PlannedTask::Ready(a) = &plan[0] else { panic!("task a should be valid") };
        assert_eq!(a.model_type, ModelType::Fcnn);
        assert_eq!(a.data_source, PathBuf::from("/cfg/data/a.json"));
        assert_eq!(a.highlight_day, 0);
        assert!(a.enabled);

        let PlannedTask::Ready(b) = &plan[1] else { panic!("task b should be valid") };
        assert!(!b.enabled);
        assert_eq!(b.data_source, PathBuf::from("/abs/b.json"));
        assert_eq!(b.highlight_day, 6);

        match &plan[2] {
            PlannedTask::Invalid { task_id, error, .. } => {
                assert_eq!(task_id, "task[2]");
                assert_eq!(error.kind(), "config");
            }
            other => panic!("expected invalid entry, got {other:?}"),
        }
        match &plan[3] {
            PlannedTask::Invalid { task_id, error, .. } => {
                assert_eq!(task_id, "d");
                assert!(error.to_string().contains("visualization_pos 7"), "{error}");
            }
            other => panic!("expected invalid entry, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_task_ids_fail_the_later_entry() {
        let mut c = config();
        c.tasks.truncate(1);
        c.tasks.push(c.tasks[0].clone());
        let plan = c.plan(Path::new(""));
        assert!(matches!(plan[0], PlannedTask::Ready(_)));
        assert!(matches!(plan[1], PlannedTask::Invalid { .. }));
    }

    #[test]
    fn bad_model_type_is_config_error() {
        let entry = TaskEntry {
            task_id: Some("x".into()),
            enabled: true,
            model_type: Some("transformer".into()),
            model_file: Some("x.json".into()),
            output_directory: Some("out".into()),
            visualization_pos: None,
        };
        let err = entry.to_task(0, &GridShape::default(), Path::new("")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn mistyped_entry_fails_alone() {
        let yaml = r#"
grid:
  grid_points: 2
tasks:
  - task_id: good
    model_type: GNN
    model_file: good.json
    output_directory: out/good
  - task_id: typo
    model_type: LSTM
    model_file: typo.json
    output_directory: out/typo
    visualization_pos: two
  - task_id: 42
    enabled: "yes"
  - just a string
"#;
        let c: BatchConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let plan = c.plan(Path::new(""));
        assert_eq!(plan.len(), 4);
        assert!(matches!(&plan[0], PlannedTask::Ready(t) if t.task_id == "good"));
        for (i, id) in [(1, "typo"), (2, "task[2]"), (3, "task[3]")] {
            match &plan[i] {
                PlannedTask::Invalid { task_id, enabled, error } => {
                    assert_eq!(task_id, id);
                    assert!(*enabled);
                    assert_eq!(error.kind(), "config");
                }
                other => panic!("entry {i} should be invalid, got {other:?}"),
            }
        }
    }

    #[test]
    fn mistyped_disabled_entry_stays_disabled() {
        let c: BatchConfig = serde_json::from_str(
            r#"{ "tasks": [{ "task_id": "off", "enabled": false, "visualization_pos": "x" }] }"#,
        )
        .unwrap();
        let plan = c.plan(Path::new(""));
        assert!(matches!(&plan[0], PlannedTask::Invalid { enabled: false, .. }));
    }

    #[test]
    fn sha256_is_hex() {
        let h = sha256_hex(b"abc");
        assert_eq!(h, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    }
}
