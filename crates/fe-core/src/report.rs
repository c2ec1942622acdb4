//! Batch report: per-task summaries in batch order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, ModelType, Result, TaskMetricSummary};

/// One succeeded task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Task identifier (serialized as the map key, not inside the value).
    #[serde(skip)]
    pub task_id: String,
    /// Model architecture.
    pub model_type: ModelType,
    /// Per-day means.
    pub metrics: TaskMetricSummary,
}

/// `task_id → {model_type, metrics}` for every succeeded task.
///
/// Iteration and serialization follow insertion (batch) order. Serialized as
/// a JSON object whose key order is the batch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    tasks: Vec<TaskReport>,
}

impl BatchReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task; task ids must be unique.
    pub fn insert(
        &mut self,
        task_id: impl Into<String>,
        model_type: ModelType,
        metrics: TaskMetricSummary,
    ) -> Result<()> {
        let task_id = task_id.into();
        if self.get(&task_id).is_some() {
            return Err(Error::Validation(format!("duplicate task_id '{task_id}' in batch report")));
        }
        self.tasks.push(TaskReport { task_id, model_type, metrics });
        Ok(())
    }

    /// Entry for one task.
    pub fn get(&self, task_id: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` if no task succeeded.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in batch order.
    pub fn iter(&self) -> std::slice::Iter<'_, TaskReport> {
        self.tasks.iter()
    }

    /// Task ids in batch order.
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.task_id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a BatchReport {
    type Item = &'a TaskReport;
    type IntoIter = std::slice::Iter<'a, TaskReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tasks.len()))?;
        for t in &self.tasks {
            map.serialize_entry(&t.task_id, t)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BatchReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = BatchReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of task_id to task report")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<BatchReport, A::Error> {
                let mut report = BatchReport::new();
                while let Some((task_id, task)) = access.next_entry::<String, TaskReport>()? {
                    report
                        .insert(task_id, task.model_type, task.metrics)
                        .map_err(serde::de::Error::custom)?;
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(x: f64) -> TaskMetricSummary {
        TaskMetricSummary::new(vec![x], vec![0.5], vec![x * x]).unwrap()
    }

    #[test]
    fn serialization_keeps_batch_order() {
        let mut r = BatchReport::new();
        r.insert("zeta", ModelType::Lstm, summary(2.0)).unwrap();
        r.insert("alpha", ModelType::Fcnn, summary(1.0)).unwrap();

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.find("\"zeta\"").unwrap() < json.find("\"alpha\"").unwrap());
        assert!(json.contains("\"model_type\":\"LSTM\""));

        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.task_ids(), vec!["zeta", "alpha"]);
        assert_eq!(back, r);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut r = BatchReport::new();
        r.insert("a", ModelType::Gnn, summary(1.0)).unwrap();
        assert!(r.insert("a", ModelType::Gnn, summary(1.0)).is_err());
        assert_eq!(r.len(), 1);
    }
}
