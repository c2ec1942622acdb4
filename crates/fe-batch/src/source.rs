//! Loader seam in front of `fe_data`.

use fe_core::{GridShape, Result};
use fe_data::{LoadOutcome, SourceSchema};

use crate::task::EvaluationTask;

/// Loads the samples of one task.
pub trait TaskLoader {
    /// Load and validate the task's model-result source.
    fn load(&self, task: &EvaluationTask, schema: &SourceSchema, shape: &GridShape) -> Result<LoadOutcome>;
}

impl<T: TaskLoader + ?Sized> TaskLoader for &T {
    fn load(&self, task: &EvaluationTask, schema: &SourceSchema, shape: &GridShape) -> Result<LoadOutcome> {
        (**self).load(task, schema, shape)
    }
}

/// Reads model-result files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl TaskLoader for FsLoader {
    fn load(&self, task: &EvaluationTask, schema: &SourceSchema, shape: &GridShape) -> Result<LoadOutcome> {
        fe_data::load_samples(&task.data_source, schema, shape)
    }
}
