//! Per-task aggregation of daily metric vectors.
//!
//! The mean is taken per metric kind and per day over every valid sample.
//! NaN in any sample makes that day's mean NaN. When samples disagree on the
//! horizon (possible after per-row truncation), the summary covers the
//! shortest common horizon.

use fe_core::{MetricKind, Result, TaskMetricSummary};
use fe_data::SampleRecord;

use crate::daily::{DailyMetrics, daily_metrics};

/// Streaming column-wise mean of [`DailyMetrics`].
///
/// Samples can be pushed and dropped one at a time; only the running sums
/// are kept.
#[derive(Debug, Clone, Default)]
pub struct MetricAccumulator {
    n: usize,
    // Indexed like `MetricKind::ALL`.
    sums: [Vec<f64>; 3],
    reductions: usize,
}

impl MetricAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples pushed so far.
    pub fn len(&self) -> usize {
        self.n
    }

    /// `true` before the first push.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Current common horizon (0 before the first push).
    pub fn horizon(&self) -> usize {
        self.sums[0].len()
    }

    /// How many times the common horizon shrank.
    pub fn reductions(&self) -> usize {
        self.reductions
    }

    /// Add one sample's metrics.
    pub fn push(&mut self, m: &DailyMetrics) {
        let h = m.horizon();
        if self.n == 0 {
            for (sum, kind) in self.sums.iter_mut().zip(MetricKind::ALL) {
                *sum = m.series(kind).to_vec();
            }
            self.n = 1;
            return;
        }

        if h < self.horizon() {
            tracing::debug!(
                from = self.horizon(),
                to = h,
                "sample horizon shorter than the running summary; reducing common horizon"
            );
            for sum in &mut self.sums {
                sum.truncate(h);
            }
            self.reductions += 1;
        }
        for (sum, kind) in self.sums.iter_mut().zip(MetricKind::ALL) {
            for (acc, x) in sum.iter_mut().zip(m.series(kind)) {
                *acc += *x;
            }
        }
        self.n += 1;
    }

    /// Mean per day; `None` when nothing was pushed.
    pub fn finish(self) -> Result<Option<TaskMetricSummary>> {
        if self.n == 0 {
            return Ok(None);
        }
        if self.reductions > 0 {
            tracing::warn!(
                samples = self.n,
                horizon = self.horizon(),
                "samples had different horizons; summary covers the shortest common horizon"
            );
        }
        let n = self.n as f64;
        let [rmse, r2, mse] = self.sums.map(|s| s.into_iter().map(|x| x / n).collect::<Vec<f64>>());
        TaskMetricSummary::new(rmse, r2, mse).map(Some)
    }
}

/// Everything scoring a task's samples produces.
#[derive(Debug, Clone)]
pub struct SampleEvaluation {
    /// Per-day means; `None` when there were no samples.
    pub summary: Option<TaskMetricSummary>,
    /// Samples scored.
    pub samples: usize,
    /// First sample in input order with its metrics.
    pub first: Option<(SampleRecord, DailyMetrics)>,
}

/// Score and aggregate a task's samples in order.
///
/// Samples are consumed one at a time and dropped once scored, except the
/// first, which is kept for the visualization hand-off. A sample that
/// cannot be scored aborts the evaluation.
pub fn evaluate_samples(samples: impl IntoIterator<Item = SampleRecord>) -> Result<SampleEvaluation> {
    let mut acc = MetricAccumulator::new();
    let mut first = None;
    for sample in samples {
        let metrics = daily_metrics(&sample)?;
        acc.push(&metrics);
        if first.is_none() {
            first = Some((sample, metrics));
        }
    }
    let samples = acc.len();
    Ok(SampleEvaluation { summary: acc.finish()?, samples, first })
}
