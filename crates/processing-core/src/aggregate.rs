//! Per-second aggregation of raw detections.

use std::collections::BTreeMap;

use motiontrace_pose_model::activity::{ActivityLog, ActivityRow};
use motiontrace_pose_model::motion::MotionSet;

/// OR-folds frame detections into one row per second.
///
/// The caller computes second indices; the aggregator only merges.
#[derive(Debug, Clone, Default)]
pub struct ActivityAggregator {
    rows: BTreeMap<u64, MotionSet>,
}

impl ActivityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a detection into its second. A second seen for the first time
    /// starts all-false.
    pub fn record(&mut self, second: u64, detection: &MotionSet) {
        *self.rows.entry(second).or_default() |= detection;
    }

    pub fn row(&self, second: u64) -> Option<&MotionSet> {
        self.rows.get(&second)
    }

    /// Number of seconds recorded so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn finish(self) -> ActivityLog {
        ActivityLog::new(
            self.rows
                .into_iter()
                .map(|(second, flags)| ActivityRow { second, flags })
                .collect(),
        )
    }
}
