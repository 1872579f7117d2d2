//! Run outputs: activity log files and the run report.

use std::path::{Path, PathBuf};

use motiontrace_common::clock::wall_clock_now;
use motiontrace_common::config::ThresholdConfig;
use motiontrace_common::error::MotionResult;
use motiontrace_pose_model::activity::ActivityLog;
use motiontrace_processing_core::session::RunStats;
use serde::{Deserialize, Serialize};

pub const ACTIVITY_CSV_FILE: &str = "activity_log.csv";
pub const ACTIVITY_JSON_FILE: &str = "activity_log.json";
pub const RUN_REPORT_FILE: &str = "run_report.json";

/// Summary of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// When the report was generated (RFC 3339, UTC).
    pub generated_at: String,
    /// Pose stream the run read from.
    pub source: String,
    pub fps: f64,
    pub thresholds: ThresholdConfig,
    pub stats: RunStats,
    /// Seconds with at least one detected frame.
    pub seconds_logged: usize,
}

impl RunReport {
    pub fn new(
        source: impl Into<String>,
        fps: f64,
        thresholds: ThresholdConfig,
        stats: RunStats,
        log: &ActivityLog,
    ) -> Self {
        Self {
            generated_at: wall_clock_now(),
            source: source.into(),
            fps,
            thresholds,
            stats,
            seconds_logged: log.len(),
        }
    }

    pub fn save(&self, path: &Path) -> MotionResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(path = %path.display(), "Wrote run report");
        Ok(())
    }
}

/// Write the activity log as CSV and JSON into `dir`.
pub fn write_activity_log(log: &ActivityLog, dir: &Path) -> MotionResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;

    let csv_path = dir.join(ACTIVITY_CSV_FILE);
    std::fs::write(&csv_path, log.to_csv())?;

    let json_path = dir.join(ACTIVITY_JSON_FILE);
    std::fs::write(&json_path, serde_json::to_string_pretty(log)?)?;

    tracing::info!(
        csv = %csv_path.display(),
        json = %json_path.display(),
        seconds = log.len(),
        "Wrote activity log"
    );
    Ok((csv_path, json_path))
}
