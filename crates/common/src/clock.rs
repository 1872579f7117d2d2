//! Video-time utilities.
//!
//! The domain clock of a run is the frame index of the source video, not
//! wall-clock time. This module provides:
//! - Frame index to second-index conversion
//! - The label-hold window expressed in frames
//! - `M:SS` timestamp formatting for overlays

use crate::error::{MotionError, MotionResult};

/// Frame-rate anchored clock for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate. The rate must be finite and
    /// strictly positive.
    pub fn new(fps: f64) -> MotionResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(MotionError::config(format!(
                "frame rate must be a positive number, got {fps}"
            )));
        }
        Ok(Self { fps })
    }

    /// Frames per second of the source video.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Second of video time a frame belongs to: `floor(frame_index / fps)`.
    pub fn second_index(&self, frame_index: u64) -> u64 {
        (frame_index as f64 / self.fps).floor() as u64
    }

    /// Presentation time of a frame in seconds.
    pub fn frame_time_secs(&self, frame_index: u64) -> f64 {
        frame_index as f64 / self.fps
    }

    /// Length of the label-hold window in frames (one video second).
    ///
    /// Fractional rates are truncated (29.97 -> 29); never less than one.
    pub fn hold_frames(&self) -> u32 {
        (self.fps.trunc() as u32).max(1)
    }
}

/// Format seconds as an overlay timestamp: `M:SS` (minutes are not wrapped).
pub fn format_timestamp(secs: f64) -> String {
    let whole = secs.max(0.0) as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Current wall-clock time (RFC 3339, UTC) for run reports.
pub fn wall_clock_now() -> String {
    chrono::Utc::now().to_rfc3339()
}
