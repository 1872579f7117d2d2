//! Label spans: runs of consecutive frames showing the same label text.
//!
//! Spans feed the subtitle writers in the render engine. They are built from
//! either the smoothed display labels of an analysis run or a reference
//! timeline.

use motiontrace_common::clock::FrameClock;
use motiontrace_pose_model::motion::MotionSet;
use serde::{Deserialize, Serialize};

/// Separator between labels of one analyzed frame.
pub const LABEL_SEPARATOR: &str = ", ";

/// Display text for a label set, or `None` when nothing is active.
pub fn label_text(labels: &MotionSet) -> Option<String> {
    if labels.is_empty() {
        None
    } else {
        Some(labels.labels().join(LABEL_SEPARATOR))
    }
}

/// A half-open frame range `[start_frame, end_frame)` showing `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpan {
    pub start_frame: u64,
    pub end_frame: u64,
    pub text: String,
}

impl LabelSpan {
    pub fn start_secs(&self, clock: &FrameClock) -> f64 {
        clock.frame_time_secs(self.start_frame)
    }

    pub fn end_secs(&self, clock: &FrameClock) -> f64 {
        clock.frame_time_secs(self.end_frame)
    }

    pub fn frame_count(&self) -> u64 {
        self.end_frame - self.start_frame
    }
}

/// Merges per-frame texts into spans.
///
/// Frames must be pushed in increasing order. A frame without text, or a
/// skipped frame index, ends the current span.
#[derive(Debug, Clone, Default)]
pub struct SpanBuilder {
    spans: Vec<LabelSpan>,
}

impl SpanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame_index: u64, text: Option<&str>) {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            return;
        };

        match self.spans.last_mut() {
            Some(last) if last.end_frame == frame_index && last.text == text => {
                last.end_frame = frame_index + 1;
            }
            _ => self.spans.push(LabelSpan {
                start_frame: frame_index,
                end_frame: frame_index + 1,
                text: text.to_string(),
            }),
        }
    }

    pub fn push_labels(&mut self, frame_index: u64, labels: &MotionSet) {
        self.push(frame_index, label_text(labels).as_deref());
    }

    pub fn spans(&self) -> &[LabelSpan] {
        &self.spans
    }

    pub fn finish(self) -> Vec<LabelSpan> {
        self.spans
    }
}
