//! Label-hold smoothing for display.
//!
//! A frame with detections replaces the displayed labels immediately. A frame
//! without detections keeps showing the last non-empty set for up to one
//! video second (counted in frames), then clears. There is no debounce on
//! entry.
//!
//! The smoother only affects what is displayed; it never feeds back into
//! classification or the activity log.

use motiontrace_pose_model::motion::MotionSet;

/// Hold state for one run.
#[derive(Debug, Clone, Default)]
pub struct LabelHold {
    held: MotionSet,
    countdown: u32,
}

impl LabelHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's raw detection and get the labels to display.
    ///
    /// `frames_per_second` is the hold window; a non-empty detection re-arms
    /// it to exactly that many frames.
    pub fn update(&mut self, detected: MotionSet, frames_per_second: u32) -> MotionSet {
        if !detected.is_empty() {
            self.held = detected;
            self.countdown = frames_per_second;
            detected
        } else if self.countdown > 0 {
            self.countdown -= 1;
            self.held
        } else {
            self.held = MotionSet::empty();
            MotionSet::empty()
        }
    }

    /// Labels currently held for display.
    pub fn held(&self) -> &MotionSet {
        &self.held
    }

    /// Empty frames left before the held labels clear.
    pub fn remaining(&self) -> u32 {
        self.countdown
    }

    pub fn reset(&mut self) {
        self.held = MotionSet::empty();
        self.countdown = 0;
    }
}
