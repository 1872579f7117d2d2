//! Frame-to-frame motion classification.
//!
//! Each frame is compared against the previous successfully extracted frame.
//! Delta-based categories (Advancing, Retreating, Enclosing, Spreading) need a
//! previous frame; velocity-based categories see zero velocity without one.
//!
//! # Rules
//!
//! All comparisons are strict, so a value equal to its cutoff never fires.
//!
//! | Category    | Fires when                                   |
//! |-------------|----------------------------------------------|
//! | Advancing   | `hip_delta < -hip`                           |
//! | Retreating  | `hip_delta > hip`                            |
//! | Enclosing   | `wrist_delta < -wrist`                       |
//! | Spreading   | `wrist_delta > wrist`                        |
//! | Directing   | `wrist_separation > directing`               |
//! | Indirecting | `avg_velocity > indirecting`                 |
//! | Gliding     | `avg_velocity < gliding`                     |
//! | Punching    | `avg_velocity > punching`                    |
//! | Dabbing     | `dabbing < avg_velocity < punching`          |
//! | Flicking    | `flicking < avg_velocity < dabbing`          |
//! | Slashing    | `avg_velocity > slashing`                    |
//! | Wringing    | `avg_velocity > wringing`                    |
//! | Pressing    | `avg_velocity > pressing`                    |
//!
//! Categories are independent and may overlap.

use motiontrace_common::config::ThresholdConfig;
use motiontrace_pose_model::motion::{Motion, MotionSet};

use crate::metrics::FrameMetrics;

/// Intermediate quantities a classification is based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSignals {
    /// Hip depth change since the previous frame.
    pub hip_delta: Option<f64>,
    /// Wrist separation change since the previous frame.
    pub wrist_delta: Option<f64>,
    /// Mean of the two wrist displacements (x, y, z).
    pub avg_velocity: f64,
}

impl MotionSignals {
    pub fn between(prev: Option<&FrameMetrics>, curr: &FrameMetrics) -> Self {
        match prev {
            Some(prev) => {
                let velocity_l = (curr.left_wrist_pos - prev.left_wrist_pos).norm();
                let velocity_r = (curr.right_wrist_pos - prev.right_wrist_pos).norm();
                Self {
                    hip_delta: Some(curr.hip_depth - prev.hip_depth),
                    wrist_delta: Some(curr.wrist_separation - prev.wrist_separation),
                    avg_velocity: (velocity_l + velocity_r) / 2.0,
                }
            }
            None => Self {
                hip_delta: None,
                wrist_delta: None,
                avg_velocity: 0.0,
            },
        }
    }
}

/// Classify one frame. Pure; never fails.
pub fn classify(
    prev: Option<&FrameMetrics>,
    curr: &FrameMetrics,
    thresholds: &ThresholdConfig,
) -> MotionSet {
    let signals = MotionSignals::between(prev, curr);
    let t = thresholds;
    let v = signals.avg_velocity;
    let mut set = MotionSet::empty();

    if let Some(hip_delta) = signals.hip_delta {
        set.set(Motion::Advancing, hip_delta < -t.hip);
        set.set(Motion::Retreating, hip_delta > t.hip);
    }

    if let Some(wrist_delta) = signals.wrist_delta {
        set.set(Motion::Enclosing, wrist_delta < -t.wrist);
        set.set(Motion::Spreading, wrist_delta > t.wrist);
    }

    set.set(Motion::Directing, curr.wrist_separation > t.directing);
    set.set(Motion::Indirecting, v > t.indirecting);

    set.set(Motion::Punching, v > t.punching);
    // Nested intensity bands: each is capped by the next stronger cutoff.
    set.set(Motion::Dabbing, v > t.dabbing && v < t.punching);
    set.set(Motion::Flicking, v > t.flicking && v < t.dabbing);
    set.set(Motion::Slashing, v > t.slashing);
    set.set(Motion::Wringing, v > t.wringing);
    set.set(Motion::Pressing, v > t.pressing);
    set.set(Motion::Gliding, v < t.gliding);

    set
}

/// Stateful classifier for one run.
///
/// Owns the metrics of the last successfully extracted frame. Callers must
/// only feed frames whose extraction succeeded; skipped frames leave the
/// rolling state untouched.
#[derive(Debug, Clone)]
pub struct FrameClassifier {
    thresholds: ThresholdConfig,
    prev: Option<FrameMetrics>,
}

impl FrameClassifier {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            thresholds,
            prev: None,
        }
    }

    /// Classify `curr` against the stored previous frame, then make `curr`
    /// the new previous frame.
    pub fn step(&mut self, curr: FrameMetrics) -> MotionSet {
        let detection = classify(self.prev.as_ref(), &curr, &self.thresholds);
        self.prev = Some(curr);
        detection
    }

    /// Metrics the next frame will be compared against.
    pub fn previous(&self) -> Option<&FrameMetrics> {
        self.prev.as_ref()
    }

    /// Forget the previous frame; the next frame is classified as a first frame.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }
}
