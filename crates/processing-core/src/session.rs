//! Frame driver: runs the analysis pipeline over a pose source.
//!
//! Per observation, in order:
//! 1. Check for cancellation.
//! 2. Decide whether the frame is a detection (skeleton present, confident
//!    enough, and all required joints extracted).
//! 3. Classify detections against the previous detection.
//! 4. Smooth the raw detection into display labels.
//! 5. Hand a [`FrameReport`] to the overlay sink.
//! 6. Merge raw detections into the per-second log.
//!
//! Non-detection frames still reach the sink (with empty raw labels) but do
//! not contribute a log row.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use motiontrace_common::clock::FrameClock;
use motiontrace_common::config::{AppConfig, ThresholdConfig};
use motiontrace_common::error::{MotionError, MotionResult};
use motiontrace_pose_model::activity::ActivityLog;
use motiontrace_pose_model::motion::{Motion, MotionSet};
use motiontrace_pose_model::skeleton::Skeleton;
use motiontrace_pose_model::stream::{PoseFrame, PoseStream};
use serde::{Deserialize, Serialize};

use crate::aggregate::ActivityAggregator;
use crate::classifier::FrameClassifier;
use crate::hold::LabelHold;
use crate::metrics;

/// Yields pose observations in frame order.
pub trait PoseSource {
    /// Next observation, or `None` at end of input.
    fn next_observation(&mut self) -> MotionResult<Option<PoseFrame>>;
}

/// Consumes per-frame overlay reports.
pub trait OverlaySink {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()>;

    /// Called once after the last frame of a completed run.
    fn finish(&mut self) -> MotionResult<()> {
        Ok(())
    }
}

/// In-memory source over decoded pose frames.
#[derive(Debug)]
pub struct StreamSource {
    frames: std::vec::IntoIter<PoseFrame>,
}

impl StreamSource {
    pub fn new(frames: Vec<PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl From<PoseStream> for StreamSource {
    fn from(stream: PoseStream) -> Self {
        Self::new(stream.frames)
    }
}

impl PoseSource for StreamSource {
    fn next_observation(&mut self) -> MotionResult<Option<PoseFrame>> {
        Ok(self.frames.next())
    }
}

/// Sink that discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OverlaySink for NullSink {
    fn write_frame(&mut self, _frame: &FrameReport<'_>) -> MotionResult<()> {
        Ok(())
    }
}

/// Fan out to two sinks, first then second.
impl<A: OverlaySink, B: OverlaySink> OverlaySink for (A, B) {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()> {
        self.0.write_frame(frame)?;
        self.1.write_frame(frame)
    }

    fn finish(&mut self) -> MotionResult<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

/// An absent sink discards frames.
impl<S: OverlaySink> OverlaySink for Option<S> {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()> {
        match self {
            Some(sink) => sink.write_frame(frame),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> MotionResult<()> {
        match self {
            Some(sink) => sink.finish(),
            None => Ok(()),
        }
    }
}

/// How a frame was treated by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Detected,
    NoPerson,
    LowConfidence,
    Incomplete,
}

impl FrameStatus {
    pub fn is_detection(self) -> bool {
        matches!(self, FrameStatus::Detected)
    }
}

/// Everything an overlay needs to draw one frame.
#[derive(Debug, Clone)]
pub struct FrameReport<'a> {
    pub frame_index: u64,
    pub time_secs: f64,
    pub second: u64,
    pub skeleton: Option<&'a Skeleton>,
    pub status: FrameStatus,
    /// Raw classifier output; empty for non-detection frames.
    pub detection: MotionSet,
    /// Smoothed labels to show.
    pub display: MotionSet,
}

/// Per-run analysis settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub thresholds: ThresholdConfig,
    /// Skeletons scoring below this are treated as no detection.
    pub min_pose_confidence: f64,
    /// Forget the previous detection whenever a non-detection frame occurs.
    pub reset_on_gap: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            min_pose_confidence: config.analysis.min_pose_confidence,
            reset_on_gap: config.analysis.reset_on_gap,
        }
    }
}

/// Frame counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub frames: u64,
    pub detected: u64,
    pub no_person: u64,
    pub low_confidence: u64,
    pub incomplete: u64,
    /// Detection frames on which each category fired (raw, not smoothed).
    pub category_frames: BTreeMap<Motion, u64>,
}

impl RunStats {
    fn count(&mut self, status: FrameStatus, detection: &MotionSet) {
        self.frames += 1;
        match status {
            FrameStatus::Detected => self.detected += 1,
            FrameStatus::NoPerson => self.no_person += 1,
            FrameStatus::LowConfidence => self.low_confidence += 1,
            FrameStatus::Incomplete => self.incomplete += 1,
        }
        for motion in detection.active() {
            *self.category_frames.entry(motion).or_insert(0) += 1;
        }
    }

    /// Fraction of frames that were detections, 0.0 for an empty run.
    pub fn coverage(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.detected as f64 / self.frames as f64
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub log: ActivityLog,
    pub stats: RunStats,
}

/// One analysis run. Owns all rolling state; nothing is shared between runs.
#[derive(Debug)]
pub struct AnalysisSession {
    clock: FrameClock,
    options: SessionOptions,
    classifier: FrameClassifier,
    hold: LabelHold,
    aggregator: ActivityAggregator,
    stats: RunStats,
    last_frame: Option<u64>,
    cancel: Option<Arc<AtomicBool>>,
}

impl AnalysisSession {
    pub fn new(clock: FrameClock, options: SessionOptions) -> Self {
        Self {
            clock,
            classifier: FrameClassifier::new(options.thresholds),
            options,
            hold: LabelHold::new(),
            aggregator: ActivityAggregator::new(),
            stats: RunStats::default(),
            last_frame: None,
            cancel: None,
        }
    }

    /// Stop the run between frames once `flag` becomes true.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Process a single observation and return its status.
    ///
    /// Frame indices must be strictly increasing across calls.
    pub fn process<K>(&mut self, frame: &PoseFrame, sink: &mut K) -> MotionResult<FrameStatus>
    where
        K: OverlaySink + ?Sized,
    {
        if let Some(last) = self.last_frame {
            if frame.frame_index <= last {
                return Err(MotionError::pose_source(format!(
                    "frame index {} does not follow {}",
                    frame.frame_index, last
                )));
            }
        }
        self.last_frame = Some(frame.frame_index);

        let (status, detection) = self.classify_frame(frame);
        let display = self.hold.update(detection, self.clock.hold_frames());
        let second = self.clock.second_index(frame.frame_index);

        sink.write_frame(&FrameReport {
            frame_index: frame.frame_index,
            time_secs: self.clock.frame_time_secs(frame.frame_index),
            second,
            skeleton: frame.skeleton.as_ref(),
            status,
            detection,
            display,
        })?;

        if status.is_detection() {
            self.aggregator.record(second, &detection);
        }
        self.stats.count(status, &detection);

        tracing::trace!(
            frame = frame.frame_index,
            second,
            status = ?status,
            labels = ?detection.labels(),
            "Processed frame"
        );

        Ok(status)
    }

    fn classify_frame(&mut self, frame: &PoseFrame) -> (FrameStatus, MotionSet) {
        let status = match &frame.skeleton {
            None => FrameStatus::NoPerson,
            Some(skeleton) if skeleton.score < self.options.min_pose_confidence => {
                tracing::debug!(
                    frame = frame.frame_index,
                    score = skeleton.score,
                    "Skeleton below confidence cutoff"
                );
                FrameStatus::LowConfidence
            }
            Some(skeleton) => match metrics::extract(skeleton) {
                Ok(frame_metrics) => {
                    return (FrameStatus::Detected, self.classifier.step(frame_metrics))
                }
                Err(err) => {
                    tracing::debug!(frame = frame.frame_index, error = %err, "Skipping frame");
                    FrameStatus::Incomplete
                }
            },
        };

        if self.options.reset_on_gap {
            self.classifier.reset();
        }
        (status, MotionSet::empty())
    }

    /// Drain `source` through the pipeline, then finish the sink and return
    /// the activity log.
    pub fn run<S, K>(mut self, source: &mut S, sink: &mut K) -> MotionResult<AnalysisOutcome>
    where
        S: PoseSource + ?Sized,
        K: OverlaySink + ?Sized,
    {
        tracing::info!(
            fps = self.clock.fps(),
            hold_frames = self.clock.hold_frames(),
            min_pose_confidence = self.options.min_pose_confidence,
            "Starting analysis"
        );

        loop {
            if self.is_cancelled() {
                tracing::warn!(frames = self.stats.frames, "Analysis cancelled");
                return Err(MotionError::Cancelled {
                    frames_processed: self.stats.frames,
                });
            }
            let Some(frame) = source.next_observation()? else {
                break;
            };
            self.process(&frame, sink)?;
        }

        sink.finish()?;
        let outcome = self.finish();

        tracing::info!(
            frames = outcome.stats.frames,
            detected = outcome.stats.detected,
            seconds = outcome.log.len(),
            "Analysis complete"
        );

        Ok(outcome)
    }

    /// Close the run without draining a source.
    pub fn finish(self) -> AnalysisOutcome {
        AnalysisOutcome {
            log: self.aggregator.finish(),
            stats: self.stats,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiontrace_pose_model::skeleton::{Joint, Landmark};

    fn skeleton(hip_z: f64, score: f64) -> Skeleton {
        Skeleton::new(score)
            .with_joint(Joint::LeftHip, Landmark::new(0.45, 0.6, hip_z))
            .with_joint(Joint::RightHip, Landmark::new(0.55, 0.6, hip_z))
            .with_joint(Joint::LeftWrist, Landmark::new(0.45, 0.5, 0.0))
            .with_joint(Joint::RightWrist, Landmark::new(0.55, 0.5, 0.0))
    }

    fn session(fps: f64) -> AnalysisSession {
        AnalysisSession::new(FrameClock::new(fps).unwrap(), SessionOptions::default())
    }

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u64, FrameStatus, MotionSet, MotionSet)>,
        finished: bool,
    }

    impl OverlaySink for Recorder {
        fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()> {
            self.frames
                .push((frame.frame_index, frame.status, frame.detection, frame.display));
            Ok(())
        }

        fn finish(&mut self) -> MotionResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn test_statuses() {
        let mut session = session(10.0);
        let mut sink = NullSink;

        let mut partial = skeleton(0.0, 0.9);
        partial.joints.remove(&Joint::LeftWrist);

        assert_eq!(
            session.process(&PoseFrame::missing(0), &mut sink).unwrap(),
            FrameStatus::NoPerson
        );
        assert_eq!(
            session
                .process(&PoseFrame::detected(1, skeleton(0.0, 0.2)), &mut sink)
                .unwrap(),
            FrameStatus::LowConfidence
        );
        assert_eq!(
            session
                .process(&PoseFrame::detected(2, partial), &mut sink)
                .unwrap(),
            FrameStatus::Incomplete
        );
        assert_eq!(
            session
                .process(&PoseFrame::detected(3, skeleton(0.0, 0.9)), &mut sink)
                .unwrap(),
            FrameStatus::Detected
        );

        let stats = session.stats().clone();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.no_person, 1);
        assert_eq!(stats.low_confidence, 1);
        assert_eq!(stats.incomplete, 1);
        assert_eq!(stats.detected, 1);
        assert!((stats.coverage() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_non_detection_keeps_previous_frame() {
        let mut session = session(10.0);
        let mut sink = Recorder::default();

        session
            .process(&PoseFrame::detected(0, skeleton(0.0, 0.9)), &mut sink)
            .unwrap();
        session.process(&PoseFrame::missing(1), &mut sink).unwrap();
        session
            .process(&PoseFrame::detected(2, skeleton(-0.1, 0.9)), &mut sink)
            .unwrap();

        // Frame 2 is compared with frame 0 across the gap
        assert!(sink.frames[2].2.contains(Motion::Advancing));
    }

    #[test]
    fn test_reset_on_gap_forgets_previous_frame() {
        let options = SessionOptions {
            reset_on_gap: true,
            ..SessionOptions::default()
        };
        let mut session = AnalysisSession::new(FrameClock::new(10.0).unwrap(), options);
        let mut sink = Recorder::default();

        session
            .process(&PoseFrame::detected(0, skeleton(0.0, 0.9)), &mut sink)
            .unwrap();
        session.process(&PoseFrame::missing(1), &mut sink).unwrap();
        session
            .process(&PoseFrame::detected(2, skeleton(-0.1, 0.9)), &mut sink)
            .unwrap();

        assert!(!sink.frames[2].2.contains(Motion::Advancing));
    }

    #[test]
    fn test_display_is_held_over_gap_but_log_is_raw() {
        let mut session = session(10.0);
        let mut sink = Recorder::default();

        session
            .process(&PoseFrame::detected(0, skeleton(0.0, 0.9)), &mut sink)
            .unwrap();
        session
            .process(&PoseFrame::detected(1, skeleton(-0.1, 0.9)), &mut sink)
            .unwrap();
        session.process(&PoseFrame::missing(12), &mut sink).unwrap();

        let (_, status, detection, display) = sink.frames[2];
        assert_eq!(status, FrameStatus::NoPerson);
        assert!(detection.is_empty());
        assert!(display.contains(Motion::Advancing));

        let outcome = session.finish();
        assert!(outcome.log.get(1).is_none());
        assert!(outcome.log.get(0).unwrap().flags.contains(Motion::Advancing));
    }

    #[test]
    fn test_out_of_order_frame_is_rejected() {
        let mut session = session(10.0);
        session.process(&PoseFrame::missing(5), &mut NullSink).unwrap();
        let err = session
            .process(&PoseFrame::missing(5), &mut NullSink)
            .unwrap_err();
        assert!(matches!(err, MotionError::PoseSource { .. }));
    }

    #[test]
    fn test_run_finishes_sink() {
        let frames = vec![
            PoseFrame::detected(0, skeleton(0.0, 0.9)),
            PoseFrame::detected(1, skeleton(0.0, 0.9)),
        ];
        let mut sink = Recorder::default();
        let outcome = session(10.0)
            .run(&mut StreamSource::new(frames), &mut sink)
            .unwrap();
        assert!(sink.finished);
        assert_eq!(outcome.stats.frames, 2);
        assert_eq!(outcome.log.len(), 1);
        assert_eq!(outcome.stats.category_frames.get(&Motion::Gliding), Some(&2));
    }

    #[test]
    fn test_cancelled_run() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut sink = Recorder::default();
        let err = session(10.0)
            .with_cancel_flag(flag)
            .run(
                &mut StreamSource::new(vec![PoseFrame::missing(0)]),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            MotionError::Cancelled {
                frames_processed: 0
            }
        ));
        assert!(!sink.finished);
    }
}
