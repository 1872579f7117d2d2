use std::path::PathBuf;

use motiontrace_common::clock::FrameClock;
use motiontrace_pose_model::motion::{Motion, MotionSet};
use motiontrace_pose_model::skeleton::{Joint, Landmark, Skeleton};
use motiontrace_pose_model::stream::{load_pose_stream, PoseFrame, PoseStream};
use motiontrace_processing_core::session::{
    AnalysisSession, FrameReport, OverlaySink, SessionOptions, StreamSource,
};
use motiontrace_processing_core::spans::SpanBuilder;

fn load_fixture_stream() -> PoseStream {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join("poses.jsonl");

    load_pose_stream(&path).expect("fixture pose stream should parse")
}

fn body(hip_z: f64, left_wrist_x: f64, right_wrist_x: f64) -> Skeleton {
    Skeleton::new(0.9)
        .with_joint(Joint::LeftHip, Landmark::new(0.45, 0.6, hip_z))
        .with_joint(Joint::RightHip, Landmark::new(0.55, 0.6, hip_z))
        .with_joint(Joint::LeftWrist, Landmark::new(left_wrist_x, 0.5, 0.0))
        .with_joint(Joint::RightWrist, Landmark::new(right_wrist_x, 0.5, 0.0))
}

fn labels(set: &MotionSet) -> Vec<&'static str> {
    set.labels()
}

/// Collects display labels into spans, like the subtitle track does.
#[derive(Default)]
struct DisplaySpans {
    builder: SpanBuilder,
    frames: u64,
}

impl OverlaySink for DisplaySpans {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> motiontrace_common::MotionResult<()> {
        self.frames += 1;
        self.builder.push_labels(frame.frame_index, &frame.display);
        Ok(())
    }
}

#[test]
fn three_seconds_at_ten_fps() {
    // Second 0: nobody in frame. Second 1: walking toward the camera.
    // Second 2: standing still.
    let mut frames = Vec::new();
    for f in 0..10 {
        frames.push(PoseFrame::missing(f));
    }
    for f in 10..20 {
        let hip_z = -0.1 - 0.01 * (f - 10) as f64;
        frames.push(PoseFrame::detected(f, body(hip_z, 0.45, 0.55)));
    }
    let still = body(-0.1 - 0.01 * 9.0, 0.45, 0.55);
    for f in 20..30 {
        frames.push(PoseFrame::detected(f, still.clone()));
    }

    let clock = FrameClock::new(10.0).unwrap();
    let outcome = AnalysisSession::new(clock, SessionOptions::default())
        .run(&mut StreamSource::new(frames), &mut DisplaySpans::default())
        .unwrap();

    let log = outcome.log;
    assert_eq!(log.len(), 2);
    assert!(log.get(0).is_none());
    assert_eq!(labels(&log.get(1).unwrap().flags), ["Advancing", "Gliding"]);
    assert_eq!(labels(&log.get(2).unwrap().flags), ["Gliding"]);

    assert_eq!(outcome.stats.frames, 30);
    assert_eq!(outcome.stats.no_person, 10);
    assert_eq!(outcome.stats.detected, 20);
}

#[test]
fn fixture_activity_log() {
    let stream = load_fixture_stream();
    let clock = FrameClock::new(stream.fps().unwrap()).unwrap();
    let outcome = AnalysisSession::new(clock, SessionOptions::default())
        .run(
            &mut StreamSource::from(stream),
            &mut DisplaySpans::default(),
        )
        .unwrap();

    let rows: Vec<(u64, Vec<&str>)> = outcome
        .log
        .rows()
        .iter()
        .map(|row| (row.second, labels(&row.flags)))
        .collect();

    assert_eq!(
        rows,
        vec![
            (0, vec!["Advancing", "Gliding"]),
            (1, vec!["Advancing", "Gliding"]),
            (
                2,
                vec![
                    "Enclosing",
                    "Spreading",
                    "Directing",
                    "Indirecting",
                    "Punching",
                    "Slashing",
                    "Wringing",
                    "Pressing",
                ]
            ),
            (3, vec!["Gliding"]),
        ]
    );

    let stats = outcome.stats;
    assert_eq!(stats.frames, 40);
    assert_eq!(stats.detected, 35);
    assert_eq!(stats.no_person, 5);
    assert_eq!(stats.category_frames.get(&Motion::Punching), Some(&10));
    assert_eq!(stats.category_frames.get(&Motion::Gliding), Some(&25));
    assert_eq!(stats.category_frames.get(&Motion::Dabbing), None);
}

#[test]
fn fixture_display_spans_cover_detections() {
    let stream = load_fixture_stream();
    let clock = FrameClock::new(stream.fps().unwrap()).unwrap();
    let mut sink = DisplaySpans::default();
    AnalysisSession::new(clock, SessionOptions::default())
        .run(&mut StreamSource::from(stream), &mut sink)
        .unwrap();

    assert_eq!(sink.frames, 40);
    let spans = sink.builder.finish();

    // Nothing is shown before the first detection at frame 5
    assert_eq!(spans.first().unwrap().start_frame, 5);
    // Every frame from the first detection on shows something
    for pair in spans.windows(2) {
        assert_eq!(pair[0].end_frame, pair[1].start_frame);
    }
    assert_eq!(spans.last().unwrap().end_frame, 40);
    assert_eq!(spans.last().unwrap().text, "Gliding");
}

#[test]
fn stricter_thresholds_silence_the_fixture() {
    let stream = load_fixture_stream();
    let clock = FrameClock::new(stream.fps().unwrap()).unwrap();
    let mut options = SessionOptions::default();
    for name in motiontrace_common::config::THRESHOLD_NAMES {
        if let Some(value) = options.thresholds.get_mut(name) {
            *value = 10.0;
        }
    }
    // Gliding fires below its cutoff, so make it unreachable instead
    options.thresholds.gliding = 0.0;

    let outcome = AnalysisSession::new(clock, options)
        .run(
            &mut StreamSource::from(stream),
            &mut motiontrace_processing_core::NullSink,
        )
        .unwrap();

    assert_eq!(outcome.log.len(), 4);
    assert!(outcome.log.rows().iter().all(|row| row.flags.is_empty()));
}
