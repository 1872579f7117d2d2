use motiontrace_common::config::ThresholdConfig;
use motiontrace_pose_model::motion::{Motion, MotionSet};
use motiontrace_processing_core::aggregate::ActivityAggregator;
use motiontrace_processing_core::classifier::classify;
use motiontrace_processing_core::hold::LabelHold;
use motiontrace_processing_core::metrics::{FrameMetrics, Vec3};
use proptest::prelude::*;

fn vec3() -> impl Strategy<Value = Vec3> {
    (0.0..1.0f64, 0.0..1.0f64, -1.0..1.0f64).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn frame_metrics() -> impl Strategy<Value = FrameMetrics> {
    (-1.0..1.0f64, 0.0..1.5f64, vec3(), vec3()).prop_map(|(hip, sep, lw, rw)| FrameMetrics {
        hip_depth: hip,
        wrist_separation: sep,
        left_wrist_pos: lw,
        right_wrist_pos: rw,
    })
}

fn thresholds() -> impl Strategy<Value = ThresholdConfig> {
    prop::array::uniform11(0.0..0.5f64).prop_map(|v| ThresholdConfig {
        hip: v[0],
        wrist: v[1],
        directing: v[2],
        indirecting: v[3],
        gliding: v[4],
        punching: v[5],
        dabbing: v[6],
        flicking: v[7],
        slashing: v[8],
        wringing: v[9],
        pressing: v[10],
    })
}

fn motion_set() -> impl Strategy<Value = MotionSet> {
    prop::array::uniform13(any::<bool>()).prop_map(MotionSet::from_flags)
}

proptest! {
    #[test]
    fn first_frame_never_has_delta_categories(curr in frame_metrics(), t in thresholds()) {
        let set = classify(None, &curr, &t);
        for motion in [Motion::Advancing, Motion::Retreating, Motion::Enclosing, Motion::Spreading] {
            prop_assert!(!set.contains(motion));
        }
        // Zero velocity: every "greater than" velocity category is off
        for motion in [Motion::Indirecting, Motion::Punching, Motion::Slashing, Motion::Wringing, Motion::Pressing] {
            prop_assert!(!set.contains(motion));
        }
    }

    #[test]
    fn classification_is_deterministic(
        prev in frame_metrics(),
        curr in frame_metrics(),
        t in thresholds(),
    ) {
        prop_assert_eq!(classify(Some(&prev), &curr, &t), classify(Some(&prev), &curr, &t));
    }

    #[test]
    fn opposite_categories_exclude_each_other(
        prev in frame_metrics(),
        curr in frame_metrics(),
        t in thresholds(),
    ) {
        let set = classify(Some(&prev), &curr, &t);
        prop_assert!(!(set.contains(Motion::Advancing) && set.contains(Motion::Retreating)));
        prop_assert!(!(set.contains(Motion::Enclosing) && set.contains(Motion::Spreading)));
        prop_assert!(!(set.contains(Motion::Dabbing) && set.contains(Motion::Flicking)));
    }

    #[test]
    fn hold_keeps_labels_for_exactly_one_second(
        labels in motion_set().prop_filter("non-empty", |s| !s.is_empty()),
        fps in 1u32..120,
    ) {
        let mut hold = LabelHold::new();
        prop_assert_eq!(hold.update(labels, fps), labels);
        for _ in 0..fps {
            prop_assert_eq!(hold.update(MotionSet::empty(), fps), labels);
        }
        prop_assert!(hold.update(MotionSet::empty(), fps).is_empty());
        prop_assert!(hold.remaining() <= fps);
    }

    #[test]
    fn hold_output_is_input_or_held(
        inputs in prop::collection::vec(motion_set(), 0..60),
        fps in 1u32..10,
    ) {
        let mut hold = LabelHold::new();
        let mut last_non_empty = MotionSet::empty();
        for input in inputs {
            let shown = hold.update(input, fps);
            if !input.is_empty() {
                prop_assert_eq!(shown, input);
                last_non_empty = input;
            } else {
                prop_assert!(shown.is_empty() || shown == last_non_empty);
            }
            prop_assert!(hold.remaining() <= fps);
        }
    }

    #[test]
    fn aggregator_row_is_or_of_frames(
        frames in prop::collection::vec((0u64..5, motion_set()), 1..50),
    ) {
        let mut agg = ActivityAggregator::new();
        for (second, detection) in &frames {
            agg.record(*second, detection);
        }
        let log = agg.finish();

        for row in log.rows() {
            let expected = frames
                .iter()
                .filter(|(second, _)| *second == row.second)
                .fold(MotionSet::empty(), |acc, (_, d)| acc | *d);
            prop_assert_eq!(row.flags, expected);
        }
        let mut seconds: Vec<u64> = frames.iter().map(|(s, _)| *s).collect();
        seconds.sort_unstable();
        seconds.dedup();
        prop_assert_eq!(log.rows().iter().map(|r| r.second).collect::<Vec<_>>(), seconds);
    }
}
