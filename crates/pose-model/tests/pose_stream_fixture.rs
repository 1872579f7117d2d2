use std::path::PathBuf;

use motiontrace_pose_model::skeleton::Joint;
use motiontrace_pose_model::stream::{parse_pose_stream, serialize_pose_stream};

fn fixture_content() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join("poses.jsonl");

    std::fs::read_to_string(path).expect("fixture pose stream should be readable")
}

#[test]
fn fixture_header_and_frames() {
    let stream = parse_pose_stream(&fixture_content()).expect("fixture should parse");

    let header = stream.header.as_ref().expect("fixture has a header");
    assert_eq!(header.schema_version, "1.0");
    assert_eq!(header.fps, Some(10.0));
    assert_eq!((header.frame_width, header.frame_height), (640, 480));
    assert_eq!(header.source.as_deref(), Some("sample-session.mp4"));

    assert_eq!(stream.frames.len(), 40);
    assert_eq!(stream.detected_frames(), 35);
    assert!(stream.frames[..5].iter().all(|f| f.skeleton.is_none()));
}

#[test]
fn fixture_skeletons_carry_required_joints() {
    let stream = parse_pose_stream(&fixture_content()).unwrap();
    for frame in stream.frames.iter().filter(|f| f.skeleton.is_some()) {
        let skeleton = frame.skeleton.as_ref().unwrap();
        assert!((skeleton.score - 0.95).abs() < 1e-12);
        for joint in [
            Joint::LeftHip,
            Joint::RightHip,
            Joint::LeftWrist,
            Joint::RightWrist,
        ] {
            assert!(
                skeleton.joint(joint).is_some(),
                "frame {} lacks {joint}",
                frame.frame_index
            );
        }
    }
}

#[test]
fn fixture_survives_reserialization() {
    let stream = parse_pose_stream(&fixture_content()).unwrap();
    let jsonl = serialize_pose_stream(stream.header.as_ref(), &stream.frames).unwrap();
    assert_eq!(parse_pose_stream(&jsonl).unwrap(), stream);
}
