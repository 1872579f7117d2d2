//! Check a pose stream and the effective thresholds.

use std::path::PathBuf;

use motiontrace_common::clock::FrameClock;
use motiontrace_common::config::AppConfig;
use motiontrace_processing_core::session::{AnalysisSession, NullSink, SessionOptions, StreamSource};

use crate::ThresholdArgs;

pub fn run(path: PathBuf, thresholds: ThresholdArgs, mut config: AppConfig) -> anyhow::Result<()> {
    println!("Validating pose stream: {}", path.display());

    let stream = super::load_stream(&path)?;
    thresholds.apply(&mut config.thresholds);

    let mut issues = Vec::new();

    match &stream.header {
        Some(header) => {
            println!(
                "  Resolution: {}x{}",
                header.frame_width, header.frame_height
            );
            if header.frame_width == 0 || header.frame_height == 0 {
                issues.push("header has a zero frame dimension".to_string());
            }
        }
        None => issues.push("no header; overlay output will be skipped".to_string()),
    }

    let fps = match stream.fps() {
        Some(fps) => {
            println!("  FPS: {fps}");
            fps
        }
        None => {
            issues.push(format!(
                "no frame rate in header; analysis falls back to {} fps",
                config.analysis.fallback_fps
            ));
            config.analysis.fallback_fps
        }
    };
    println!("  Frames: {}", stream.frames.len());

    let gaps = stream
        .frames
        .windows(2)
        .filter(|pair| pair[1].frame_index != pair[0].frame_index + 1)
        .count();
    if gaps > 0 {
        issues.push(format!("{gaps} gap(s) in frame indices"));
    }
    if let Some(first) = stream.frames.first() {
        if first.frame_index != 0 {
            issues.push(format!("first frame index is {}", first.frame_index));
        }
    }

    let clock = FrameClock::new(fps)?;
    let session = AnalysisSession::new(clock, SessionOptions::from_config(&config));
    let outcome = session.run(&mut StreamSource::from(stream), &mut NullSink)?;
    let stats = &outcome.stats;
    println!(
        "  Usable detections: {}/{} ({:.1}%)",
        stats.detected,
        stats.frames,
        stats.coverage() * 100.0
    );
    if stats.low_confidence > 0 {
        issues.push(format!(
            "{} skeleton(s) below min_pose_confidence {}",
            stats.low_confidence, config.analysis.min_pose_confidence
        ));
    }
    if stats.incomplete > 0 {
        issues.push(format!(
            "{} skeleton(s) missing hip or wrist joints",
            stats.incomplete
        ));
    }

    issues.extend(config.thresholds.sanity_warnings());

    if issues.is_empty() {
        println!("\nPose stream is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Results may be incomplete.",
            issues.len()
        );
    }

    Ok(())
}
