//! Classify a pose stream and write run outputs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use motiontrace_common::clock::FrameClock;
use motiontrace_common::config::AppConfig;
use motiontrace_common::error::MotionError;
use motiontrace_pose_model::motion::Motion;
use motiontrace_processing_core::session::{AnalysisSession, SessionOptions, StreamSource};
use motiontrace_render_engine::labels::{save_label_track, LabelTrack};
use motiontrace_render_engine::overlay::OverlayStyle;
use motiontrace_render_engine::report::{write_activity_log, RunReport, RUN_REPORT_FILE};
use motiontrace_render_engine::writer::{OverlayTrackHeader, OverlayWriter, OVERLAY_SCHEMA_VERSION};

use crate::{SubtitleFormat, ThresholdArgs};

pub struct AnalyzeArgs {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub fps: Option<f64>,
    pub overlay: bool,
    pub subtitles: SubtitleFormat,
    pub thresholds: ThresholdArgs,
}

pub async fn run(args: AnalyzeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    println!("Analyzing pose stream: {}", args.path.display());

    let stream = super::load_stream(&args.path)?;

    let fps = match (args.fps, stream.fps()) {
        (Some(fps), _) => fps,
        (None, Some(fps)) => fps,
        (None, None) => {
            tracing::warn!(
                fallback_fps = config.analysis.fallback_fps,
                "Pose stream has no frame rate; using fallback"
            );
            config.analysis.fallback_fps
        }
    };
    let clock = FrameClock::new(fps)?;

    args.thresholds.apply(&mut config.thresholds);
    for warning in config.thresholds.sanity_warnings() {
        tracing::warn!("{warning}");
    }

    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    std::fs::create_dir_all(&output_dir)?;

    let overlay = match (&stream.header, args.overlay) {
        (Some(header), true) => {
            let track_header = OverlayTrackHeader {
                schema_version: OVERLAY_SCHEMA_VERSION.to_string(),
                fps,
                frame_width: header.frame_width,
                frame_height: header.frame_height,
                source: header.source.clone(),
            };
            let style = OverlayStyle::from_defaults(&config.overlay)?;
            Some(OverlayWriter::new(
                output_dir.join("overlay.jsonl"),
                track_header,
                style,
            )?)
        }
        (None, true) => {
            tracing::warn!("Pose stream has no header with frame size; skipping overlay track");
            None
        }
        (_, false) => None,
    };
    let overlay_path = overlay.as_ref().map(|w| w.path().to_path_buf());

    println!("  Frames: {}", stream.frames.len());
    println!("  FPS: {fps}");
    println!("  Output: {}", output_dir.display());

    let cancel = Arc::new(AtomicBool::new(false));
    let ctrl_c_flag = Arc::clone(&cancel);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_flag.store(true, Ordering::SeqCst);
        }
    });

    let session = AnalysisSession::new(clock, SessionOptions::from_config(&config))
        .with_cancel_flag(Arc::clone(&cancel));
    let mut source = StreamSource::from(stream);
    let mut sinks = (overlay, LabelTrack::new());

    let result = tokio::task::spawn_blocking(move || {
        session
            .run(&mut source, &mut sinks)
            .map(|outcome| (outcome, sinks.1.into_spans()))
    })
    .await?;
    ctrl_c.abort();

    let (outcome, spans) = match result {
        Ok(done) => done,
        Err(MotionError::Cancelled { frames_processed }) => {
            println!("\nAnalysis cancelled after {frames_processed} frames.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let (csv_path, json_path) = write_activity_log(&outcome.log, &output_dir)?;

    let labels_path = output_dir.join(format!("labels.{}", args.subtitles.extension()));
    save_label_track(&spans, &clock, &labels_path)?;

    let report = RunReport::new(
        args.path.display().to_string(),
        fps,
        config.thresholds,
        outcome.stats.clone(),
        &outcome.log,
    );
    report.save(&output_dir.join(RUN_REPORT_FILE))?;

    let stats = &outcome.stats;
    println!();
    println!("Analysis complete:");
    println!(
        "  Detected: {}/{} frames ({:.1}%)",
        stats.detected,
        stats.frames,
        stats.coverage() * 100.0
    );
    if stats.low_confidence > 0 || stats.incomplete > 0 {
        println!(
            "  Skipped: {} low confidence, {} incomplete",
            stats.low_confidence, stats.incomplete
        );
    }
    println!("  Seconds logged: {}", outcome.log.len());
    for motion in Motion::ALL {
        if let Some(count) = stats.category_frames.get(&motion) {
            println!("    {motion}: {count} frames");
        }
    }
    println!("  Label spans: {}", spans.len());
    println!();
    println!("  Activity log: {}", csv_path.display());
    println!("  Activity JSON: {}", json_path.display());
    println!("  Labels: {}", labels_path.display());
    if let Some(path) = overlay_path {
        println!("  Overlay: {}", path.display());
    }

    Ok(())
}
