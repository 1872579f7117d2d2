//! Show pose stream information.

use std::path::PathBuf;

use motiontrace_common::clock::format_timestamp;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let stream = super::load_stream(&path)?;

    println!("Pose stream: {}", path.display());
    match &stream.header {
        Some(h) => {
            println!("  Schema: {}", h.schema_version);
            println!("  Resolution: {}x{}", h.frame_width, h.frame_height);
            match h.fps {
                Some(fps) => println!("  FPS: {fps}"),
                None => println!("  FPS: unknown"),
            }
            if let Some(source) = &h.source {
                println!("  Source: {source}");
            }
        }
        None => println!("  Header: none"),
    }
    println!();

    let total = stream.frames.len();
    let detected = stream.detected_frames();
    println!("Frames:");
    println!("  Total: {total}");
    println!("  With skeleton: {detected}");
    println!("  Without skeleton: {}", total - detected);
    if total > 0 {
        println!(
            "  Detection coverage: {:.1}%",
            detected as f64 / total as f64 * 100.0
        );
    }

    if let (Some(fps), Some(last)) = (stream.fps(), stream.frames.last()) {
        println!(
            "  Duration: {}",
            format_timestamp((last.frame_index + 1) as f64 / fps)
        );
    }

    let scores: Vec<f64> = stream
        .frames
        .iter()
        .filter_map(|f| f.skeleton.as_ref().map(|s| s.score))
        .collect();
    if !scores.is_empty() {
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        println!("  Pose score: min {min:.2}, mean {mean:.2}");
    }

    Ok(())
}
