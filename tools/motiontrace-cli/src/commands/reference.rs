//! Build a label track from a reference activity CSV.

use std::path::PathBuf;

use motiontrace_common::clock::FrameClock;
use motiontrace_processing_core::reference::ReferenceTimeline;
use motiontrace_render_engine::labels::save_label_track;

pub fn run(path: PathBuf, fps: f64, frames: u64, output: PathBuf) -> anyhow::Result<()> {
    println!("Reading reference: {}", path.display());

    let clock = FrameClock::new(fps)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let timeline = ReferenceTimeline::parse(&content)?;

    println!("  Labels: {}", timeline.label_names().join(", "));
    println!("  Seconds: {}", timeline.len());

    let spans = timeline.label_spans(frames, &clock);
    if let Some(last) = timeline.last_second() {
        if clock.second_index(frames.saturating_sub(1)) < last {
            tracing::warn!(
                last_second = last,
                frames,
                "Reference extends past the end of the video"
            );
        }
    }

    save_label_track(&spans, &clock, &output)?;
    println!("  Spans: {}", spans.len());
    println!("Wrote label track: {}", output.display());

    Ok(())
}
