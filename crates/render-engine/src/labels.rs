//! Label tracks in SRT and VTT formats.

use std::path::Path;

use motiontrace_common::clock::FrameClock;
use motiontrace_common::error::MotionResult;
use motiontrace_processing_core::session::{FrameReport, OverlaySink};
use motiontrace_processing_core::spans::{LabelSpan, SpanBuilder};

/// Generate SRT subtitle content from label spans.
pub fn generate_srt(spans: &[LabelSpan], clock: &FrameClock) -> String {
    let mut output = String::new();

    for (i, span) in spans.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(span.start_secs(clock)),
            format_srt_time(span.end_secs(clock)),
        ));
        output.push_str(&span.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT subtitle content from label spans.
pub fn generate_vtt(spans: &[LabelSpan], clock: &FrameClock) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for span in spans {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(span.start_secs(clock)),
            format_vtt_time(span.end_secs(clock)),
        ));
        output.push_str(&span.text);
        output.push_str("\n\n");
    }

    output
}

fn split_millis(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format seconds as SRT timestamp: HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Save a label track; `.vtt` selects WebVTT, anything else SRT.
pub fn save_label_track(spans: &[LabelSpan], clock: &FrameClock, path: &Path) -> MotionResult<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("vtt") => generate_vtt(spans, clock),
        _ => generate_srt(spans, clock),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Collects the smoothed display labels of a run into spans.
#[derive(Debug, Default)]
pub struct LabelTrack {
    builder: SpanBuilder,
}

impl LabelTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> &[LabelSpan] {
        self.builder.spans()
    }

    pub fn into_spans(self) -> Vec<LabelSpan> {
        self.builder.finish()
    }
}

impl OverlaySink for LabelTrack {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()> {
        self.builder.push_labels(frame.frame_index, &frame.display);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiontrace_pose_model::motion::{Motion, MotionSet};
    use motiontrace_processing_core::session::FrameStatus;

    fn span(start_frame: u64, end_frame: u64, text: &str) -> LabelSpan {
        LabelSpan {
            start_frame,
            end_frame,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_srt_generation() {
        let clock = FrameClock::new(10.0).unwrap();
        let spans = vec![span(0, 25, "Advancing, Gliding"), span(30, 50, "Punching")];

        let srt = generate_srt(&spans, &clock);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nAdvancing, Gliding"));
        assert!(srt.contains("2\n00:00:03,000 --> 00:00:05,000\nPunching"));
    }

    #[test]
    fn test_vtt_generation() {
        let clock = FrameClock::new(2.0).unwrap();
        let spans = vec![span(123, 126, "Gliding")];

        let vtt = generate_vtt(&spans, &clock);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:01:01.500 --> 00:01:03.000"));
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(3661.5), "01:01:01,500");
        assert_eq!(format_vtt_time(3661.5), "01:01:01.500");
        // 23 frames at 10 fps must not truncate to 2.299
        assert_eq!(format_srt_time(23.0 / 10.0), "00:00:02,300");
    }

    #[test]
    fn test_label_track_merges_held_labels() {
        let punch: MotionSet = [Motion::Punching].into_iter().collect();
        let mut track = LabelTrack::new();
        for (frame_index, display) in [(0, punch), (1, punch), (2, MotionSet::empty())] {
            track
                .write_frame(&FrameReport {
                    frame_index,
                    time_secs: 0.0,
                    second: 0,
                    skeleton: None,
                    status: FrameStatus::Detected,
                    detection: display,
                    display,
                })
                .unwrap();
        }
        assert_eq!(track.into_spans(), vec![span(0, 2, "Punching")]);
    }

    #[test]
    fn test_save_picks_format_by_extension() {
        let dir = std::env::temp_dir().join("motiontrace_test_label_track");
        let _ = std::fs::remove_dir_all(&dir);
        let clock = FrameClock::new(10.0).unwrap();
        let spans = vec![span(0, 10, "Gliding")];

        let vtt = dir.join("labels.vtt");
        let srt = dir.join("labels.srt");
        save_label_track(&spans, &clock, &vtt).unwrap();
        save_label_track(&spans, &clock, &srt).unwrap();

        assert!(std::fs::read_to_string(&vtt).unwrap().starts_with("WEBVTT"));
        assert!(std::fs::read_to_string(&srt).unwrap().starts_with("1\n"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
