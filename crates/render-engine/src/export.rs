//! Labeled video export: burns a label track into the source video.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use motiontrace_common::config::TextAnchor;
use motiontrace_common::error::{MotionError, MotionResult};

use crate::overlay::{OverlayStyle, Rgb};

/// An export job ready to be rendered.
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Source video.
    pub video_path: PathBuf,

    /// SRT or VTT label track to burn in.
    pub label_track: PathBuf,

    /// Output file path.
    pub output_path: PathBuf,

    /// Text styling for the burned-in labels.
    pub style: OverlayStyle,
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0]; 0.0 while the duration is unknown.
    pub progress: f64,

    /// Output time encoded so far, in seconds.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

/// Trait for render backends.
pub trait RenderBackend: Send {
    /// Execute the export job.
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> MotionResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Burn a label track into a video with the default backend.
///
/// This is the main entry point for rendering.
pub async fn export_labeled_video(
    job: ExportJob,
    progress: Option<ProgressCallback>,
) -> MotionResult<PathBuf> {
    export_with_backend(job, Box::new(FfmpegBackend::new()), progress).await
}

/// Burn a label track into a video with an explicit backend.
pub async fn export_with_backend(
    job: ExportJob,
    mut backend: Box<dyn RenderBackend>,
    progress: Option<ProgressCallback>,
) -> MotionResult<PathBuf> {
    tracing::info!(
        video = %job.video_path.display(),
        labels = %job.label_track.display(),
        output = %job.output_path.display(),
        "Starting export"
    );

    for input in [&job.video_path, &job.label_track] {
        if !input.exists() {
            return Err(MotionError::FileNotFound {
                path: input.clone(),
            });
        }
    }

    if let Some(parent) = job.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if let Some(cb) = &progress {
        cb(ExportProgress {
            progress: 0.0,
            out_time_secs: 0.0,
            eta_secs: 0.0,
            stage: ExportStage::Preparing,
        });
    }

    if !backend.is_available() {
        return Err(MotionError::unsupported(format!(
            "Render backend {} is not available (expected ffmpeg in PATH)",
            backend.name()
        )));
    }
    tracing::info!(backend = backend.name(), "Using render backend");

    let output = job.output_path.clone();
    tokio::task::spawn_blocking(move || backend.render(&job, progress))
        .await
        .map_err(|e| MotionError::render(format!("Render task failed: {e}")))??;

    Ok(output)
}

/// Renders through an `ffmpeg` subprocess using the `subtitles` filter.
#[derive(Debug, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn run_ffmpeg(
        &self,
        args: &[String],
        expected_duration_secs: Option<f64>,
        progress: Option<ProgressCallback>,
    ) -> MotionResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MotionError::render(format!("Failed to start ffmpeg: {e}")))?;

        let start = std::time::Instant::now();
        tracing::info!(pid = child.id(), "ffmpeg process started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MotionError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MotionError::render("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills up, so drain it on its own thread.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| MotionError::render(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            state.update(key, value);
            if key == "progress" {
                if let Some(cb) = &progress {
                    cb(progress_report(
                        &state,
                        expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| MotionError::render(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(MotionError::render(format!(
                "ffmpeg export failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 1.0,
                out_time_secs: state.out_time_secs,
                eta_secs: 0.0,
                stage: ExportStage::Complete,
            });
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&mut self, job: &ExportJob, progress: Option<ProgressCallback>) -> MotionResult<()> {
        let duration = probe_duration_secs(&job.video_path);
        if duration.is_none() {
            tracing::warn!(
                video = %job.video_path.display(),
                "Could not probe video duration; progress will not be reported as a fraction"
            );
        }
        let args = ffmpeg_args(job);
        self.run_ffmpeg(&args, duration, progress)
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Full ffmpeg argument list for a job.
pub fn ffmpeg_args(job: &ExportJob) -> Vec<String> {
    let filter = format!(
        "subtitles=filename={}:force_style='{}'",
        escape_filter_value(&job.label_track.to_string_lossy()),
        force_style(&job.style)
    );
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-nostats".to_string(),
        "-i".to_string(),
        job.video_path.to_string_lossy().into_owned(),
        "-vf".to_string(),
        filter,
        "-c:a".to_string(),
        "copy".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        job.output_path.to_string_lossy().into_owned(),
    ]
}

/// ASS style override for the subtitles filter.
///
/// A font scale of 1.0 maps to a 32 pt font.
fn force_style(style: &OverlayStyle) -> String {
    let font_size = (style.font_scale * 32.0).round().max(8.0) as u32;
    format!(
        "FontSize={},PrimaryColour={},OutlineColour={},BorderStyle=1,Outline={},Alignment={},MarginL={},MarginR={},MarginV={}",
        font_size,
        ass_colour(style.text_color),
        ass_colour(Rgb::new(0, 0, 0)),
        style.font_thickness + 1,
        ass_alignment(style.anchor),
        style.margin_px,
        style.margin_px,
        style.margin_px,
    )
}

/// ASS colours are `&HAABBGGRR` with alpha 0 meaning opaque.
fn ass_colour(rgb: Rgb) -> String {
    format!("&H00{:02X}{:02X}{:02X}", rgb.b, rgb.g, rgb.r)
}

/// Numpad-style ASS alignment. Custom positions snap to the nearest third.
fn ass_alignment(anchor: TextAnchor) -> u8 {
    match anchor {
        TextAnchor::BottomLeft => 1,
        TextAnchor::BottomRight => 3,
        TextAnchor::Center => 5,
        TextAnchor::TopLeft => 7,
        TextAnchor::TopRight => 9,
        TextAnchor::Custom { x_pct, y_pct } => {
            let column = match x_pct {
                x if x < 100.0 / 3.0 => 1,
                x if x < 200.0 / 3.0 => 2,
                _ => 3,
            };
            let row_base = match y_pct {
                y if y < 100.0 / 3.0 => 6,
                y if y < 200.0 / 3.0 => 3,
                _ => 0,
            };
            row_base + column
        }
    }
}

/// Escape a value for use inside an ffmpeg filter argument.
fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':' | ',' | ';' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn probe_duration_secs(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    let secs = raw.lines().next()?.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: Option<f64>,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = match expected_duration_secs {
        Some(duration) if duration > 0.0 => (state.out_time_secs / duration).clamp(0.0, 1.0),
        _ => 0.0,
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        out_time_secs: state.out_time_secs,
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Encoding
        },
    }
}
