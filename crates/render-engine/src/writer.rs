//! Append-only overlay track writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use motiontrace_common::error::{MotionError, MotionResult};
use motiontrace_processing_core::session::{FrameReport, OverlaySink};
use serde::{Deserialize, Serialize};

use crate::overlay::{compose_overlay, OverlayStyle};

/// Current overlay track schema version.
pub const OVERLAY_SCHEMA_VERSION: &str = "1.0";

/// First line of an overlay track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayTrackHeader {
    pub schema_version: String,
    pub fps: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Writes one composed overlay per frame to a JSONL file.
pub struct OverlayWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    style: OverlayStyle,
    frame_width: u32,
    frame_height: u32,
    frames_written: u64,
}

impl OverlayWriter {
    /// Create a new overlay writer, writing the header as the first line.
    pub fn new(path: PathBuf, header: OverlayTrackHeader, style: OverlayStyle) -> MotionResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        let header_json = serde_json::to_string(&header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| MotionError::render(format!("Failed to write overlay header: {e}")))?;

        Ok(Self {
            writer,
            path,
            style,
            frame_width: header.frame_width,
            frame_height: header.frame_height,
            frames_written: 0,
        })
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> MotionResult<()> {
        self.writer
            .flush()
            .map_err(|e| MotionError::render(format!("Failed to flush overlay track: {e}")))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverlaySink for OverlayWriter {
    fn write_frame(&mut self, frame: &FrameReport<'_>) -> MotionResult<()> {
        let overlay = compose_overlay(frame, self.frame_width, self.frame_height, &self.style);
        let json = serde_json::to_string(&overlay)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| MotionError::render(format!("Failed to write overlay frame: {e}")))?;
        self.frames_written += 1;

        if self.frames_written % 1000 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    fn finish(&mut self) -> MotionResult<()> {
        self.flush()?;
        tracing::info!(
            path = %self.path.display(),
            frames = self.frames_written,
            "Overlay track written"
        );
        Ok(())
    }
}

impl Drop for OverlayWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
