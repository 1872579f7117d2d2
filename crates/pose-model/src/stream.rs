//! Pose stream: per-frame pose estimates in JSONL format.
//!
//! The first line may be a header comment (`# {...}`) describing the source
//! video. Every other non-empty, non-`#` line is one decoded frame:
//!
//! ```text
//! # {"schema_version":"1.0","fps":30.0,"frame_width":1280,"frame_height":720}
//! {"f":0,"skeleton":null}
//! {"f":1,"skeleton":{"score":0.93,"joints":{"left_hip":[0.45,0.61,-0.12], ...}}}
//! ```
//!
//! `"skeleton": null` is the explicit "no person detected" signal.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;

/// Current pose stream schema version.
pub const POSE_STREAM_SCHEMA_VERSION: &str = "1.0";

/// Source video description carried in the stream header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Source frame rate, if the producer knew it.
    #[serde(default)]
    pub fps: Option<f64>,

    /// Source frame dimensions in pixels.
    pub frame_width: u32,
    pub frame_height: u32,

    /// Source video path or identifier.
    #[serde(default)]
    pub source: Option<String>,
}

/// Pose estimate for one decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Zero-based decode-order frame index.
    #[serde(rename = "f")]
    pub frame_index: u64,

    /// `None` when no person was detected.
    #[serde(default)]
    pub skeleton: Option<Skeleton>,
}

impl PoseFrame {
    pub fn detected(frame_index: u64, skeleton: Skeleton) -> Self {
        Self {
            frame_index,
            skeleton: Some(skeleton),
        }
    }

    pub fn missing(frame_index: u64) -> Self {
        Self {
            frame_index,
            skeleton: None,
        }
    }
}

/// Errors raised while reading a pose stream.
#[derive(Debug, thiserror::Error)]
pub enum PoseStreamError {
    #[error("line {line}: invalid pose frame: {source}")]
    InvalidFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: invalid stream header: {source}")]
    InvalidHeader {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: frame index {found} does not follow {previous}")]
    OutOfOrder {
        line: usize,
        previous: u64,
        found: u64,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed pose stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseStream {
    pub header: Option<PoseStreamHeader>,
    pub frames: Vec<PoseFrame>,
}

impl PoseStream {
    /// Number of frames with a skeleton.
    pub fn detected_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.skeleton.is_some()).count()
    }

    /// Frame rate from the header, if present.
    pub fn fps(&self) -> Option<f64> {
        self.header.as_ref().and_then(|h| h.fps)
    }
}

/// Parse a pose stream from JSONL content.
///
/// The header is taken from the first `#` line whose remainder is a JSON
/// object; other `#` lines are comments. Frame indices must be strictly
/// increasing.
pub fn parse_pose_stream(jsonl: &str) -> Result<PoseStream, PoseStreamError> {
    let mut header = None;
    let mut frames: Vec<PoseFrame> = Vec::new();

    for (i, raw) in jsonl.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let comment = comment.trim();
            if header.is_none() && frames.is_empty() && comment.starts_with('{') {
                let parsed = serde_json::from_str(comment).map_err(|source| {
                    PoseStreamError::InvalidHeader {
                        line: line_no,
                        source,
                    }
                })?;
                header = Some(parsed);
            }
            continue;
        }

        let frame: PoseFrame =
            serde_json::from_str(line).map_err(|source| PoseStreamError::InvalidFrame {
                line: line_no,
                source,
            })?;

        if let Some(previous) = frames.last() {
            if frame.frame_index <= previous.frame_index {
                return Err(PoseStreamError::OutOfOrder {
                    line: line_no,
                    previous: previous.frame_index,
                    found: frame.frame_index,
                });
            }
        }
        frames.push(frame);
    }

    Ok(PoseStream { header, frames })
}

/// Read and parse a pose stream file.
pub fn load_pose_stream(path: &Path) -> Result<PoseStream, PoseStreamError> {
    let content = std::fs::read_to_string(path)?;
    parse_pose_stream(&content)
}

/// Serialize a pose stream to JSONL, header first.
pub fn serialize_pose_stream(
    header: Option<&PoseStreamHeader>,
    frames: &[PoseFrame],
) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    if let Some(header) = header {
        output.push_str("# ");
        output.push_str(&serde_json::to_string(header)?);
        output.push('\n');
    }
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
