//! motiontrace Render Engine
//!
//! Turns analysis results into artifacts: per-frame overlay tracks,
//! label subtitle tracks, run reports, and labeled video exports.
//!
//! # Pipeline Architecture
//!
//! ```text
//! poses.jsonl ──► AnalysisSession ──┬── OverlayWriter ──► overlay.jsonl
//!                                   │
//!                                   ├── LabelTrack ─────► labels.srt
//!                                   │                        │
//!                                   └── ActivityLog ──► activity_log.csv
//!                                                            │
//! source.mp4 ───────────────────────────────────────── Subtitle Burn
//!                                                            │
//!                                                            ▼
//!                                                      labeled.mp4
//! ```

pub mod export;
pub mod labels;
pub mod overlay;
pub mod report;
pub mod writer;

pub use export::*;
pub use labels::{generate_srt, generate_vtt, save_label_track, LabelTrack};
pub use overlay::{compose_overlay, parse_color, FrameOverlay, OverlayStyle, Rgb};
pub use report::{write_activity_log, RunReport};
pub use writer::{OverlayTrackHeader, OverlayWriter};
