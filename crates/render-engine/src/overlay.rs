//! Overlay composition: turns a frame report into drawing instructions.
//!
//! This module defines what is drawn on each frame of a labeled video:
//! the skeleton (joints and bones in pixel coordinates), the current motion
//! labels, and a `M:SS` timestamp. Drawing itself happens downstream.

use motiontrace_common::clock::format_timestamp;
use motiontrace_common::config::{OverlayDefaults, TextAnchor};
use motiontrace_common::error::{MotionError, MotionResult};
use motiontrace_pose_model::skeleton::{Joint, Landmark};
use motiontrace_processing_core::session::{FrameReport, FrameStatus};
use motiontrace_processing_core::spans::label_text;
use serde::{Deserialize, Serialize};

/// Nominal glyph advance of the simplex font at scale 1.0, in pixels.
const GLYPH_WIDTH_PX: f64 = 20.0;
/// Nominal cap height of the simplex font at scale 1.0, in pixels.
const GLYPH_HEIGHT_PX: f64 = 22.0;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Named colors accepted wherever a color is configured.
pub const COLOR_PRESETS: [(&str, Rgb); 10] = [
    ("Red", Rgb::new(255, 0, 0)),
    ("Green", Rgb::new(0, 255, 0)),
    ("Blue", Rgb::new(0, 0, 255)),
    ("Yellow", Rgb::new(255, 255, 0)),
    ("Cyan", Rgb::new(0, 255, 255)),
    ("Magenta", Rgb::new(255, 0, 255)),
    ("Orange", Rgb::new(255, 165, 0)),
    ("Purple", Rgb::new(128, 0, 128)),
    ("White", Rgb::new(255, 255, 255)),
    ("Black", Rgb::new(0, 0, 0)),
];

/// Parse a preset name (case-insensitive) or `#RRGGBB`.
pub fn parse_color(value: &str) -> MotionResult<Rgb> {
    let value = value.trim();
    if let Some((_, rgb)) = COLOR_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
    {
        return Ok(*rgb);
    }

    let invalid = || MotionError::config(format!("unknown color {value:?}"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = MotionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_color(&value)
    }
}

/// Resolved overlay styling.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub anchor: TextAnchor,
    pub margin_px: i32,
    pub font_scale: f64,
    pub font_thickness: u32,
    pub text_color: Rgb,
    pub line_color: Rgb,
    pub dot_color: Rgb,
    pub line_thickness: u32,
    pub dot_radius: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            anchor: TextAnchor::TopLeft,
            margin_px: 20,
            font_scale: 0.5,
            font_thickness: 1,
            text_color: Rgb::new(255, 0, 0),
            line_color: Rgb::new(255, 0, 0),
            dot_color: Rgb::new(255, 255, 255),
            line_thickness: 2,
            dot_radius: 2,
        }
    }
}

impl OverlayStyle {
    /// Resolve configured color names.
    pub fn from_defaults(defaults: &OverlayDefaults) -> MotionResult<Self> {
        Ok(Self {
            anchor: defaults.anchor,
            margin_px: defaults.margin_px,
            font_scale: defaults.font_scale,
            font_thickness: defaults.font_thickness,
            text_color: parse_color(&defaults.text_color)?,
            line_color: parse_color(&defaults.line_color)?,
            dot_color: parse_color(&defaults.dot_color)?,
            line_thickness: defaults.line_thickness,
            dot_radius: defaults.dot_radius,
        })
    }

    /// Estimated rendered size of `text` as `(width, height)` in pixels.
    pub fn text_extent(&self, text: &str) -> (i32, i32) {
        let chars = text.chars().count() as f64;
        let width = chars * GLYPH_WIDTH_PX * self.font_scale + self.font_thickness as f64;
        let height = GLYPH_HEIGHT_PX * self.font_scale + self.font_thickness as f64;
        (width.round() as i32, height.round() as i32)
    }
}

/// A point in output pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    fn project(landmark: &Landmark, frame_width: u32, frame_height: u32) -> Self {
        Self {
            x: (landmark.x * frame_width as f64) as i32,
            y: (landmark.y * frame_height as f64) as i32,
        }
    }
}

/// A joint dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointDot {
    pub joint: Joint,
    #[serde(flatten)]
    pub at: PixelPoint,
}

/// A line between two joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneLine {
    pub from: PixelPoint,
    pub to: PixelPoint,
}

/// Text placed at a baseline origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub text: String,
    /// Left end of the baseline.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Drawing instructions for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOverlay {
    #[serde(rename = "f")]
    pub frame_index: u64,
    pub time_secs: f64,
    pub status: FrameStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joints: Vec<JointDot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bones: Vec<BoneLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<TextPlacement>,
    pub timestamp: TextPlacement,
}

/// Baseline origin for text of the given extent.
pub fn place_text(
    anchor: TextAnchor,
    extent: (i32, i32),
    frame_width: u32,
    frame_height: u32,
    margin: i32,
) -> (i32, i32) {
    let (text_w, text_h) = extent;
    let (w, h) = (frame_width as i32, frame_height as i32);
    match anchor {
        TextAnchor::BottomRight => (w - text_w - margin, h - margin),
        TextAnchor::BottomLeft => (margin, h - margin),
        TextAnchor::TopRight => (w - text_w - margin, margin + text_h),
        TextAnchor::TopLeft => (margin, margin + text_h),
        TextAnchor::Center => ((w - text_w) / 2, (h + text_h) / 2),
        TextAnchor::Custom { x_pct, y_pct } => (
            (x_pct / 100.0 * frame_width as f64) as i32,
            (y_pct / 100.0 * frame_height as f64) as i32,
        ),
    }
}

fn placement(
    text: String,
    anchor: TextAnchor,
    style: &OverlayStyle,
    frame_width: u32,
    frame_height: u32,
) -> TextPlacement {
    let (width, height) = style.text_extent(&text);
    let (x, y) = place_text(
        anchor,
        (width, height),
        frame_width,
        frame_height,
        style.margin_px,
    );
    TextPlacement {
        text,
        x,
        y,
        width,
        height,
    }
}

/// Build the overlay for one frame.
///
/// The skeleton is drawn whenever one was estimated, even if the frame was
/// not classified. The timestamp sits in the top corner away from the labels.
pub fn compose_overlay(
    frame: &FrameReport<'_>,
    frame_width: u32,
    frame_height: u32,
    style: &OverlayStyle,
) -> FrameOverlay {
    let mut joints = Vec::new();
    let mut bones = Vec::new();

    if let Some(skeleton) = frame.skeleton {
        joints = skeleton
            .joints
            .iter()
            .map(|(joint, landmark)| JointDot {
                joint: *joint,
                at: PixelPoint::project(landmark, frame_width, frame_height),
            })
            .collect();

        bones = skeleton
            .bones()
            .map(|(a, b)| BoneLine {
                from: PixelPoint::project(a, frame_width, frame_height),
                to: PixelPoint::project(b, frame_width, frame_height),
            })
            .collect();
    }

    let labels = label_text(&frame.display)
        .map(|text| placement(text, style.anchor, style, frame_width, frame_height));

    let timestamp_anchor = match style.anchor {
        TextAnchor::TopRight => TextAnchor::TopLeft,
        _ => TextAnchor::TopRight,
    };
    let timestamp = placement(
        format_timestamp(frame.second as f64),
        timestamp_anchor,
        style,
        frame_width,
        frame_height,
    );

    FrameOverlay {
        frame_index: frame.frame_index,
        time_secs: frame.time_secs,
        status: frame.status,
        joints,
        bones,
        labels,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motiontrace_pose_model::motion::{Motion, MotionSet};
    use motiontrace_pose_model::skeleton::Skeleton;

    fn report<'a>(skeleton: Option<&'a Skeleton>, display: MotionSet) -> FrameReport<'a> {
        FrameReport {
            frame_index: 75,
            time_secs: 2.5,
            second: 2,
            skeleton,
            status: FrameStatus::Detected,
            detection: display,
            display,
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(parse_color(" Orange ").unwrap(), Rgb::new(255, 165, 0));
        assert_eq!(parse_color("#0a80FF").unwrap(), Rgb::new(10, 128, 255));
        assert!(parse_color("chartreuse").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gg0000").is_err());
    }

    #[test]
    fn test_rgb_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb::new(255, 165, 0)).unwrap();
        assert_eq!(json, "\"#ffa500\"");
        let parsed: Rgb = serde_json::from_str("\"Purple\"").unwrap();
        assert_eq!(parsed, Rgb::new(128, 0, 128));
    }

    #[test]
    fn test_style_from_config_defaults() {
        let style = OverlayStyle::from_defaults(&OverlayDefaults::default()).unwrap();
        assert_eq!(style, OverlayStyle::default());
    }

    #[test]
    fn test_place_text_anchors() {
        let extent = (100, 10);
        assert_eq!(
            place_text(TextAnchor::BottomRight, extent, 640, 480, 20),
            (520, 460)
        );
        assert_eq!(place_text(TextAnchor::BottomLeft, extent, 640, 480, 20), (20, 460));
        assert_eq!(place_text(TextAnchor::TopRight, extent, 640, 480, 20), (520, 30));
        assert_eq!(place_text(TextAnchor::TopLeft, extent, 640, 480, 20), (20, 30));
        assert_eq!(place_text(TextAnchor::Center, extent, 640, 480, 20), (270, 245));
        assert_eq!(
            place_text(
                TextAnchor::Custom {
                    x_pct: 80.0,
                    y_pct: 80.0
                },
                extent,
                640,
                480,
                20
            ),
            (512, 384)
        );
    }

    #[test]
    fn test_compose_projects_skeleton() {
        let skeleton = Skeleton::new(0.9)
            .with_joint(Joint::LeftShoulder, Landmark::new(0.25, 0.5, 0.0))
            .with_joint(Joint::LeftElbow, Landmark::new(0.5, 0.75, 0.0))
            .with_joint(Joint::Nose, Landmark::new(0.5, 0.1, 0.0));
        let overlay = compose_overlay(
            &report(Some(&skeleton), MotionSet::empty()),
            640,
            480,
            &OverlayStyle::default(),
        );

        assert_eq!(overlay.joints.len(), 3);
        // Only the shoulder-elbow bone has both ends present
        assert_eq!(overlay.bones.len(), 1);
        assert_eq!(overlay.bones[0].from, PixelPoint { x: 160, y: 240 });
        assert_eq!(overlay.bones[0].to, PixelPoint { x: 320, y: 360 });
        assert!(overlay.labels.is_none());
        assert_eq!(overlay.timestamp.text, "0:02");
    }

    #[test]
    fn test_compose_labels_and_timestamp_corner() {
        let display: MotionSet = [Motion::Gliding, Motion::Advancing].into_iter().collect();
        let style = OverlayStyle::default();
        let overlay = compose_overlay(&report(None, display), 640, 480, &style);

        let labels = overlay.labels.unwrap();
        assert_eq!(labels.text, "Advancing, Gliding");
        assert_eq!(labels.x, style.margin_px);
        assert!(overlay.timestamp.x > labels.x);
        assert!(overlay.joints.is_empty());
    }
}
