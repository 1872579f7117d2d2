//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, MotionResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where run outputs are written when `-o` is not given.
    pub output_dir: PathBuf,

    /// Motion classifier cutoffs.
    pub thresholds: ThresholdConfig,

    /// Pipeline behaviour not covered by thresholds.
    pub analysis: AnalysisDefaults,

    /// Overlay text and skeleton styling.
    pub overlay: OverlayDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Scalar cutoffs for the frame classifier.
///
/// All values are independent knobs. Nothing here is cross-validated: a
/// configuration with `dabbing >= punching` is accepted and simply makes
/// Dabbing unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Hip depth change per frame (Advancing / Retreating).
    pub hip: f64,
    /// Wrist separation change per frame (Enclosing / Spreading).
    pub wrist: f64,
    /// Absolute wrist separation (Directing).
    pub directing: f64,
    /// Average wrist velocity lower bound (Indirecting).
    pub indirecting: f64,
    /// Average wrist velocity upper bound (Gliding).
    pub gliding: f64,
    /// Average wrist velocity lower bound (Punching), also the Dabbing ceiling.
    pub punching: f64,
    /// Dabbing floor, also the Flicking ceiling.
    pub dabbing: f64,
    /// Flicking floor.
    pub flicking: f64,
    pub slashing: f64,
    pub wringing: f64,
    pub pressing: f64,
}

/// Named view over the threshold fields, in declaration order.
pub const THRESHOLD_NAMES: [&str; 11] = [
    "hip",
    "wrist",
    "directing",
    "indirecting",
    "gliding",
    "punching",
    "dabbing",
    "flicking",
    "slashing",
    "wringing",
    "pressing",
];

/// Pipeline defaults applied by the frame driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    /// Skeletons scored below this are treated as "no person detected".
    pub min_pose_confidence: f64,

    /// Forget the previous metrics after a non-detection frame.
    ///
    /// Off by default: the next detected frame is compared against the last
    /// successfully extracted one.
    pub reset_on_gap: bool,

    /// Frame rate used when the pose stream header does not carry one.
    pub fallback_fps: f64,
}

/// Where overlay text is anchored on the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TextAnchor {
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    Center,
    /// Percent of frame width / height, each in `[0, 100]`.
    Custom { x_pct: f64, y_pct: f64 },
}

/// Overlay styling defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub anchor: TextAnchor,
    pub margin_px: i32,
    pub font_scale: f64,
    pub font_thickness: u32,
    /// Preset name (e.g. "White") or `#RRGGBB`.
    pub text_color: String,
    pub line_color: String,
    pub dot_color: String,
    pub line_thickness: u32,
    pub dot_radius: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "motiontrace=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("motiontrace-out"),
            thresholds: ThresholdConfig::default(),
            analysis: AnalysisDefaults::default(),
            overlay: OverlayDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            hip: 0.005,
            wrist: 0.01,
            directing: 0.2,
            indirecting: 0.01,
            gliding: 0.01,
            punching: 0.05,
            dabbing: 0.02,
            flicking: 0.01,
            slashing: 0.03,
            wringing: 0.01,
            pressing: 0.005,
        }
    }
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            min_pose_confidence: 0.5,
            reset_on_gap: false,
            fallback_fps: 30.0,
        }
    }
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            anchor: TextAnchor::TopLeft,
            margin_px: 20,
            font_scale: 0.5,
            font_thickness: 1,
            text_color: "Red".to_string(),
            line_color: "Red".to_string(),
            dot_color: "White".to_string(),
            line_thickness: 2,
            dot_radius: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ThresholdConfig {
    /// Values in [`THRESHOLD_NAMES`] order.
    pub fn values(&self) -> [f64; 11] {
        [
            self.hip,
            self.wrist,
            self.directing,
            self.indirecting,
            self.gliding,
            self.punching,
            self.dabbing,
            self.flicking,
            self.slashing,
            self.wringing,
            self.pressing,
        ]
    }

    /// Mutable access to a threshold by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "hip" => Some(&mut self.hip),
            "wrist" => Some(&mut self.wrist),
            "directing" => Some(&mut self.directing),
            "indirecting" => Some(&mut self.indirecting),
            "gliding" => Some(&mut self.gliding),
            "punching" => Some(&mut self.punching),
            "dabbing" => Some(&mut self.dabbing),
            "flicking" => Some(&mut self.flicking),
            "slashing" => Some(&mut self.slashing),
            "wringing" => Some(&mut self.wringing),
            "pressing" => Some(&mut self.pressing),
            _ => None,
        }
    }

    /// Human-readable warnings about configurations that make categories
    /// unreachable or always-on. Never rejects anything.
    pub fn sanity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, value) in THRESHOLD_NAMES.iter().zip(self.values()) {
            if !value.is_finite() {
                warnings.push(format!("{name} threshold is not a finite number ({value})"));
            } else if value < 0.0 {
                warnings.push(format!("{name} threshold is negative ({value})"));
            }
        }

        if self.hip < 0.0 {
            warnings.push(
                "hip threshold < 0: Advancing and Retreating can fire on the same frame"
                    .to_string(),
            );
        }
        if self.wrist < 0.0 {
            warnings.push(
                "wrist threshold < 0: Enclosing and Spreading can fire on the same frame"
                    .to_string(),
            );
        }
        if self.dabbing >= self.punching {
            warnings.push(format!(
                "dabbing ({}) >= punching ({}): Dabbing can never fire",
                self.dabbing, self.punching
            ));
        }
        if self.flicking >= self.dabbing {
            warnings.push(format!(
                "flicking ({}) >= dabbing ({}): Flicking can never fire",
                self.flicking, self.dabbing
            ));
        }

        warnings
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], a
    /// missing or malformed file is an error.
    pub fn load_from(path: &Path) -> MotionResult<Self> {
        if !path.exists() {
            return Err(MotionError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MotionError::config(format!("Invalid config {}: {e}", path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("motiontrace").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_sane() {
        let thresholds = ThresholdConfig::default();
        assert!(thresholds.sanity_warnings().is_empty());
        assert_eq!(thresholds.values().len(), THRESHOLD_NAMES.len());
    }

    #[test]
    fn test_partial_threshold_json_uses_defaults() {
        let parsed: ThresholdConfig = serde_json::from_str(r#"{"punching": 0.08}"#).unwrap();
        assert_eq!(parsed.punching, 0.08);
        assert_eq!(parsed.hip, ThresholdConfig::default().hip);
    }

    #[test]
    fn test_get_mut_by_name() {
        let mut thresholds = ThresholdConfig::default();
        for name in THRESHOLD_NAMES {
            assert!(thresholds.get_mut(name).is_some(), "missing {name}");
        }
        *thresholds.get_mut("gliding").unwrap() = 0.5;
        assert_eq!(thresholds.gliding, 0.5);
        assert!(thresholds.get_mut("velocity").is_none());
    }

    #[test]
    fn test_unreachable_bands_are_warned_not_rejected() {
        let thresholds = ThresholdConfig {
            dabbing: 0.06,
            punching: 0.05,
            flicking: 0.07,
            ..Default::default()
        };
        let warnings = thresholds.sanity_warnings();
        assert!(warnings.iter().any(|w| w.contains("Dabbing can never fire")));
        assert!(warnings.iter().any(|w| w.contains("Flicking can never fire")));
    }

    #[test]
    fn test_negative_threshold_warns() {
        let thresholds = ThresholdConfig {
            hip: -0.1,
            ..Default::default()
        };
        let warnings = thresholds.sanity_warnings();
        assert!(warnings.iter().any(|w| w.contains("hip threshold is negative")));
        assert!(warnings.iter().any(|w| w.contains("same frame")));
    }

    #[test]
    fn test_config_save_and_load_from() {
        let dir = std::env::temp_dir().join("motiontrace_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.thresholds.punching = 0.09;
        config.overlay.anchor = TextAnchor::Custom {
            x_pct: 80.0,
            y_pct: 80.0,
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.thresholds.punching, 0.09);
        assert_eq!(loaded.overlay.anchor, config.overlay.anchor);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let err = AppConfig::load_from(Path::new("/nonexistent/motiontrace.json")).unwrap_err();
        assert!(matches!(err, MotionError::FileNotFound { .. }));
    }
}
