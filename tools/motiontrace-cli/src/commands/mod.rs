pub mod analyze;
pub mod config;
pub mod export;
pub mod info;
pub mod reference;
pub mod validate;

use std::path::Path;

use motiontrace_common::config::AppConfig;
use motiontrace_pose_model::stream::{load_pose_stream, PoseStream};

/// Load the config named by `--config`, or the standard one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {e}")),
        None => Ok(AppConfig::load()),
    }
}

pub fn load_stream(path: &Path) -> anyhow::Result<PoseStream> {
    load_pose_stream(path)
        .map_err(|e| anyhow::anyhow!("Failed to load pose stream {}: {e}", path.display()))
}
