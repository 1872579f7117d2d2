//! Write or print the config file.

use std::path::{Path, PathBuf};

use motiontrace_common::config::{config_file_path, AppConfig};

pub fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default()
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
    println!("Wrote default config: {}", path.display());

    Ok(())
}

pub fn show(path: Option<&Path>, config: &AppConfig) -> anyhow::Result<()> {
    let source = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    if source.exists() {
        println!("# {}", source.display());
    } else {
        println!("# defaults ({} not found)", source.display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
