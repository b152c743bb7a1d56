//! Config file read/write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::schema::LensConfig;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the StudyLens config directory.
/// Priority: `STUDYLENS_CONFIG_DIR` env > `~/.studylens/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STUDYLENS_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".studylens"),
        None => PathBuf::from(".studylens"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns defaults if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<LensConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(LensConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: LensConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically (write to temp file, rename).
pub async fn write_config(config: &LensConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.yaml")).await.unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[tokio::test]
    async fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());

        let mut config = LensConfig::default();
        config.api.base_url = "https://api.studylens.app".to_string();
        config.logging.level = "debug".to_string();

        write_config(&config, &path).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded.api.base_url, "https://api.studylens.app");
        assert_eq!(loaded.logging.level, "debug");
        // No leftover temp file after the rename.
        assert!(!path.with_extension("yaml.tmp").exists());
    }
}
