//! Configuration for the StudyLens client.
//!
//! Provides:
//! - Typed config schema (API endpoint, logging, local proxy)
//! - YAML read/write with atomic replacement
//! - `${ENV_VAR}` substitution
//! - Environment overrides applied after file load
//! - Token redaction in Debug output

pub mod env;
pub mod io;
pub mod schema;

pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{ApiConfig, LensConfig, LoggingConfig, ProxyConfig};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Load a config file, substitute env vars, and apply env overrides.
///
/// This is the main entry point for loading a config at runtime. A missing
/// file yields defaults, so a fresh install works without any setup.
pub async fn load_and_prepare(path: &Path) -> Result<LensConfig> {
    let raw = load_config(path).await?;

    // Run substitution over the serialized value tree so every string
    // field gets the same treatment.
    let mut value: Value =
        serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let mut config: LensConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply `STUDYLENS_*` environment overrides on top of the loaded file.
pub fn apply_env_overrides(config: &mut LensConfig) {
    apply_env_overrides_with(config, &std::env::vars().collect());
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(config: &mut LensConfig, env: &HashMap<String, String>) {
    if let Some(url) = env.get("STUDYLENS_API_URL").filter(|v| !v.is_empty()) {
        config.api.base_url = url.clone();
    }
    if let Some(token) = env.get("STUDYLENS_API_TOKEN").filter(|v| !v.is_empty()) {
        config.api.auth_token = Some(token.clone());
    }
    if let Some(level) = env.get("RUST_LOG").filter(|v| !v.is_empty()) {
        config.logging.level = level.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = LensConfig::default();
        apply_env_overrides_with(
            &mut config,
            &env(&[
                ("STUDYLENS_API_URL", "https://api.studylens.app"),
                ("STUDYLENS_API_TOKEN", "tok-123"),
                ("RUST_LOG", "debug"),
            ]),
        );
        assert_eq!(config.api.base_url, "https://api.studylens.app");
        assert_eq!(config.api.auth_token.as_deref(), Some("tok-123"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_override_values_are_ignored() {
        let mut config = LensConfig::default();
        apply_env_overrides_with(&mut config, &env(&[("STUDYLENS_API_URL", "")]));
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }
}
