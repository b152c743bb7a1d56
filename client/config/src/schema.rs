//! StudyLens client configuration schema.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the StudyLens client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LensConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Backend endpoint and request limits.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Bearer token attached to authenticated requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Upload size cap in bytes, applied before encoding.
    pub max_image_bytes: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            auth_token: None,
            timeout_secs: 60,
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

// The token must never reach log or terminal output through Debug.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

/// Logging level and optional file output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for rolling NDJSON log files; console-only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

/// Bind address for the local proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}
